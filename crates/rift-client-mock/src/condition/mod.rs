//! Conditions: named predicates over a [`RequestView`].
//!
//! A rule is an AND of conditions. Every condition is pure, and its
//! description is the exact text the debugger prints for it.
//!
//! # Module Structure
//!
//! - `value` - Value matchers used by path, header, parameter and body conditions

mod value;

pub use value::{CachedValue, ValueMatch, ValueMatcher};

use crate::request::RequestView;
use hyper::Method;
use std::fmt;
use std::sync::Arc;

/// Matchers declared for one header or query parameter name.
///
/// All matchers must hold for the same value. A multi-valued field matches
/// when at least one of its values satisfies every matcher.
#[derive(Debug, Clone)]
pub struct FieldCondition {
    name: String,
    matchers: Vec<ValueMatcher>,
}

impl FieldCondition {
    pub fn new(name: impl Into<String>, matcher: ValueMatcher) -> Self {
        Self {
            name: name.into(),
            matchers: vec![matcher],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matchers(&self) -> &[ValueMatcher] {
        &self.matchers
    }

    pub(crate) fn push(&mut self, matcher: ValueMatcher) {
        self.matchers.push(matcher);
    }

    fn matches_any(&self, values: Option<&[String]>) -> bool {
        values.is_some_and(|values| {
            values
                .iter()
                .any(|value| self.matchers.iter().all(|m| m.test(value)))
        })
    }

    fn describe_matchers(&self) -> String {
        self.matchers
            .iter()
            .map(ValueMatch::describe)
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

type RequestPredicate = dyn Fn(&RequestView) -> bool + Send + Sync;

/// Caller-supplied predicate over the whole request.
#[derive(Clone)]
pub struct CustomCondition {
    description: String,
    predicate: Arc<RequestPredicate>,
}

impl fmt::Debug for CustomCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCondition")
            .field("description", &self.description)
            .finish()
    }
}

/// A single match condition of a rule.
#[derive(Debug, Clone)]
pub enum Condition {
    Method(Method),
    Scheme(String),
    Host(String),
    Port(u16),
    Path(ValueMatcher),
    /// URL fragment, reported as "reference"
    Fragment(String),
    Header(FieldCondition),
    Parameter(FieldCondition),
    Body(ValueMatcher),
    Custom(CustomCondition),
}

impl Condition {
    pub fn header(name: impl Into<String>, matcher: impl Into<ValueMatcher>) -> Self {
        Condition::Header(FieldCondition::new(name, matcher.into()))
    }

    pub fn parameter(name: impl Into<String>, matcher: impl Into<ValueMatcher>) -> Self {
        Condition::Parameter(FieldCondition::new(name, matcher.into()))
    }

    pub fn custom<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RequestView) -> bool + Send + Sync + 'static,
    {
        Condition::Custom(CustomCondition {
            description: description.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// Evaluate against a request. Missing request data is a non-match.
    pub fn evaluate(&self, request: &RequestView) -> bool {
        match self {
            Condition::Method(method) => request.method() == method,
            Condition::Scheme(scheme) => request.scheme().eq_ignore_ascii_case(scheme),
            Condition::Host(host) => request.host().eq_ignore_ascii_case(host),
            Condition::Port(port) => request.port() == Some(*port),
            Condition::Path(matcher) => matcher.test(request.path()),
            Condition::Fragment(fragment) => request.fragment() == Some(fragment.as_str()),
            Condition::Header(field) => field.matches_any(request.headers().get_all(&field.name)),
            Condition::Parameter(field) => {
                field.matches_any(request.parameters().get_all(&field.name))
            }
            Condition::Body(matcher) => request
                .body_text()
                .is_some_and(|body| matcher.test(&body)),
            Condition::Custom(custom) => (custom.predicate)(request),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Condition::Method(method) => format!("HTTP method is {method}"),
            Condition::Scheme(scheme) => format!("schema is \"{scheme}\""),
            Condition::Host(host) => format!("host is \"{host}\""),
            Condition::Port(port) => format!("port is <{port}>"),
            Condition::Path(matcher) => format!("path is {}", matcher.describe()),
            Condition::Fragment(fragment) => format!("reference is \"{fragment}\""),
            Condition::Header(field) => {
                format!("header {} is {}", field.name, field.describe_matchers())
            }
            Condition::Parameter(field) => {
                format!("parameter {} is {}", field.name, field.describe_matchers())
            }
            Condition::Body(matcher) => format!("body is {}", matcher.describe()),
            Condition::Custom(custom) => custom.description.clone(),
        }
    }

    /// Message for a declared header or parameter the request does not carry.
    pub fn absent_field_message(&self, request: &RequestView) -> Option<String> {
        match self {
            Condition::Header(field) if !request.headers().contains(&field.name) => {
                Some(format!("header {} occurs in request", field.name))
            }
            Condition::Parameter(field) if !request.parameters().contains(&field.name) => {
                Some(format!("parameter {} occurs in request", field.name))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
