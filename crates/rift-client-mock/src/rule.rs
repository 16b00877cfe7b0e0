//! Rules: an AND of conditions bound to a response-producing action.

use crate::condition::{Condition, FieldCondition, ValueMatcher};
use crate::error::{ActionFault, MockError};
use crate::registry::Registry;
use crate::request::{RequestView, UrlParts};
use crate::response::MockResponse;
use hyper::Method;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Produces the response for a matched request.
///
/// Implemented for closures, so stateful actions (response sequences,
/// counters) are plain closures capturing their own state.
pub trait Action: Send + Sync {
    fn respond(&self, request: &RequestView) -> Result<MockResponse, ActionFault>;
}

impl<F> Action for F
where
    F: Fn(&RequestView) -> Result<MockResponse, ActionFault> + Send + Sync,
{
    fn respond(&self, request: &RequestView) -> Result<MockResponse, ActionFault> {
        self(request)
    }
}

impl Action for MockResponse {
    fn respond(&self, _request: &RequestView) -> Result<MockResponse, ActionFault> {
        Ok(self.clone())
    }
}

struct Fault(ActionFault);

impl Action for Fault {
    fn respond(&self, _request: &RequestView) -> Result<MockResponse, ActionFault> {
        Err(self.0.clone())
    }
}

/// An ordered group of conditions and the action run when all of them hold.
pub struct Rule {
    conditions: Vec<Condition>,
    action: Box<dyn Action>,
    invocations: AtomicUsize,
    parameter_names: HashSet<String>,
    /// Lower-cased
    header_names: HashSet<String>,
    declares_fragment: bool,
}

impl Rule {
    pub fn new(conditions: Vec<Condition>, action: impl Action + 'static) -> Self {
        let mut parameter_names = HashSet::new();
        let mut header_names = HashSet::new();
        let mut declares_fragment = false;
        for condition in &conditions {
            match condition {
                Condition::Parameter(field) => {
                    parameter_names.insert(field.name().to_string());
                }
                Condition::Header(field) => {
                    header_names.insert(field.name().to_ascii_lowercase());
                }
                Condition::Fragment(_) => declares_fragment = true,
                _ => {}
            }
        }

        Self {
            conditions,
            action: Box::new(action),
            invocations: AtomicUsize::new(0),
            parameter_names,
            header_names,
            declares_fragment,
        }
    }

    /// A rule without conditions; matches every request.
    pub fn catch_all(action: impl Action + 'static) -> Self {
        Self::new(Vec::new(), action)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Full match: every condition holds (vacuously true without conditions).
    pub fn matches(&self, request: &RequestView) -> bool {
        self.conditions.iter().all(|c| c.evaluate(request))
    }

    /// Number of individually satisfied conditions, without short-circuiting.
    pub fn satisfied_count(&self, request: &RequestView) -> usize {
        self.conditions
            .iter()
            .filter(|c| c.evaluate(request))
            .count()
    }

    /// Run the action. The invocation is counted even if the action faults.
    pub fn invoke(&self, request: &RequestView) -> Result<MockResponse, ActionFault> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.action.respond(request)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn references_parameter(&self, name: &str) -> bool {
        self.parameter_names.contains(name)
    }

    pub fn references_header(&self, name: &str) -> bool {
        self.header_names.contains(&name.to_ascii_lowercase())
    }

    pub fn declares_fragment(&self) -> bool {
        self.declares_fragment
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("conditions", &self.conditions)
            .field("invocations", &self.invocations())
            .finish()
    }
}

/// Expand a method and URL into conditions.
///
/// URL components come out in canonical order: scheme, host, port, path,
/// then the fragment and one parameter condition per query pair. Relative
/// URLs take scheme, host and port from `base`.
pub fn url_conditions(
    method: Option<Method>,
    url: &str,
    base: Option<&UrlParts>,
) -> Result<Vec<Condition>, MockError> {
    let parts = UrlParts::parse(url)?;
    let origin = if parts.is_absolute() {
        Some(&parts)
    } else {
        base
    };

    let mut conditions = Vec::new();
    if let Some(method) = method {
        conditions.push(Condition::Method(method));
    }
    if let Some(origin) = origin {
        if let Some(scheme) = &origin.scheme {
            conditions.push(Condition::Scheme(scheme.clone()));
        }
        if let Some(host) = &origin.host {
            conditions.push(Condition::Host(host.clone()));
        }
        if let Some(port) = origin.port {
            conditions.push(Condition::Port(port));
        }
    }
    if !parts.path.is_empty() {
        conditions.push(Condition::Path(ValueMatcher::equals(parts.path.clone())));
    }
    if let Some(fragment) = parts.fragment.as_ref().filter(|f| !f.is_empty()) {
        conditions.push(Condition::Fragment(fragment.clone()));
    }
    // a name repeated in the URL asks for each of its values to be present
    for (name, value) in parts.query_pairs() {
        conditions.push(Condition::Parameter(FieldCondition::new(
            name,
            value.into(),
        )));
    }
    Ok(conditions)
}

#[derive(Clone, Copy)]
enum FieldKind {
    Header,
    Parameter,
}

/// Append a matcher to the condition for `name`, creating it on first use.
fn add_field(
    conditions: &mut Vec<Condition>,
    kind: FieldKind,
    name: String,
    matcher: ValueMatcher,
) {
    let existing = conditions.iter_mut().find_map(|c| match c {
        Condition::Header(field)
            if matches!(kind, FieldKind::Header) && field.name().eq_ignore_ascii_case(&name) =>
        {
            Some(field)
        }
        Condition::Parameter(field)
            if matches!(kind, FieldKind::Parameter) && field.name() == name =>
        {
            Some(field)
        }
        _ => None,
    });
    match existing {
        Some(field) => field.push(matcher),
        None => {
            let field = FieldCondition::new(name, matcher);
            conditions.push(match kind {
                FieldKind::Header => Condition::Header(field),
                FieldKind::Parameter => Condition::Parameter(field),
            });
        }
    }
}

/// Fluent builder that registers a rule when given its action.
///
/// Construction errors (bad URL, bad pattern) are kept until the terminal
/// call, which reports the first one.
#[must_use = "a rule is only registered by a terminal call such as respond_with"]
pub struct RuleBuilder<'a> {
    registry: &'a Registry,
    conditions: Vec<Condition>,
    error: Option<MockError>,
}

impl<'a> RuleBuilder<'a> {
    pub fn new(
        registry: &'a Registry,
        method: Option<Method>,
        url: &str,
        base: Option<&UrlParts>,
    ) -> Self {
        match url_conditions(method, url, base) {
            Ok(conditions) => Self {
                registry,
                conditions,
                error: None,
            },
            Err(e) => Self {
                registry,
                conditions: Vec::new(),
                error: Some(e),
            },
        }
    }

    fn fail(mut self, error: MockError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    pub fn with_header(
        mut self,
        name: impl Into<String>,
        matcher: impl Into<ValueMatcher>,
    ) -> Self {
        add_field(
            &mut self.conditions,
            FieldKind::Header,
            name.into(),
            matcher.into(),
        );
        self
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        matcher: impl Into<ValueMatcher>,
    ) -> Self {
        add_field(
            &mut self.conditions,
            FieldKind::Parameter,
            name.into(),
            matcher.into(),
        );
        self
    }

    /// Parameter value must match a regular expression.
    pub fn with_parameter_pattern(self, name: impl Into<String>, pattern: &str) -> Self {
        match ValueMatcher::regex(pattern) {
            Ok(matcher) => self.with_parameter(name, matcher),
            Err(e) => self.fail(e.into()),
        }
    }

    pub fn with_body(mut self, matcher: impl Into<ValueMatcher>) -> Self {
        self.conditions.push(Condition::Body(matcher.into()));
        self
    }

    pub fn with_condition<F>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RequestView) -> bool + Send + Sync + 'static,
    {
        self.conditions.push(Condition::custom(description, predicate));
        self
    }

    pub fn respond_with(self, response: MockResponse) -> Result<Arc<Rule>, MockError> {
        self.register_action(response)
    }

    pub fn respond_with_fn<F>(self, action: F) -> Result<Arc<Rule>, MockError>
    where
        F: Fn(&RequestView) -> Result<MockResponse, ActionFault> + Send + Sync + 'static,
    {
        self.register_action(action)
    }

    pub fn fail_with(self, fault: ActionFault) -> Result<Arc<Rule>, MockError> {
        self.register_action(Fault(fault))
    }

    /// Register with an empty 200 response.
    pub fn register(self) -> Result<Arc<Rule>, MockError> {
        self.register_action(MockResponse::ok())
    }

    fn register_action(self, action: impl Action + 'static) -> Result<Arc<Rule>, MockError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(self.registry.register(Rule::new(self.conditions, action)))
    }
}
