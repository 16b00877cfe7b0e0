//! Value matchers: a predicate over a single field value plus its description.
//!
//! The built-in operators cover the usual string checks. Anything else can be
//! plugged in through the [`ValueMatch`] capability.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Capability shared by every value matcher.
pub trait ValueMatch: Send + Sync {
    fn test(&self, value: &str) -> bool;

    fn describe(&self) -> String;
}

/// A string value with pre-computed lowercase for case-insensitive matching.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    pub value: String,
    pub lower: String,
}

impl CachedValue {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let lower = value.to_lowercase();
        Self { value, lower }
    }

    #[inline]
    pub fn equals_ignoring_case(&self, value: &str) -> bool {
        value.to_lowercase() == self.lower
    }
}

/// Closure-backed matcher built by [`ValueMatcher::from_fn`].
struct FnMatch<F> {
    description: String,
    predicate: F,
}

impl<F> ValueMatch for FnMatch<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn test(&self, value: &str) -> bool {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Matcher applied to a header, query parameter or body value.
#[derive(Clone)]
pub enum ValueMatcher {
    Equals(String),
    EqualsIgnoringCase(CachedValue),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    Matches(Arc<Regex>),
    /// Structural JSON equality; non-JSON values never match.
    JsonEquals(serde_json::Value),
    Custom(Arc<dyn ValueMatch>),
}

impl ValueMatcher {
    pub fn equals(value: impl Into<String>) -> Self {
        Self::Equals(value.into())
    }

    pub fn equals_ignoring_case(value: impl Into<String>) -> Self {
        Self::EqualsIgnoringCase(CachedValue::new(value))
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Self::StartsWith(prefix.into())
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self::EndsWith(suffix.into())
    }

    pub fn contains(part: impl Into<String>) -> Self {
        Self::Contains(part.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Matches(Arc::new(Regex::new(pattern)?)))
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::JsonEquals(value)
    }

    pub fn custom(matcher: impl ValueMatch + 'static) -> Self {
        Self::Custom(Arc::new(matcher))
    }

    pub fn from_fn<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::custom(FnMatch {
            description: description.into(),
            predicate,
        })
    }
}

impl ValueMatch for ValueMatcher {
    fn test(&self, value: &str) -> bool {
        match self {
            ValueMatcher::Equals(expected) => value == expected,
            ValueMatcher::EqualsIgnoringCase(cached) => cached.equals_ignoring_case(value),
            ValueMatcher::StartsWith(prefix) => value.starts_with(prefix.as_str()),
            ValueMatcher::EndsWith(suffix) => value.ends_with(suffix.as_str()),
            ValueMatcher::Contains(part) => value.contains(part.as_str()),
            ValueMatcher::Matches(regex) => regex.is_match(value),
            ValueMatcher::JsonEquals(expected) => serde_json::from_str::<serde_json::Value>(value)
                .map(|actual| actual == *expected)
                .unwrap_or(false),
            ValueMatcher::Custom(matcher) => matcher.test(value),
        }
    }

    fn describe(&self) -> String {
        match self {
            ValueMatcher::Equals(expected) => format!("\"{expected}\""),
            ValueMatcher::EqualsIgnoringCase(cached) => {
                format!("a string equal to \"{}\" ignoring case", cached.value)
            }
            ValueMatcher::StartsWith(prefix) => format!("a string starting with \"{prefix}\""),
            ValueMatcher::EndsWith(suffix) => format!("a string ending with \"{suffix}\""),
            ValueMatcher::Contains(part) => format!("a string containing \"{part}\""),
            ValueMatcher::Matches(regex) => {
                format!("a string matching the pattern \"{}\"", regex.as_str())
            }
            ValueMatcher::JsonEquals(expected) => format!("JSON equal to {expected}"),
            ValueMatcher::Custom(matcher) => matcher.describe(),
        }
    }
}

impl fmt::Debug for ValueMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueMatcher({})", self.describe())
    }
}

impl From<&str> for ValueMatcher {
    fn from(value: &str) -> Self {
        Self::equals(value)
    }
}

impl From<String> for ValueMatcher {
    fn from(value: String) -> Self {
        Self::equals(value)
    }
}
