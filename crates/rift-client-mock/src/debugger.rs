//! Rule debugger: explains, condition by condition, why a request matched.
//!
//! The debugger is owned by a mock session. While disabled it builds no
//! messages at all. While enabled, every executed request is explained
//! against the rule that actually matched or, failing that, against the
//! closest rule: the one with the most satisfied conditions, earliest
//! registration winning ties.

use crate::registry;
use crate::request::RequestView;
use crate::rule::Rule;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Destination of debugger output.
pub trait DebugSink: Send + Sync {
    /// Called once per explained request with its URI.
    fn request(&self, uri: &str);

    /// Called once per explanation line.
    fn message(&self, matching: bool, description: &str);
}

/// Writes debugger output as `tracing` events under the
/// `rift_client_mock::debugger` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn request(&self, uri: &str) {
        info!(target: "rift_client_mock::debugger", "Rule debugging for request {}", uri);
    }

    fn message(&self, matching: bool, description: &str) {
        if matching {
            info!(target: "rift_client_mock::debugger", matching, "MATCHES: {}", description);
        } else {
            info!(
                target: "rift_client_mock::debugger",
                matching,
                "DOES NOT MATCH: {}",
                description
            );
        }
    }
}

/// Collects debugger output in memory for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    requests: Mutex<Vec<String>>,
    matching: Mutex<Vec<String>>,
    not_matching: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn matching(&self) -> Vec<String> {
        self.matching.lock().clone()
    }

    pub fn not_matching(&self) -> Vec<String> {
        self.not_matching.lock().clone()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
        self.matching.lock().clear();
        self.not_matching.lock().clear();
    }
}

impl DebugSink for RecordingSink {
    fn request(&self, uri: &str) {
        self.requests.lock().push(uri.to_string());
    }

    fn message(&self, matching: bool, description: &str) {
        let target = if matching {
            &self.matching
        } else {
            &self.not_matching
        };
        target.lock().push(description.to_string());
    }
}

pub struct Debugger {
    enabled: AtomicBool,
    sink: Arc<dyn DebugSink>,
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl fmt::Debug for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debugger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Debugger {
    /// A disabled debugger writing to `sink`.
    pub fn new(sink: Arc<dyn DebugSink>) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            sink,
        }
    }

    pub fn on(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        debug!("Rule debugging enabled");
    }

    pub fn off(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        debug!("Rule debugging disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Explain `request` against `rules` and return the rule that really
    /// matches it, which is not necessarily the one explained.
    pub fn debug(&self, rules: &[Arc<Rule>], request: &RequestView) -> Option<Arc<Rule>> {
        self.sink.request(&request.uri());

        let matched = registry::find_match(rules, request);
        let target = matched.clone().or_else(|| closest_rule(rules, request));
        match &target {
            Some(rule) => self.explain(rule, request),
            None => debug!("No rules registered to explain {}", request),
        }
        matched
    }

    /// Emit one message per condition of `rule`, then the redundant
    /// parameters, headers and fragment of `request`.
    pub fn explain(&self, rule: &Rule, request: &RequestView) {
        let mut reported_absent = HashSet::new();
        for condition in rule.conditions() {
            if let Some(absent) = condition.absent_field_message(request) {
                if reported_absent.insert(absent.clone()) {
                    self.message(false, &absent);
                }
            }
            self.message(condition.evaluate(request), &condition.describe());
        }

        for name in request.parameters().names() {
            if !rule.references_parameter(name) {
                self.message(false, &format!("parameter {name} is redundant"));
            }
        }
        for name in request.headers().names() {
            if !rule.references_header(name) {
                self.message(false, &format!("header {name} is redundant"));
            }
        }
        if !rule.declares_fragment() {
            if let Some(fragment) = request.fragment() {
                self.message(false, &format!("reference is \"{fragment}\""));
            }
        }
    }

    pub fn message(&self, matching: bool, description: &str) {
        self.sink.message(matching, description);
    }
}

/// Rule with the most satisfied conditions; earliest wins ties.
fn closest_rule(rules: &[Arc<Rule>], request: &RequestView) -> Option<Arc<Rule>> {
    let mut best: Option<(usize, &Arc<Rule>)> = None;
    for rule in rules {
        let score = rule.satisfied_count(request);
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, rule));
        }
    }
    best.map(|(_, rule)| Arc::clone(rule))
}
