//! Append-only, registration-ordered rule registry.
//!
//! Matching is first-match-wins over registration order. Callers that need
//! a stable view while actions run take a snapshot.

use crate::request::RequestView;
use crate::rule::Rule;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct Registry {
    rules: RwLock<Vec<Arc<Rule>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Never fails.
    pub fn register(&self, rule: Rule) -> Arc<Rule> {
        let rule = Arc::new(rule);
        let mut rules = self.rules.write();
        rules.push(Arc::clone(&rule));
        debug!(
            "Registered rule #{} with {} condition(s)",
            rules.len() - 1,
            rule.conditions().len()
        );
        rule
    }

    /// Consistent copy of the rule list; later registrations are not visible.
    pub fn snapshot(&self) -> Vec<Arc<Rule>> {
        self.rules.read().clone()
    }

    /// First rule, in registration order, whose every condition holds.
    pub fn find_match(&self, request: &RequestView) -> Option<Arc<Rule>> {
        let rules = self.rules.read();
        find_match(&rules, request)
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

pub fn find_match(rules: &[Arc<Rule>], request: &RequestView) -> Option<Arc<Rule>> {
    let found = rules.iter().position(|rule| rule.matches(request));
    match found {
        Some(index) => {
            trace!("Request {} matched rule #{}", request, index);
            Some(Arc::clone(&rules[index]))
        }
        None => {
            trace!("Request {} matched none of {} rule(s)", request, rules.len());
            None
        }
    }
}
