//! Lead filter builder
//!
//! Folds raw list-query parameters through the rule table into a
//! [`Predicate`]. Never fails: values that do not parse leave their field
//! unconstrained, and unknown parameters are ignored.

use std::collections::HashMap;

use super::rules::RULES;
use super::types::Predicate;

/// Build the owner-scoped predicate for a lead list query
pub fn build_lead_filter(params: &HashMap<String, String>, owner: &str) -> Predicate {
    let mut predicate = Predicate::for_owner(owner);

    for rule in RULES {
        let Some(raw) = params.get(&rule.param_name()) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        let current = predicate.take(rule.field);
        if let Some(next) = (rule.apply)(current, raw) {
            predicate.set(rule.field, next);
        }
    }

    tracing::trace!(
        owner,
        conditions = predicate.conditions().count(),
        "Built lead filter"
    );
    predicate
}
