//! Checker strategies: the pluggable matching behavior a [`crate::guard::Guard`]
//! uses to decide whether a policy's `subjects`/`actions`/`resources` fields
//! fit an inquiry.
//!
//! A policy's `context` map is always evaluated through the rule algebra
//! (§4.2.1) regardless of which checker is in use — that part of matching
//! isn't pluggable, only the subject/action/resource comparison is.

mod regex;
mod rules;
mod string;

pub use regex::RegexChecker;
pub use rules::RulesChecker;
pub use string::{StringExactChecker, StringFuzzyChecker};

use warden_model::{Inquiry, Policy};

/// A matching strategy for a policy's `subjects`/`actions`/`resources` fields.
///
/// Implementations are expected to reject policies whose [`warden_model::PolicyType`]
/// they don't support by returning `false` from [`Checker::fits`] rather than
/// raising — an incompatible pairing never matches, it just never contributes
/// (§4.2.2).
pub trait Checker: Send + Sync {
    /// Does `policy` fit `inquiry`? Evaluates subjects, actions, resources,
    /// and context together — all must match.
    fn fits(&self, policy: &Policy, inquiry: &Inquiry) -> bool;

    /// Which family of matching this checker implements, for diagnostics and
    /// storage-backend query planning.
    fn hint(&self) -> CheckerHint;
}

/// Identifies a [`Checker`] implementation without requiring a trait object
/// comparison. Storage backends that can push matching down to a query (e.g.
/// an indexed exact-match lookup) use this to decide whether they can.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerHint {
    Exact,
    Fuzzy,
    Regex,
    Rules,
}

/// Context is always a `BTreeMap<String, Rule>` with AND semantics: every key
/// present in the policy's context must be present in the inquiry's context
/// and satisfy its rule. A key the inquiry's context lacks is a non-match,
/// never an error (§4.2.1).
pub(crate) fn context_matches(policy: &Policy, inquiry: &Inquiry) -> bool {
    policy
        .context
        .iter()
        .all(|(key, rule)| inquiry.context.get(key).is_some_and(|v| rule.satisfied(v, inquiry)))
}
