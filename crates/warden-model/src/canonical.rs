//! Canonical JSON (de)serialization (§6) for the three wire-visible types —
//! [`Policy`], [`Inquiry`], and [`Rule`].
//!
//! The types themselves carry the shape via `serde` derives (see their
//! respective modules); this module is the single seam storage backends and
//! callers go through, so a malformed document always comes back as
//! [`WardenError::Serialization`] rather than a raw `serde_json::Error`.
//! `from_json(to_json(x)) == x` holds for every well-formed value (§8 item 5).

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{WardenError, WardenResult};
use crate::inquiry::Inquiry;
use crate::policy::Policy;
use crate::rule::Rule;

fn to_json_value<T: Serialize>(value: &T) -> WardenResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| WardenError::serialization(format!("failed to serialize: {e}")))
}

fn from_json_value<T: DeserializeOwned>(value: serde_json::Value) -> WardenResult<T> {
    serde_json::from_value(value)
        .map_err(|e| WardenError::serialization(format!("failed to deserialize: {e}")))
}

/// Serialize a [`Policy`] to its canonical JSON object.
pub fn policy_to_json(policy: &Policy) -> WardenResult<serde_json::Value> {
    to_json_value(policy)
}

/// Parse a [`Policy`] from its canonical JSON object.
pub fn policy_from_json(value: serde_json::Value) -> WardenResult<Policy> {
    from_json_value(value)
}

/// Serialize an [`Inquiry`] to its canonical JSON object.
pub fn inquiry_to_json(inquiry: &Inquiry) -> WardenResult<serde_json::Value> {
    to_json_value(inquiry)
}

/// Parse an [`Inquiry`] from its canonical JSON object.
pub fn inquiry_from_json(value: serde_json::Value) -> WardenResult<Inquiry> {
    from_json_value(value)
}

/// Serialize a [`Rule`] to its canonical `{"type", "contents"}` object.
pub fn rule_to_json(rule: &Rule) -> WardenResult<serde_json::Value> {
    to_json_value(rule)
}

/// Parse a [`Rule`] from its canonical `{"type", "contents"}` object.
/// Fails with [`WardenError::Serialization`] if `type` does not name a known
/// rule — there is no reflection-based fallback (§9).
pub fn rule_from_json(value: serde_json::Value) -> WardenResult<Rule> {
    from_json_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Effect, MatchElement};
    use crate::value::Value;
    use std::collections::BTreeMap;

    #[test]
    fn policy_round_trip_law() {
        let policy = Policy {
            uid: "p1".into(),
            description: Some("demo".into()),
            effect: Effect::Allow,
            subjects: vec![MatchElement::Atom(Rule::Any)],
            actions: vec![MatchElement::Literal("fork".into())],
            resources: vec![MatchElement::Literal("repos/x".into())],
            context: BTreeMap::from([("referer".to_string(), Rule::Eq(Value::from("x")))]),
        };
        let json = policy_to_json(&policy).unwrap();
        let back = policy_from_json(json).unwrap();
        assert_eq!(policy, back);
    }

    #[test]
    fn rule_unknown_type_is_serialization_error() {
        let bad = serde_json::json!({"type": "rules.nope.Bogus", "contents": {}});
        let err = rule_from_json(bad).unwrap_err();
        assert!(matches!(err, WardenError::Serialization { .. }));
    }
}
