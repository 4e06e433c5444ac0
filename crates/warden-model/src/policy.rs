//! Policies: named records pairing a match condition with an effect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{WardenError, WardenResult};
use crate::rule::Rule;

/// The decision a matching policy contributes to the aggregate (§4.3,
/// deny-overrides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    /// The persisted literal for this effect (§6: `ALLOW_ACCESS` / `DENY_ACCESS`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "allow",
            Effect::Deny => "deny",
        }
    }
}

/// One element of a policy's `subjects`/`actions`/`resources` sequence.
///
/// A [`MatchElement::Object`]'s values may themselves be either a literal
/// string or a [`Rule`] — e.g. `{ name: "larry" }` alongside
/// `{ stars: And(Greater(50), Less(999)) }` in the same object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchElement {
    Literal(String),
    Atom(Rule),
    Object(BTreeMap<String, ObjectValue>),
}

/// A value inside an object-shaped [`MatchElement`] or a policy's `context`
/// map: either a literal string (implicitly an equality check) or a [`Rule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectValue {
    Literal(String),
    Rule(Rule),
}

impl MatchElement {
    /// `true` iff this element is a bare string literal (used to derive
    /// [`PolicyType`]).
    fn is_string_literal(&self) -> bool {
        matches!(self, MatchElement::Literal(_))
    }
}

/// Whether a policy's subject/action/resource fields are made entirely of
/// literal strings, or make use of the rule algebra. A pure function of the
/// policy's fields (§3): never stored, always derived or validated on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyType {
    StringBased,
    RuleBased,
}

/// A named record mapping a matching condition to an [`Effect`].
///
/// `subjects`, `actions`, and `resources` use OR-of-elements semantics
/// (§4.2.1): any element matching is enough. `context` is always a single
/// attribute map evaluated with AND semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub uid: String,
    #[serde(default)]
    pub description: Option<String>,
    pub effect: Effect,
    pub subjects: Vec<MatchElement>,
    pub actions: Vec<MatchElement>,
    pub resources: Vec<MatchElement>,
    #[serde(default)]
    pub context: BTreeMap<String, Rule>,
}

impl Policy {
    /// Derive this policy's [`PolicyType`]. `STRING_BASED` iff every match
    /// element in `subjects`/`actions`/`resources` is a literal string;
    /// `RULE_BASED` otherwise.
    pub fn policy_type(&self) -> PolicyType {
        let all_literal = self
            .subjects
            .iter()
            .chain(self.actions.iter())
            .chain(self.resources.iter())
            .all(MatchElement::is_string_literal);
        if all_literal {
            PolicyType::StringBased
        } else {
            PolicyType::RuleBased
        }
    }

    /// Validate structural invariants from §3: every attribute-name within a
    /// single object-shaped match element is unique (guaranteed by the `Map`
    /// representation itself — this checks the remaining invariant, that a
    /// single field doesn't mix literal-string and rule/object shapes, which
    /// would make the field internally inconsistent for checker dispatch).
    pub fn validate(&self) -> WardenResult<()> {
        for (name, field) in [
            ("subjects", &self.subjects),
            ("actions", &self.actions),
            ("resources", &self.resources),
        ] {
            let has_literal = field.iter().any(MatchElement::is_string_literal);
            let has_non_literal = field.iter().any(|e| !e.is_string_literal());
            if has_literal && has_non_literal {
                return Err(WardenError::validation(format!(
                    "policy '{}' field '{name}' mixes literal-string and rule/object match elements",
                    self.uid
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn string_policy() -> Policy {
        Policy {
            uid: "p1".into(),
            description: None,
            effect: Effect::Allow,
            subjects: vec![MatchElement::Literal("larry".into())],
            actions: vec![MatchElement::Literal("fork".into())],
            resources: vec![MatchElement::Literal("repos/google/tensorflow".into())],
            context: BTreeMap::new(),
        }
    }

    #[test]
    fn string_based_detection() {
        assert_eq!(string_policy().policy_type(), PolicyType::StringBased);
    }

    #[test]
    fn rule_based_detection() {
        let mut p = string_policy();
        p.actions = vec![MatchElement::Atom(Rule::Eq(Value::from("fork")))];
        assert_eq!(p.policy_type(), PolicyType::RuleBased);
    }

    #[test]
    fn mixed_shape_within_field_is_invalid() {
        let mut p = string_policy();
        p.subjects.push(MatchElement::Atom(Rule::Any));
        assert!(p.validate().is_err());
    }

    #[test]
    fn round_trip_json() {
        let p = string_policy();
        let json = serde_json::to_string(&p).unwrap();
        let back: Policy = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn effect_persisted_literal() {
        assert_eq!(Effect::Allow.as_str(), "allow");
        assert_eq!(Effect::Deny.as_str(), "deny");
        let json = serde_json::to_string(&Effect::Allow).unwrap();
        assert_eq!(json, "\"allow\"");
    }
}
