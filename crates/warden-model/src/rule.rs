//! The rule algebra: a small set of composable predicates over a single
//! value, each implementing `satisfied(value, inquiry) -> bool`.
//!
//! `Rule` is a sealed enum — design note §9's "variant (a)" — rather than a
//! trait-object hierarchy. That buys two things: evaluation is a single
//! match with no dynamic dispatch, and (de)serialization is the enum's own
//! derive, no separate registry to keep in sync. The wire shape is
//! adjacently tagged (`{"type": "...", "contents": ...}`, §6) with each
//! variant renamed to the dotted name a caller would recognize from the
//! taxonomy in spec §3.
//!
//! Every variant is pure and infallible at evaluation time: a shape or type
//! mismatch returns `false`, never a panic or an `Err`. The one place a rule
//! can fail is construction — `RegexMatch::new` compiles the pattern eagerly
//! and returns `WardenError::Validation` if it doesn't compile.

use std::net::IpAddr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WardenError;
use crate::inquiry::Inquiry;
use crate::value::Value;

/// A compiled regular expression that (de)serializes as its source pattern.
///
/// Kept as its own newtype so `Rule`'s derive can treat it like any other
/// field — the pattern/compile split lives here, once.
#[derive(Debug, Clone)]
pub struct CompiledRegex {
    pattern: String,
    regex: Regex,
}

impl CompiledRegex {
    /// Compile `pattern`. Fails at construction time, never at match time —
    /// this is the one rule-construction error the engine allows to surface.
    pub fn new(pattern: impl Into<String>) -> Result<Self, WardenError> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern)
            .map_err(|e| WardenError::validation(format!("invalid regex '{pattern}': {e}")))?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for CompiledRegex {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Serialize for CompiledRegex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.pattern.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CompiledRegex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        CompiledRegex::new(pattern).map_err(serde::de::Error::custom)
    }
}

/// A predicate over a single [`Value`], optionally consulting the enclosing
/// [`Inquiry`] (the "inquiry-related" family).
///
/// `satisfied` never raises for a type or shape mismatch; it returns `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "contents")]
pub enum Rule {
    // ── Comparison ───────────────────────────────────────────────────────
    #[serde(rename = "rules.comparison.Eq")]
    Eq(Value),
    #[serde(rename = "rules.comparison.NotEq")]
    NotEq(Value),
    #[serde(rename = "rules.comparison.Greater")]
    Greater(Value),
    #[serde(rename = "rules.comparison.Less")]
    Less(Value),
    #[serde(rename = "rules.comparison.GreaterOrEqual")]
    GreaterOrEqual(Value),
    #[serde(rename = "rules.comparison.LessOrEqual")]
    LessOrEqual(Value),

    // ── Logic ────────────────────────────────────────────────────────────
    #[serde(rename = "rules.logic.Truthy")]
    Truthy,
    #[serde(rename = "rules.logic.Falsy")]
    Falsy,
    #[serde(rename = "rules.logic.Not")]
    Not(Box<Rule>),
    #[serde(rename = "rules.logic.And")]
    And(Vec<Rule>),
    #[serde(rename = "rules.logic.Or")]
    Or(Vec<Rule>),
    #[serde(rename = "rules.logic.Any")]
    Any,
    #[serde(rename = "rules.logic.Neither")]
    Neither,

    // ── List membership ──────────────────────────────────────────────────
    #[serde(rename = "rules.list.In")]
    In(Vec<Value>),
    #[serde(rename = "rules.list.NotIn")]
    NotIn(Vec<Value>),
    #[serde(rename = "rules.list.AllIn")]
    AllIn(Vec<Value>),
    #[serde(rename = "rules.list.AllNotIn")]
    AllNotIn(Vec<Value>),
    #[serde(rename = "rules.list.AnyIn")]
    AnyIn(Vec<Value>),
    #[serde(rename = "rules.list.AnyNotIn")]
    AnyNotIn(Vec<Value>),

    // ── Network ──────────────────────────────────────────────────────────
    #[serde(rename = "rules.net.Cidr")]
    Cidr(ipnetwork::IpNetwork),

    // ── String ───────────────────────────────────────────────────────────
    #[serde(rename = "rules.string.StrEqual")]
    StrEqual { value: String, #[serde(default)] ci: bool },
    #[serde(rename = "rules.string.PairsEqual")]
    PairsEqual,
    #[serde(rename = "rules.string.RegexMatch")]
    RegexMatch(CompiledRegex),
    #[serde(rename = "rules.string.StartsWith")]
    StartsWith { value: String, #[serde(default)] ci: bool },
    #[serde(rename = "rules.string.EndsWith")]
    EndsWith { value: String, #[serde(default)] ci: bool },
    #[serde(rename = "rules.string.Contains")]
    Contains { value: String, #[serde(default)] ci: bool },

    // ── Inquiry-related (legacy, §3/§9) ──────────────────────────────────
    /// Cross-references `inquiry.subject` against the element's own value.
    #[serde(rename = "rules.inquiry.SubjectEqual")]
    #[deprecated(note = "cross-referencing rules predate the rule algebra's Eq/In family; prefer those directly")]
    SubjectEqual,
    /// Cross-references `inquiry.action` against the element's own value.
    #[serde(rename = "rules.inquiry.ActionEqual")]
    #[deprecated(note = "cross-referencing rules predate the rule algebra's Eq/In family; prefer those directly")]
    ActionEqual,
    /// Checks that `inquiry.resource` is a member of the given collection.
    #[serde(rename = "rules.inquiry.ResourceIn")]
    #[deprecated(note = "cross-referencing rules predate the rule algebra's Eq/In family; prefer those directly")]
    ResourceIn(Vec<Value>),
}

impl Rule {
    /// Evaluate this rule against `value`, with `inquiry` available for the
    /// inquiry-related family. Never raises for a type/shape mismatch.
    #[allow(deprecated)]
    pub fn satisfied(&self, value: &Value, inquiry: &Inquiry) -> bool {
        match self {
            Rule::Eq(target) => value == target,
            Rule::NotEq(target) => value != target,
            Rule::Greater(target) => {
                matches!(value.partial_compare(target), Some(std::cmp::Ordering::Greater))
            }
            Rule::Less(target) => {
                matches!(value.partial_compare(target), Some(std::cmp::Ordering::Less))
            }
            Rule::GreaterOrEqual(target) => matches!(
                value.partial_compare(target),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            Rule::LessOrEqual(target) => matches!(
                value.partial_compare(target),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),

            Rule::Truthy => value.is_truthy(),
            Rule::Falsy => !value.is_truthy(),
            Rule::Not(inner) => !inner.satisfied(value, inquiry),
            Rule::And(rules) => rules.iter().all(|r| r.satisfied(value, inquiry)),
            Rule::Or(rules) => rules.iter().any(|r| r.satisfied(value, inquiry)),
            Rule::Any => true,
            Rule::Neither => false,

            Rule::In(xs) => xs.contains(value),
            Rule::NotIn(xs) => !xs.contains(value),
            Rule::AllIn(xs) => match value.as_list() {
                Some(items) => items.iter().all(|v| xs.contains(v)),
                None => false,
            },
            Rule::AllNotIn(xs) => match value.as_list() {
                Some(items) => items.iter().all(|v| !xs.contains(v)),
                None => false,
            },
            Rule::AnyIn(xs) => match value.as_list() {
                Some(items) => items.iter().any(|v| xs.contains(v)),
                None => false,
            },
            Rule::AnyNotIn(xs) => match value.as_list() {
                Some(items) => items.iter().any(|v| !xs.contains(v)),
                None => false,
            },

            Rule::Cidr(network) => match value.as_str().and_then(|s| s.parse::<IpAddr>().ok()) {
                Some(addr) => same_family(network, &addr) && network.contains(addr),
                None => false,
            },

            Rule::StrEqual { value: target, ci } => match value.as_str() {
                Some(s) => str_eq(s, target, *ci),
                None => false,
            },
            Rule::PairsEqual => match value.as_list() {
                Some([a, b]) => matches!((a.as_str(), b.as_str()), (Some(a), Some(b)) if a == b),
                _ => false,
            },
            Rule::RegexMatch(re) => match value.as_str() {
                Some(s) => re.is_match(s),
                None => false,
            },
            Rule::StartsWith { value: prefix, ci } => match value.as_str() {
                Some(s) if *ci => s.to_lowercase().starts_with(&prefix.to_lowercase()),
                Some(s) => s.starts_with(prefix.as_str()),
                None => false,
            },
            Rule::EndsWith { value: suffix, ci } => match value.as_str() {
                Some(s) if *ci => s.to_lowercase().ends_with(&suffix.to_lowercase()),
                Some(s) => s.ends_with(suffix.as_str()),
                None => false,
            },
            Rule::Contains { value: needle, ci } => match value.as_str() {
                Some(s) if *ci => s.to_lowercase().contains(&needle.to_lowercase()),
                Some(s) => s.contains(needle.as_str()),
                None => false,
            },

            Rule::SubjectEqual => inquiry.subject.as_scalar().is_some_and(|s| s == value),
            Rule::ActionEqual => inquiry.action.as_scalar().is_some_and(|a| a == value),
            Rule::ResourceIn(xs) => inquiry
                .resource
                .as_scalar()
                .is_some_and(|r| xs.contains(r)),
        }
    }
}

fn str_eq(a: &str, b: &str, ci: bool) -> bool {
    if ci {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

fn same_family(network: &ipnetwork::IpNetwork, addr: &IpAddr) -> bool {
    matches!(
        (network, addr),
        (ipnetwork::IpNetwork::V4(_), IpAddr::V4(_)) | (ipnetwork::IpNetwork::V6(_), IpAddr::V6(_))
    )
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use crate::inquiry::Inquiry;

    fn inq() -> Inquiry {
        Inquiry::new("larry", "fork", "repos/google/tensorflow")
    }

    #[test]
    fn and_of_zero_is_true() {
        assert!(Rule::And(vec![]).satisfied(&Value::from(1.0), &inq()));
    }

    #[test]
    fn or_of_zero_is_false() {
        assert!(!Rule::Or(vec![]).satisfied(&Value::from(1.0), &inq()));
    }

    #[test]
    fn not_negates() {
        let r = Rule::Not(Box::new(Rule::Truthy));
        assert!(!r.satisfied(&Value::from("x"), &inq()));
        assert!(r.satisfied(&Value::from(""), &inq()));
    }

    #[test]
    fn double_not_is_identity_on_outputs() {
        let inner = Rule::Eq(Value::from("x"));
        let double = Rule::Not(Box::new(Rule::Not(Box::new(inner.clone()))));
        let v = Value::from("x");
        assert_eq!(inner.satisfied(&v, &inq()), double.satisfied(&v, &inq()));
    }

    #[test]
    fn greater_type_mismatch_is_false_not_error() {
        let r = Rule::Greater(Value::from(5.0));
        assert!(!r.satisfied(&Value::from("not a number"), &inq()));
    }

    #[test]
    fn cidr_ipv4_in_and_out_of_range() {
        let r = Rule::Cidr("192.168.2.0/24".parse().unwrap());
        assert!(r.satisfied(&Value::from("192.168.2.17"), &inq()));
        assert!(!r.satisfied(&Value::from("10.0.0.1"), &inq()));
    }

    #[test]
    fn cidr_malformed_input_is_false() {
        let r = Rule::Cidr("192.168.2.0/24".parse().unwrap());
        assert!(!r.satisfied(&Value::from("not-an-ip"), &inq()));
    }

    #[test]
    fn cidr_family_mismatch_is_false() {
        let r = Rule::Cidr("192.168.2.0/24".parse().unwrap());
        assert!(!r.satisfied(&Value::from("::1"), &inq()));
    }

    #[test]
    fn regex_match_is_search_not_full_match() {
        let re = CompiledRegex::new(r"M[\w]+").unwrap();
        let r = Rule::RegexMatch(re);
        assert!(r.satisfied(&Value::from("John Miller"), &inq()));
    }

    #[test]
    fn starts_with_case_insensitive() {
        let r = Rule::StartsWith { value: "repos/Google".to_string(), ci: true };
        assert!(r.satisfied(&Value::from("repos/google/tensorflow"), &inq()));
    }

    #[test]
    fn pairs_equal() {
        let r = Rule::PairsEqual;
        let v = Value::List(vec![Value::from("a"), Value::from("a")]);
        assert!(r.satisfied(&v, &inq()));
        let v = Value::List(vec![Value::from("a"), Value::from("b")]);
        assert!(!r.satisfied(&v, &inq()));
    }

    #[test]
    fn subject_equal_cross_references_inquiry() {
        let r = Rule::SubjectEqual;
        assert!(r.satisfied(&Value::from("larry"), &inq()));
        assert!(!r.satisfied(&Value::from("someone-else"), &inq()));
    }

    #[test]
    fn resource_in_checks_inquiry_resource() {
        let r = Rule::ResourceIn(vec![Value::from("repos/google/tensorflow")]);
        assert!(r.satisfied(&Value::from("irrelevant"), &inq()));
        let r = Rule::ResourceIn(vec![Value::from("something-else")]);
        assert!(!r.satisfied(&Value::from("irrelevant"), &inq()));
    }

    #[test]
    fn rule_purity_repeated_calls_agree() {
        let r = Rule::And(vec![Rule::Greater(Value::from(50.0)), Rule::Less(Value::from(999.0))]);
        let v = Value::from(80.0);
        let first = r.satisfied(&v, &inq());
        for _ in 0..10 {
            assert_eq!(first, r.satisfied(&v, &inq()));
        }
    }

    #[test]
    fn round_trip_json_every_kind() {
        let rules = vec![
            Rule::Eq(Value::from("x")),
            Rule::NotEq(Value::from(1.0)),
            Rule::Greater(Value::from(1.0)),
            Rule::Less(Value::from(1.0)),
            Rule::GreaterOrEqual(Value::from(1.0)),
            Rule::LessOrEqual(Value::from(1.0)),
            Rule::Truthy,
            Rule::Falsy,
            Rule::Not(Box::new(Rule::Any)),
            Rule::And(vec![Rule::Any, Rule::Neither]),
            Rule::Or(vec![Rule::Any]),
            Rule::Any,
            Rule::Neither,
            Rule::In(vec![Value::from("a")]),
            Rule::NotIn(vec![Value::from("a")]),
            Rule::AllIn(vec![Value::from("a")]),
            Rule::AllNotIn(vec![Value::from("a")]),
            Rule::AnyIn(vec![Value::from("a")]),
            Rule::AnyNotIn(vec![Value::from("a")]),
            Rule::Cidr("10.0.0.0/8".parse().unwrap()),
            Rule::StrEqual { value: "a".into(), ci: true },
            Rule::PairsEqual,
            Rule::RegexMatch(CompiledRegex::new("a+").unwrap()),
            Rule::StartsWith { value: "a".into(), ci: false },
            Rule::EndsWith { value: "a".into(), ci: false },
            Rule::Contains { value: "a".into(), ci: false },
            Rule::SubjectEqual,
            Rule::ActionEqual,
            Rule::ResourceIn(vec![Value::from("a")]),
        ];
        for r in rules {
            let json = serde_json::to_string(&r).unwrap();
            let back: Rule = serde_json::from_str(&json).unwrap();
            assert_eq!(r, back, "round trip failed for {json}");
        }
    }

    #[test]
    fn unknown_rule_type_fails_to_deserialize() {
        let json = r#"{"type":"rules.nope.Bogus","contents":{}}"#;
        let result: Result<Rule, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_regex_fails_at_construction() {
        let result = CompiledRegex::new("(unclosed");
        assert!(result.is_err());
    }
}
