//! The two literal-string checkers: exact equality and substring containment.
//! Both only ever see `STRING_BASED` policies (§3) — a `RULE_BASED` policy is
//! rejected outright, which also rules out `Object`-shaped match elements,
//! since those always make a policy `RULE_BASED`.

use warden_model::{Inquiry, InquiryValue, MatchElement, Policy, PolicyType};

use super::{context_matches, Checker, CheckerHint};

fn field_matches(elements: &[MatchElement], value: &InquiryValue, cmp: impl Fn(&str, &str) -> bool) -> bool {
    let Some(actual) = value.as_plain_str() else { return false };
    elements.iter().any(|el| match el {
        MatchElement::Literal(literal) => cmp(literal, actual),
        MatchElement::Atom(_) | MatchElement::Object(_) => false,
    })
}

/// Matches when the inquiry's value equals the policy's literal exactly,
/// case-sensitively.
#[derive(Debug, Default)]
pub struct StringExactChecker;

impl StringExactChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Checker for StringExactChecker {
    fn fits(&self, policy: &Policy, inquiry: &Inquiry) -> bool {
        if policy.policy_type() != PolicyType::StringBased {
            return false;
        }
        let fits = field_matches(&policy.subjects, &inquiry.subject, |a, b| a == b)
            && field_matches(&policy.actions, &inquiry.action, |a, b| a == b)
            && field_matches(&policy.resources, &inquiry.resource, |a, b| a == b)
            && context_matches(policy, inquiry);
        tracing::debug!(uid = %policy.uid, fits, "string-exact field match");
        fits
    }

    fn hint(&self) -> CheckerHint {
        CheckerHint::Exact
    }
}

/// Matches when the policy's literal appears anywhere inside the inquiry's
/// value, case-sensitively (needle: policy literal, haystack: inquiry value).
#[derive(Debug, Default)]
pub struct StringFuzzyChecker;

impl StringFuzzyChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Checker for StringFuzzyChecker {
    fn fits(&self, policy: &Policy, inquiry: &Inquiry) -> bool {
        if policy.policy_type() != PolicyType::StringBased {
            return false;
        }
        let fits = field_matches(&policy.subjects, &inquiry.subject, |needle, haystack| haystack.contains(needle))
            && field_matches(&policy.actions, &inquiry.action, |needle, haystack| haystack.contains(needle))
            && field_matches(&policy.resources, &inquiry.resource, |needle, haystack| haystack.contains(needle))
            && context_matches(policy, inquiry);
        tracing::debug!(uid = %policy.uid, fits, "string-fuzzy field match");
        fits
    }

    fn hint(&self) -> CheckerHint {
        CheckerHint::Fuzzy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use warden_model::{Effect, Rule, Value};

    fn policy(subject: &str, action: &str, resource: &str) -> Policy {
        Policy {
            uid: "p1".into(),
            description: None,
            effect: Effect::Allow,
            subjects: vec![MatchElement::Literal(subject.into())],
            actions: vec![MatchElement::Literal(action.into())],
            resources: vec![MatchElement::Literal(resource.into())],
            context: BTreeMap::new(),
        }
    }

    #[test]
    fn exact_checker_requires_full_equality() {
        let checker = StringExactChecker::new();
        let p = policy("larry", "fork", "repos/google/tensorflow");
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        assert!(checker.fits(&p, &inquiry));

        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow-extra");
        assert!(!checker.fits(&p, &inquiry));
    }

    #[test]
    fn exact_checker_rejects_rule_based_policy() {
        let checker = StringExactChecker::new();
        let mut p = policy("larry", "fork", "repos/google/tensorflow");
        p.subjects = vec![MatchElement::Atom(Rule::Any)];
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        assert!(!checker.fits(&p, &inquiry));
    }

    #[test]
    fn fuzzy_checker_matches_substring() {
        let checker = StringFuzzyChecker::new();
        let p = policy("larry", "fork", "google");
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        assert!(checker.fits(&p, &inquiry));
    }

    #[test]
    fn fuzzy_checker_honors_context() {
        let checker = StringFuzzyChecker::new();
        let mut p = policy("larry", "fork", "google");
        p.context.insert("referer".into(), Rule::Eq(Value::from("https://github.com")));
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow")
            .with_context("referer", "https://evil.example");
        assert!(!checker.fits(&p, &inquiry));
    }

    #[test]
    fn non_scalar_inquiry_value_never_matches() {
        let checker = StringExactChecker::new();
        let p = policy("larry", "fork", "repos/google/tensorflow");
        let mut inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        inquiry.subject = InquiryValue::Attributes(BTreeMap::new());
        assert!(!checker.fits(&p, &inquiry));
    }
}
