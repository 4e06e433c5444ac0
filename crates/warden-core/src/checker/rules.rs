//! The rule-algebra checker (§4.2.2): each match element is either a bare
//! [`warden_model::Rule`] compared against the inquiry's scalar value, or an
//! attribute-name-to-rule map compared against the inquiry's attribute map.
//! Only ever fits `RULE_BASED` policies.

use warden_model::{Inquiry, InquiryValue, MatchElement, ObjectValue, Policy, PolicyType};

use super::{context_matches, Checker, CheckerHint};

fn element_matches(element: &MatchElement, value: &InquiryValue, inquiry: &Inquiry) -> bool {
    match element {
        // A bare literal alongside rule-shaped siblings in a mixed policy
        // (one field literal, another rule-based) falls back to equality.
        MatchElement::Literal(literal) => value.as_plain_str().is_some_and(|s| s == literal),
        MatchElement::Atom(rule) => value.as_scalar().is_some_and(|v| rule.satisfied(v, inquiry)),
        MatchElement::Object(attrs) => {
            let Some(actual) = value.as_attributes() else { return false };
            attrs.iter().all(|(name, expected)| {
                actual.get(name).is_some_and(|v| match expected {
                    ObjectValue::Literal(literal) => v.as_str() == Some(literal.as_str()),
                    ObjectValue::Rule(rule) => rule.satisfied(v, inquiry),
                })
            })
        }
    }
}

fn field_matches(elements: &[MatchElement], value: &InquiryValue, inquiry: &Inquiry) -> bool {
    elements.iter().any(|el| element_matches(el, value, inquiry))
}

/// Matches a policy's subjects/actions/resources against the rule algebra.
#[derive(Debug, Default)]
pub struct RulesChecker;

impl RulesChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Checker for RulesChecker {
    fn fits(&self, policy: &Policy, inquiry: &Inquiry) -> bool {
        if policy.policy_type() != PolicyType::RuleBased {
            return false;
        }
        let fits = field_matches(&policy.subjects, &inquiry.subject, inquiry)
            && field_matches(&policy.actions, &inquiry.action, inquiry)
            && field_matches(&policy.resources, &inquiry.resource, inquiry)
            && context_matches(policy, inquiry);
        tracing::debug!(uid = %policy.uid, fits, "rules field match");
        fits
    }

    fn hint(&self) -> CheckerHint {
        CheckerHint::Rules
    }
}
