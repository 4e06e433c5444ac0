//! The decision algorithm (§4.3): deny-overrides aggregation over every
//! stored policy that fits an inquiry, default-deny when nothing fits.

use warden_model::{Effect, Inquiry, WardenResult};

use crate::checker::Checker;
use crate::storage::Storage;

/// Ties a [`Storage`] backend to a [`Checker`] strategy and answers the one
/// question the engine exists for: is this inquiry allowed?
pub struct Guard<S, C> {
    storage: S,
    checker: C,
}

impl<S: Storage, C: Checker> Guard<S, C> {
    pub fn new(storage: S, checker: C) -> Self {
        Self { storage, checker }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    /// Decide an inquiry (§4.3):
    ///
    /// 1. Retrieve every stored policy that fits, via the checker.
    /// 2. If none fit, deny (default-deny).
    /// 3. Otherwise aggregate with deny-overrides: any fitting `Deny` policy
    ///    makes the whole inquiry denied, regardless of how many `Allow`
    ///    policies also fit.
    /// 4. Allow iff at least one policy fit and none of them denied.
    pub fn is_allowed(&self, inquiry: &Inquiry) -> WardenResult<bool> {
        let candidates = self.storage.find_for_inquiry(inquiry, &self.checker)?;
        tracing::debug!(candidate_count = candidates.len(), "evaluating inquiry");

        let mut any_fit = false;
        let mut any_deny = false;
        for policy in &candidates {
            if self.checker.fits(policy, inquiry) {
                any_fit = true;
                if policy.effect == Effect::Deny {
                    any_deny = true;
                    tracing::debug!(uid = %policy.uid, "denying policy fits inquiry");
                }
            }
        }

        let allowed = any_fit && !any_deny;
        tracing::info!(allowed, fit_count = candidates.len(), "inquiry resolved");
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::StringExactChecker;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use warden_model::{MatchElement, Policy};

    /// A minimal in-test storage: holds every policy, delegates filtering
    /// entirely to the checker. Exercises `Guard` independent of any
    /// particular storage backend.
    struct VecStorage(Mutex<Vec<Policy>>);

    impl VecStorage {
        fn new(policies: Vec<Policy>) -> Self {
            Self(Mutex::new(policies))
        }
    }

    impl Storage for VecStorage {
        fn add(&self, policy: Policy) -> WardenResult<()> {
            self.0.lock().unwrap().push(policy);
            Ok(())
        }

        fn get(&self, uid: &str) -> WardenResult<Option<Policy>> {
            Ok(self.0.lock().unwrap().iter().find(|p| p.uid == uid).cloned())
        }

        fn get_all(&self, limit: usize, offset: usize) -> WardenResult<Vec<Policy>> {
            Ok(self.0.lock().unwrap().iter().skip(offset).take(limit).cloned().collect())
        }

        fn update(&self, _policy: Policy) -> WardenResult<()> {
            Ok(())
        }

        fn delete(&self, _uid: &str) -> WardenResult<()> {
            Ok(())
        }

        fn find_for_inquiry(&self, inquiry: &Inquiry, checker: &dyn Checker) -> WardenResult<Vec<Policy>> {
            Ok(self.0.lock().unwrap().iter().filter(|p| checker.fits(p, inquiry)).cloned().collect())
        }
    }

    fn literal_policy(uid: &str, effect: Effect, resource: &str) -> Policy {
        Policy {
            uid: uid.into(),
            description: None,
            effect,
            subjects: vec![MatchElement::Literal("larry".into())],
            actions: vec![MatchElement::Literal("fork".into())],
            resources: vec![MatchElement::Literal(resource.into())],
            context: BTreeMap::new(),
        }
    }

    #[test]
    fn default_deny_when_nothing_fits() {
        let guard = Guard::new(VecStorage::new(vec![]), StringExactChecker::new());
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        assert!(!guard.is_allowed(&inquiry).unwrap());
    }

    #[test]
    fn single_allow_policy_allows() {
        let guard = Guard::new(
            VecStorage::new(vec![literal_policy("p1", Effect::Allow, "repos/google/tensorflow")]),
            StringExactChecker::new(),
        );
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        assert!(guard.is_allowed(&inquiry).unwrap());
    }

    #[test]
    fn deny_overrides_any_number_of_allows() {
        let guard = Guard::new(
            VecStorage::new(vec![
                literal_policy("p1", Effect::Allow, "repos/google/tensorflow"),
                literal_policy("p2", Effect::Allow, "repos/google/tensorflow"),
                literal_policy("p3", Effect::Deny, "repos/google/tensorflow"),
            ]),
            StringExactChecker::new(),
        );
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        assert!(!guard.is_allowed(&inquiry).unwrap());
    }

    #[test]
    fn non_fitting_policies_do_not_influence_the_decision() {
        let guard = Guard::new(
            VecStorage::new(vec![literal_policy("p1", Effect::Deny, "repos/other/repo")]),
            StringExactChecker::new(),
        );
        let inquiry = Inquiry::new("larry", "fork", "repos/google/tensorflow");
        assert!(!guard.is_allowed(&inquiry).unwrap());
    }
}
