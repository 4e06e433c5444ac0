//! The in-memory reference backend (§4.4.1): an ordered map guarded by a
//! single mutex, following the same shape as the audit writer's in-memory
//! state this workspace's logging crate uses — one lock, the whole state
//! behind it, every operation atomic end to end.

use std::collections::BTreeMap;
use std::sync::Mutex;

use warden_core::{Checker, Storage};
use warden_model::{Inquiry, Policy, WardenError, WardenResult};

#[derive(Default)]
struct State {
    policies: BTreeMap<String, Policy>,
}

/// A `Storage` backed by a `BTreeMap<uid, Policy>` behind a `Mutex`. Ordering
/// is by uid (stable, independent of insertion order). Never returns a
/// pre-filtered candidate set narrower than "everything" — `find_for_inquiry`
/// always returns the full policy set and lets the checker do the work.
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self { state: Mutex::new(State::default()) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn add(&self, policy: Policy) -> WardenResult<()> {
        let mut state = self.lock();
        if state.policies.contains_key(&policy.uid) {
            return Err(WardenError::duplicate(policy.uid));
        }
        state.policies.insert(policy.uid.clone(), policy);
        Ok(())
    }

    fn get(&self, uid: &str) -> WardenResult<Option<Policy>> {
        Ok(self.lock().policies.get(uid).cloned())
    }

    fn get_all(&self, limit: usize, offset: usize) -> WardenResult<Vec<Policy>> {
        Ok(self.lock().policies.values().skip(offset).take(limit).cloned().collect())
    }

    fn update(&self, policy: Policy) -> WardenResult<()> {
        let mut state = self.lock();
        if !state.policies.contains_key(&policy.uid) {
            return Err(WardenError::not_found(policy.uid));
        }
        state.policies.insert(policy.uid.clone(), policy);
        Ok(())
    }

    fn delete(&self, uid: &str) -> WardenResult<()> {
        let mut state = self.lock();
        if state.policies.remove(uid).is_none() {
            return Err(WardenError::not_found(uid));
        }
        Ok(())
    }

    fn find_for_inquiry(&self, _inquiry: &Inquiry, _checker: &dyn Checker) -> WardenResult<Vec<Policy>> {
        Ok(self.lock().policies.values().cloned().collect())
    }
}
