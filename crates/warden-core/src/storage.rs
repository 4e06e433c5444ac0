//! The storage contract (§4.4/§5): a synchronous backend that persists
//! policies and can narrow a full set down to the ones that fit an inquiry.
//!
//! Kept synchronous on purpose — the engine's decision path has no
//! suspension points, so a backend (in-memory, on-disk, document store) only
//! needs ordinary blocking I/O underneath, not an executor.

use warden_model::{Inquiry, Policy, WardenResult};

use crate::checker::Checker;

/// A policy store. Implementations decide how much of `find_for_inquiry`'s
/// filtering they push down versus delegating to the supplied checker — a
/// backend with an index on literal subjects might narrow the candidate set
/// before calling `checker.fits` at all, while a plain in-memory backend
/// typically just filters the full set.
pub trait Storage: Send + Sync {
    /// Insert a new policy. Fails with `WardenError::Duplicate` if `uid`
    /// already exists.
    fn add(&self, policy: Policy) -> WardenResult<()>;

    /// Look up a policy by `uid`. `Ok(None)` if it doesn't exist — looking up
    /// a missing uid is not itself an error, only acting on it as if it
    /// existed is (see [`Storage::update`], [`Storage::delete`]).
    fn get(&self, uid: &str) -> WardenResult<Option<Policy>>;

    /// List up to `limit` policies starting at `offset`, in a stable order.
    fn get_all(&self, limit: usize, offset: usize) -> WardenResult<Vec<Policy>>;

    /// Replace an existing policy. Fails with `WardenError::NotFound` if
    /// `uid` doesn't exist.
    fn update(&self, policy: Policy) -> WardenResult<()>;

    /// Remove a policy by `uid`. Fails with `WardenError::NotFound` if it
    /// doesn't exist.
    fn delete(&self, uid: &str) -> WardenResult<()>;

    /// Every stored policy that fits `inquiry` under `checker` (§4.3 step 1).
    /// Must never silently drop a policy that fits — a false negative here is
    /// a security defect, not a performance one (§8 item 2).
    fn find_for_inquiry(&self, inquiry: &Inquiry, checker: &dyn Checker) -> WardenResult<Vec<Policy>>;
}
