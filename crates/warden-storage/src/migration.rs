//! Versioned schema/data transitions for a `Storage` (§4.5). A `Migration`
//! is ordered, reversible, and idempotent per step; a `Migrator` drives a
//! `MigrationSet` forward or backward against a concrete storage.

use tracing::warn;
use warden_core::Storage;
use warden_model::{WardenError, WardenResult};

/// One ordered schema/data transition. `up` and `down` must each leave the
/// storage in a fully-applied or fully-unapplied state — a migration that
/// partially mutates storage and then fails violates §7's consistency
/// guarantee, so implementations should perform their storage operations in
/// an order that fails closed (e.g. validate before mutating).
pub trait Migration: Send + Sync {
    /// This migration's position in the sequence. Unique within a
    /// `MigrationSet`.
    fn order(&self) -> u32;

    /// Apply this migration's forward transition.
    fn up(&self, storage: &dyn Storage) -> WardenResult<()>;

    /// Apply this migration's inverse transition. `up` then `down` must
    /// return the store to its pre-migration state, modulo the monotonic
    /// applied-number bookkeeping itself (§8 item 9).
    fn down(&self, storage: &dyn Storage) -> WardenResult<()>;
}

/// Enumerates the migrations available for a storage and tracks which one
/// was last applied. Implementations decide where that bookkeeping lives —
/// a dedicated metadata document, a sidecar file, or (as
/// [`InMemoryMigrationSet`] does) plain process memory.
pub trait MigrationSet: Send + Sync {
    /// Every migration this set knows about, in no particular order — the
    /// `Migrator` sorts by [`Migration::order`] itself.
    fn migrations(&self) -> &[Box<dyn Migration>];

    /// The order number of the last successfully applied migration, or `0`
    /// if none have been applied.
    fn last_applied(&self) -> WardenResult<u32>;

    /// Record `n` as the new last-applied order number.
    fn save_applied_number(&self, n: u32) -> WardenResult<()>;
}

/// Drives a [`MigrationSet`] against a storage backend.
pub struct Migrator<M> {
    set: M,
}

impl<M: MigrationSet> Migrator<M> {
    pub fn new(set: M) -> Self {
        Self { set }
    }

    /// Apply pending migrations (`order > last_applied`) in ascending order.
    /// If `number` is given, apply exactly that one migration instead of the
    /// whole pending run — it still must be pending (`order > last_applied`).
    pub fn up(&self, storage: &dyn Storage, number: Option<u32>) -> WardenResult<()> {
        let last_applied = self.set.last_applied()?;
        let mut pending: Vec<&Box<dyn Migration>> =
            self.set.migrations().iter().filter(|m| m.order() > last_applied).collect();
        pending.sort_by_key(|m| m.order());

        match number {
            Some(target) => {
                let migration = pending
                    .into_iter()
                    .find(|m| m.order() == target)
                    .ok_or_else(|| WardenError::bad_argument(format!("no pending migration with order {target}")))?;
                migration.up(storage).map_err(|e| {
                    warn!(order = migration.order(), error = %e, "migration up step failed");
                    e
                })?;
                self.set.save_applied_number(target)
            }
            None => {
                for migration in pending {
                    migration.up(storage).map_err(|e| {
                        warn!(order = migration.order(), error = %e, "migration up step failed");
                        e
                    })?;
                    self.set.save_applied_number(migration.order())?;
                }
                Ok(())
            }
        }
    }

    /// Unapply migrations (`order <= last_applied`) in descending order. If
    /// `number` is given, unapply exactly that one and set `last_applied` to
    /// the highest remaining applied order below it (or `0`).
    pub fn down(&self, storage: &dyn Storage, number: Option<u32>) -> WardenResult<()> {
        let last_applied = self.set.last_applied()?;
        let mut applied: Vec<&Box<dyn Migration>> =
            self.set.migrations().iter().filter(|m| m.order() <= last_applied).collect();
        applied.sort_by_key(|m| std::cmp::Reverse(m.order()));

        match number {
            Some(target) => {
                let migration = applied
                    .into_iter()
                    .find(|m| m.order() == target)
                    .ok_or_else(|| WardenError::bad_argument(format!("no applied migration with order {target}")))?;
                migration.down(storage).map_err(|e| {
                    warn!(order = migration.order(), error = %e, "migration down step failed");
                    e
                })?;
                let new_last = self
                    .set
                    .migrations()
                    .iter()
                    .map(|m| m.order())
                    .filter(|&order| order < target)
                    .max()
                    .unwrap_or(0);
                self.set.save_applied_number(new_last)
            }
            None => {
                for migration in applied {
                    migration.down(storage).map_err(|e| {
                        warn!(order = migration.order(), error = %e, "migration down step failed");
                        e
                    })?;
                }
                self.set.save_applied_number(0)
            }
        }
    }
}

/// A process-memory [`MigrationSet`] — useful for tests and for storage
/// backends (like [`crate::memory::MemoryStorage`]) that have no durable
/// place of their own to record applied-migration state.
pub struct InMemoryMigrationSet {
    migrations: Vec<Box<dyn Migration>>,
    last_applied: std::sync::atomic::AtomicU32,
}

impl InMemoryMigrationSet {
    pub fn new(migrations: Vec<Box<dyn Migration>>) -> Self {
        Self { migrations, last_applied: std::sync::atomic::AtomicU32::new(0) }
    }
}

impl MigrationSet for InMemoryMigrationSet {
    fn migrations(&self) -> &[Box<dyn Migration>] {
        &self.migrations
    }

    fn last_applied(&self) -> WardenResult<u32> {
        Ok(self.last_applied.load(std::sync::atomic::Ordering::SeqCst))
    }

    fn save_applied_number(&self, n: u32) -> WardenResult<()> {
        self.last_applied.store(n, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
