//! The document-database-shaped backend (§4.4.2), described only through a
//! small collection trait — no concrete database driver ships here (the
//! Mongo adapter is explicitly out of scope). A real driver implements
//! [`DocumentCollection`] against its own connection; [`DocumentStorage`]
//! layers the `Storage` contract and canonical JSON (de)serialization on top
//! of whatever that collection does.

use warden_core::{Checker, Storage};
use warden_model::{canonical, Inquiry, Policy, WardenError, WardenResult};

/// The minimal primitive a document database must provide to back a
/// [`DocumentStorage`]. Each policy is stored as one document keyed by its
/// `uid`; everything else (indexing, replication, connection pooling) is the
/// driver's concern.
pub trait DocumentCollection: Send + Sync {
    /// This collection's configured name (§4.4.2's `vakt_policies` default).
    fn name(&self) -> &str;

    /// Insert a new document under `uid`. Implementations must fail with
    /// `WardenError::Duplicate` if `uid` is already present — typically by
    /// relying on a unique index on the id field, as a Mongo collection
    /// would.
    fn insert(&self, uid: &str, document: serde_json::Value) -> WardenResult<()>;

    /// Fetch the document stored under `uid`, if any.
    fn find(&self, uid: &str) -> WardenResult<Option<serde_json::Value>>;

    /// Every document in the collection, in a stable (uid) order. The safe
    /// default `find_for_inquiry` path scans this rather than trust an index,
    /// since the no-false-negative invariant outranks query efficiency.
    fn scan(&self) -> WardenResult<Vec<serde_json::Value>>;

    /// Replace the document stored under `uid`. Fails with
    /// `WardenError::NotFound` if absent.
    fn replace(&self, uid: &str, document: serde_json::Value) -> WardenResult<()>;

    /// Remove the document stored under `uid`. Fails with
    /// `WardenError::NotFound` if absent.
    fn remove(&self, uid: &str) -> WardenResult<()>;
}

/// Adapts any [`DocumentCollection`] into a [`Storage`]. A real deployment
/// would pair this with a Mongo (or similar) driver's collection handle; an
/// indexed fast path for `StringExactChecker`/`StringFuzzyChecker` is a
/// detail of that driver, not of this adapter — `find_for_inquiry` here
/// always scans, which is always correct even if a specialized backend could
/// do better (§4.4: "what matters is the no-false-negative invariant").
pub struct DocumentStorage<C> {
    collection: C,
}

impl<C: DocumentCollection> DocumentStorage<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    fn decode(document: serde_json::Value) -> WardenResult<Policy> {
        canonical::policy_from_json(document)
    }
}

impl<C: DocumentCollection> Storage for DocumentStorage<C> {
    fn add(&self, policy: Policy) -> WardenResult<()> {
        let document = canonical::policy_to_json(&policy)?;
        self.collection.insert(&policy.uid, document)
    }

    fn get(&self, uid: &str) -> WardenResult<Option<Policy>> {
        self.collection.find(uid)?.map(Self::decode).transpose()
    }

    fn get_all(&self, limit: usize, offset: usize) -> WardenResult<Vec<Policy>> {
        self.collection
            .scan()?
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(Self::decode)
            .collect()
    }

    fn update(&self, policy: Policy) -> WardenResult<()> {
        let document = canonical::policy_to_json(&policy)?;
        self.collection.replace(&policy.uid, document)
    }

    fn delete(&self, uid: &str) -> WardenResult<()> {
        self.collection.remove(uid)
    }

    fn find_for_inquiry(&self, _inquiry: &Inquiry, _checker: &dyn Checker) -> WardenResult<Vec<Policy>> {
        self.collection.scan()?.into_iter().map(Self::decode).collect()
    }
}

/// An in-process stand-in for a real document database, used by tests and
/// by callers who want `DocumentStorage`'s JSON round trip without standing
/// up an actual store. Not a production backend — see [`crate::memory::MemoryStorage`]
/// for that.
pub struct InMemoryCollection {
    name: String,
    documents: std::sync::Mutex<std::collections::BTreeMap<String, serde_json::Value>>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), documents: std::sync::Mutex::new(std::collections::BTreeMap::new()) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, std::collections::BTreeMap<String, serde_json::Value>> {
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, uid: &str, document: serde_json::Value) -> WardenResult<()> {
        let mut docs = self.lock();
        if docs.contains_key(uid) {
            return Err(WardenError::duplicate(uid));
        }
        docs.insert(uid.to_string(), document);
        Ok(())
    }

    fn find(&self, uid: &str) -> WardenResult<Option<serde_json::Value>> {
        Ok(self.lock().get(uid).cloned())
    }

    fn scan(&self) -> WardenResult<Vec<serde_json::Value>> {
        Ok(self.lock().values().cloned().collect())
    }

    fn replace(&self, uid: &str, document: serde_json::Value) -> WardenResult<()> {
        let mut docs = self.lock();
        if !docs.contains_key(uid) {
            return Err(WardenError::not_found(uid));
        }
        docs.insert(uid.to_string(), document);
        Ok(())
    }

    fn remove(&self, uid: &str) -> WardenResult<()> {
        let mut docs = self.lock();
        if docs.remove(uid).is_none() {
            return Err(WardenError::not_found(uid));
        }
        Ok(())
    }
}
