//! Error taxonomy for the Warden ABAC engine.
//!
//! All fallible operations across the `warden-*` crates return
//! [`WardenResult<T>`]. Error variants carry enough context to produce
//! actionable log lines without needing the caller to downcast.

use thiserror::Error;

/// The unified error type for the Warden policy engine.
#[derive(Debug, Error)]
pub enum WardenError {
    /// A policy, inquiry, or rule was malformed at construction or load time
    /// (unknown effect, bad CIDR, uncompilable regex, mixed match-element
    /// shapes within one policy field).
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// A storage lookup by `uid` found nothing.
    #[error("not found: {uid}")]
    NotFound { uid: String },

    /// A storage insert used a `uid` that already exists.
    #[error("duplicate uid: {uid}")]
    Duplicate { uid: String },

    /// An argument was out of its valid range (pagination limit/offset,
    /// unrecognized rule type during deserialization).
    #[error("bad argument: {reason}")]
    BadArgument { reason: String },

    /// A JSON (or TOML) structure did not conform to the canonical form.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// A migration step failed. The storage backend is left in a consistent
    /// state — either fully before or fully after the step that failed.
    #[error("migration error: {reason}")]
    Migration { reason: String },
}

impl WardenError {
    /// Construct a [`WardenError::Validation`] from anything string-like.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    /// Construct a [`WardenError::NotFound`] for the given uid.
    pub fn not_found(uid: impl Into<String>) -> Self {
        Self::NotFound { uid: uid.into() }
    }

    /// Construct a [`WardenError::Duplicate`] for the given uid.
    pub fn duplicate(uid: impl Into<String>) -> Self {
        Self::Duplicate { uid: uid.into() }
    }

    /// Construct a [`WardenError::BadArgument`] from anything string-like.
    pub fn bad_argument(reason: impl Into<String>) -> Self {
        Self::BadArgument { reason: reason.into() }
    }

    /// Construct a [`WardenError::Serialization`] from anything string-like.
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization { reason: reason.into() }
    }

    /// Construct a [`WardenError::Migration`] from anything string-like.
    pub fn migration(reason: impl Into<String>) -> Self {
        Self::Migration { reason: reason.into() }
    }
}

/// Convenience alias used throughout the `warden-*` crates.
pub type WardenResult<T> = Result<T, WardenError>;
