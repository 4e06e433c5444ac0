//! # warden-storage
//!
//! Reference [`warden_core::Storage`] backends — an in-memory map and a
//! document-database-shaped adapter behind a small collection trait — plus
//! the migration framework used to evolve either one's stored data over
//! time.

pub mod config;
pub mod document;
pub mod memory;
pub mod migration;

pub use config::StorageConfig;
pub use document::{DocumentCollection, DocumentStorage, InMemoryCollection};
pub use memory::MemoryStorage;
pub use migration::{InMemoryMigrationSet, Migration, MigrationSet, Migrator};
