//! # warden-core
//!
//! The matching strategies (checkers) and the deny-overrides decision
//! algorithm (the guard) built on top of [`warden_model`]'s types. This
//! crate defines the [`storage::Storage`] contract but ships no concrete
//! backend — see `warden-storage` for that.

pub mod checker;
pub mod guard;
pub mod storage;


pub use checker::{Checker, CheckerHint, RegexChecker, RulesChecker, StringExactChecker, StringFuzzyChecker};
pub use guard::Guard;
pub use storage::Storage;
