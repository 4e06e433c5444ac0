//! Warden — ABAC policy decision engine demo CLI.
//!
//! Loads a policy set and an inquiry from JSON files, runs the decision
//! through a `Guard`, and prints `ALLOW` or `DENY`.
//!
//! Usage:
//!   warden decide --policies policies.json --inquiry inquiry.json
//!   warden decide --policies policies.json --inquiry inquiry.json --checker rules

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use warden_core::{Guard, RegexChecker, RulesChecker, StringExactChecker, StringFuzzyChecker};
use warden_model::{Inquiry, Policy, WardenError, WardenResult};
use warden_storage::{MemoryStorage, StorageConfig};

/// Warden — an attribute-based access control policy decision engine.
#[derive(Parser)]
#[command(name = "warden", about = "ABAC policy decision engine demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a policy set and an inquiry, and print the resulting decision.
    Decide {
        /// Path to a JSON array of policies.
        #[arg(long)]
        policies: PathBuf,
        /// Path to a JSON inquiry object.
        #[arg(long)]
        inquiry: PathBuf,
        /// Which checker strategy to evaluate the policy set with.
        #[arg(long, value_enum, default_value_t = CheckerKind::Rules)]
        checker: CheckerKind,
        /// Optional TOML file overriding the regex cache size and delimiter
        /// tags (see `StorageConfig`). Absent means the defaults apply.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CheckerKind {
    Exact,
    Fuzzy,
    Regex,
    Rules,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Decide { policies, inquiry, checker, config } => run_decide(&policies, &inquiry, checker, config.as_deref()),
    };

    match result {
        Ok(allowed) => {
            tracing::info!(allowed, "decision resolved");
            println!("{}", if allowed { "ALLOW" } else { "DENY" });
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("warden: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_decide(
    policies_path: &std::path::Path,
    inquiry_path: &std::path::Path,
    checker: CheckerKind,
    config_path: Option<&std::path::Path>,
) -> WardenResult<bool> {
    let policies = load_policies(policies_path)?;
    let inquiry = load_inquiry(inquiry_path)?;
    let config = match config_path {
        Some(path) => StorageConfig::from_file(path)?,
        None => StorageConfig::default(),
    };

    let storage = MemoryStorage::new();
    for policy in policies {
        storage.add(policy)?;
    }

    match checker {
        CheckerKind::Exact => Guard::new(storage, StringExactChecker::new()).is_allowed(&inquiry),
        CheckerKind::Fuzzy => Guard::new(storage, StringFuzzyChecker::new()).is_allowed(&inquiry),
        CheckerKind::Regex => Guard::new(
            storage,
            RegexChecker::with_config(config.regex_start_tag, config.regex_end_tag, config.regex_cache_size),
        )
        .is_allowed(&inquiry),
        CheckerKind::Rules => Guard::new(storage, RulesChecker::new()).is_allowed(&inquiry),
    }
}

fn load_policies(path: &std::path::Path) -> WardenResult<Vec<Policy>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| WardenError::bad_argument(format!("failed to read '{}': {e}", path.display())))?;
    let raw: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| WardenError::serialization(format!("failed to parse '{}': {e}", path.display())))?;
    let array = raw
        .as_array()
        .ok_or_else(|| WardenError::serialization(format!("'{}' is not a JSON array of policies", path.display())))?;
    array
        .iter()
        .cloned()
        .map(warden_model::canonical::policy_from_json)
        .collect()
}

fn load_inquiry(path: &std::path::Path) -> WardenResult<Inquiry> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| WardenError::bad_argument(format!("failed to read '{}': {e}", path.display())))?;
    let raw: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| WardenError::serialization(format!("failed to parse '{}': {e}", path.display())))?;
    warden_model::canonical::inquiry_from_json(raw)
}
