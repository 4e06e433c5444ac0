//! Delimited-regex matching (§4.2.2).
//!
//! A policy element may embed raw regex segments between a pair of
//! delimiter tags (`<` and `>` by default) — `"repos/<[a-z]+>/tensorflow"`
//! compiles to a pattern where everything outside the tags is matched
//! literally and everything inside is spliced in as regex source. An element
//! with no delimiters degrades to an exact string match (the whole thing is
//! escaped). Matching is always against the full string, never a substring
//! search — the compiled pattern is anchored with `^...$`.
//!
//! Compiled patterns are cached in a bounded LRU keyed by the raw element
//! text, so a policy set that's read on every inquiry doesn't recompile its
//! patterns each time.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use regex::Regex;
use warden_model::{Inquiry, InquiryValue, MatchElement, Policy, PolicyType, WardenResult};

use super::{context_matches, Checker, CheckerHint};

const DEFAULT_CACHE_SIZE: usize = 1024;
const DEFAULT_START_TAG: &str = "<";
const DEFAULT_END_TAG: &str = ">";

/// Compiles `raw` into a full-string-anchored pattern, splicing the text
/// between `start_tag`/`end_tag` in as regex source and escaping everything
/// else. No delimiters present means the whole string is escaped, which
/// makes the resulting pattern an exact match.
fn compile_pattern(raw: &str, start_tag: &str, end_tag: &str) -> WardenResult<Regex> {
    let mut pattern = String::from("^");
    let mut rest = raw;
    loop {
        match rest.find(start_tag) {
            None => {
                pattern.push_str(&regex::escape(rest));
                break;
            }
            Some(start_idx) => {
                pattern.push_str(&regex::escape(&rest[..start_idx]));
                let after_start = &rest[start_idx + start_tag.len()..];
                match after_start.find(end_tag) {
                    None => {
                        // Unterminated tag: treat the remainder literally, tag included.
                        pattern.push_str(&regex::escape(&rest[start_idx..]));
                        break;
                    }
                    Some(end_idx) => {
                        pattern.push_str(&after_start[..end_idx]);
                        rest = &after_start[end_idx + end_tag.len()..];
                    }
                }
            }
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|e| warden_model::WardenError::validation(format!("invalid embedded regex in '{raw}': {e}")))
}

/// Matches policy elements with embedded `<regex>` segments against the full
/// inquiry value. Only ever fits `STRING_BASED` policies.
pub struct RegexChecker {
    start_tag: String,
    end_tag: String,
    cache: Mutex<LruCache<String, Regex>>,
}

impl RegexChecker {
    /// A checker using the default `<`/`>` delimiters and a 1024-entry cache.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_START_TAG, DEFAULT_END_TAG, DEFAULT_CACHE_SIZE)
    }

    /// A checker with custom delimiter tags and cache capacity.
    pub fn with_config(start_tag: impl Into<String>, end_tag: impl Into<String>, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap());
        Self {
            start_tag: start_tag.into(),
            end_tag: end_tag.into(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn get_or_compile(&self, raw: &str) -> WardenResult<Regex> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(re) = cache.get(raw) {
            return Ok(re.clone());
        }
        let re = compile_pattern(raw, &self.start_tag, &self.end_tag)?;
        cache.put(raw.to_string(), re.clone());
        Ok(re)
    }

    fn field_matches(&self, elements: &[MatchElement], value: &InquiryValue) -> bool {
        let Some(actual) = value.as_plain_str() else { return false };
        elements.iter().any(|el| match el {
            MatchElement::Literal(raw) => match self.get_or_compile(raw) {
                Ok(re) => re.is_match(actual),
                Err(e) => {
                    tracing::error!(element = %raw, error = %e, "embedded regex failed to compile; element never matches");
                    false
                }
            },
            MatchElement::Atom(_) | MatchElement::Object(_) => false,
        })
    }
}

impl Default for RegexChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for RegexChecker {
    fn fits(&self, policy: &Policy, inquiry: &Inquiry) -> bool {
        if policy.policy_type() != PolicyType::StringBased {
            return false;
        }
        self.field_matches(&policy.subjects, &inquiry.subject)
            && self.field_matches(&policy.actions, &inquiry.action)
            && self.field_matches(&policy.resources, &inquiry.resource)
            && context_matches(policy, inquiry)
    }

    fn hint(&self) -> CheckerHint {
        CheckerHint::Regex
    }
}
