//! Code mapping profiles.
//!
//! Each organization codes attendance its own way ("A", "AB", "ab." all
//! meaning Absent). A mapping profile translates source tokens to the
//! canonical status vocabulary of the target system, or to [`IGNORE`]
//! for codes that must produce no record (typically "present").
//! Profiles are owned independently of any job and read-only at
//! extraction time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel target meaning "emit no record for this code".
pub const IGNORE: &str = "IGNORE";

/// One profile entry as authored and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMappingEntry {
    pub source_code: String,
    pub target_status: String,
}

/// A source-token to canonical-status table. Lookups are
/// case-insensitive; tokens are trimmed and uppercased on entry.
#[derive(Debug, Clone, Default)]
pub struct CodeMapping {
    entries: HashMap<String, String>,
}

impl CodeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = CodeMappingEntry>,
    {
        let mut mapping = Self::new();
        for entry in entries {
            mapping.insert(&entry.source_code, &entry.target_status);
        }
        mapping
    }

    pub fn insert(&mut self, source_code: &str, target_status: &str) {
        self.entries.insert(
            normalize_token(source_code),
            target_status.trim().to_string(),
        );
    }

    /// Raw lookup, including `IGNORE` targets.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(&normalize_token(token)).map(String::as_str)
    }

    /// The status to emit for a token, or `None` when the token is
    /// unmapped or mapped to [`IGNORE`]. Absence of a record means "no
    /// actionable status", not "absent".
    pub fn actionable_status(&self, token: &str) -> Option<&str> {
        self.get(token).filter(|status| *status != IGNORE)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn normalize_token(token: &str) -> String {
    token.trim().to_uppercase()
}
