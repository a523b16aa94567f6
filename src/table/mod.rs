//! Persisted CSV tables whose header may grow between runs.
//!
//! Every append reads the whole file, computes the merged table in memory and
//! then replaces the file in one rename. Concurrent writers to the same path are
//! not coordinated.

pub mod file;
pub mod long;
pub mod wide;

use std::collections::HashMap;

pub use file::{read_table, write_table, StoredTable};
pub use long::{append_long, plan_long_append};
pub use wide::{append_wide, plan_wide_append, WideRow};

/// Comment written as the first line of every table.
pub fn match_comment(home: &str, away: &str, event_id: &str) -> String {
    format!("# Match: {home} vs {away} (event {event_id})")
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An ordered set of named fields. Field order decides where new columns land
/// when a record introduces them to a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Values laid out in `header` order; fields the record lacks are blank.
    pub fn project(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|h| self.get(h).unwrap_or_default().to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Header merging
// ---------------------------------------------------------------------------

/// Outcome of one append, for logging and callers that want to report it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendSummary {
    pub columns: usize,
    /// Columns this append introduced, in the order they were added.
    pub added_columns: Vec<String>,
    pub existing_rows: usize,
    pub appended_rows: usize,
}

/// Existing header order first, then every unseen incoming name in first-seen order.
fn merge_header<'a>(
    existing: &[String],
    incoming: impl IntoIterator<Item = &'a str>,
) -> (Vec<String>, Vec<String>) {
    let mut header = existing.to_vec();
    let mut added = Vec::new();
    for name in incoming {
        if !header.iter().any(|h| h == name) {
            header.push(name.to_string());
            added.push(name.to_string());
        }
    }
    (header, added)
}

/// Re-keys a positional row from `source` header order into `target` order.
/// Cells past the end of `row` are blank; cells past the end of `source` are dropped.
fn realign(source: &[String], row: &[String], target: &[String]) -> Vec<String> {
    let by_name: HashMap<&str, &str> = source
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), row.get(i).map(String::as_str).unwrap_or_default()))
        .collect();
    target
        .iter()
        .map(|h| by_name.get(h.as_str()).copied().unwrap_or_default().to_string())
        .collect()
}
