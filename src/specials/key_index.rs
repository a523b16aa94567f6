use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::table::file::write_atomic;

use super::rows::SnapshotRow;

/// Human-readable details behind one wide-table column key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnKeyEntry {
    pub category: String,
    pub market_name: String,
    pub outcome_name: String,
    pub home_team: String,
    pub away_team: String,
}

/// Maps every column key of a fetch to the labels that produced it.
/// Later rows overwrite earlier ones with the same key.
pub fn build_column_key_index(rows: &[SnapshotRow]) -> BTreeMap<String, ColumnKeyEntry> {
    rows.iter()
        .filter(|r| !r.column_key.is_empty())
        .map(|r| {
            (
                r.column_key.clone(),
                ColumnKeyEntry {
                    category: r.category.clone().unwrap_or_default(),
                    market_name: r.market_name.clone(),
                    outcome_name: r.outcome_name.clone(),
                    home_team: r.home_team.clone(),
                    away_team: r.away_team.clone(),
                },
            )
        })
        .collect()
}

/// Writes the index as pretty-printed JSON, replacing `path`.
pub fn write_column_key_index(path: &Path, index: &BTreeMap<String, ColumnKeyEntry>) -> Result<()> {
    write_atomic(path, |out| {
        serde_json::to_writer_pretty(&mut *out, index)?;
        writeln!(out)?;
        Ok(())
    })
}
