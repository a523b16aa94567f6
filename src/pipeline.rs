//! End-to-end runs over already-fetched JSON: history → aligned matrix, and
//! specials → long/wide tables plus the column key document.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, warn};

use crate::align::{align_series, Alignment};
use crate::error::Result;
use crate::history::extract_document;
use crate::specials::{build_column_key_index, flatten, pivot_wide, write_column_key_index};
use crate::table::{append_long, append_wide, match_comment, AppendSummary, Record};

/// Aligned history for one event.
#[derive(Debug, Clone)]
pub struct HistoryRun {
    pub period: String,
    pub alignment: Alignment,
}

/// Extracts the document's history and aligns it with the given sparsity threshold.
pub fn align_document(doc: &Value, min_nonnull_per_row: usize) -> Result<HistoryRun> {
    let extract = extract_document(doc)?;
    let alignment = align_series(&extract.series, min_nonnull_per_row);
    alignment.audit.log_summary();
    Ok(HistoryRun {
        period: extract.period,
        alignment,
    })
}

/// Where a specials run writes its outputs.
#[derive(Debug, Clone)]
pub struct SpecialsTargets {
    pub long_csv: PathBuf,
    pub wide_csv: PathBuf,
    pub key_json: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialsRun {
    pub rows: usize,
    pub long: AppendSummary,
    pub wide: AppendSummary,
    pub column_keys: usize,
}

/// Flattens one specials payload and merges it into the persisted tables.
///
/// `event_id` labels the tables' comment line; when absent the first row's
/// event id is used. A payload with no outcomes writes nothing.
pub fn record_specials(
    payload: &Value,
    event_id: Option<&str>,
    fetched_at: &str,
    targets: &SpecialsTargets,
) -> Result<SpecialsRun> {
    let rows = flatten(payload, fetched_at);
    let Some(first) = rows.first() else {
        warn!("No special market outcomes in payload, tables left unchanged");
        return Ok(SpecialsRun::default());
    };

    let event_id = event_id
        .map(str::to_string)
        .or_else(|| first.event_id.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let comment = match_comment(&first.home_team, &first.away_team, &event_id);

    let records: Vec<Record> = rows.iter().map(|r| r.to_record()).collect();
    let long = append_long(&targets.long_csv, &comment, &records)?;
    info!("Wrote specials rows to {}", targets.long_csv.display());

    let wide = append_wide(&targets.wide_csv, &comment, &pivot_wide(&rows))?;
    info!("Wrote pivoted specials to {}", targets.wide_csv.display());

    let index = build_column_key_index(&rows);
    write_column_key_index(&targets.key_json, &index)?;
    info!("Wrote column key for {} columns to {}", index.len(), targets.key_json.display());

    Ok(SpecialsRun {
        rows: rows.len(),
        long,
        wide,
        column_keys: index.len(),
    })
}
