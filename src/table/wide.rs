use std::path::Path;

use tracing::info;

use crate::error::Result;

use super::file::{read_table, write_table, StoredTable};
use super::{merge_header, realign, AppendSummary};

/// One fetch pivoted to a single row: `header[0]` is the capture-time column and
/// the rest are column keys, with `values` in the same positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WideRow {
    pub header: Vec<String>,
    pub values: Vec<String>,
}

impl WideRow {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }
}

/// Computes the wide table that results from appending `row` to `existing`.
/// Existing rows are re-aligned by column name, blank under columns introduced later.
pub fn plan_wide_append(
    existing: &StoredTable,
    comment: &str,
    row: &WideRow,
) -> (StoredTable, AppendSummary) {
    let (header, added_columns) =
        merge_header(&existing.header, row.header.iter().map(String::as_str));

    let mut rows: Vec<Vec<String>> = existing
        .rows
        .iter()
        .map(|r| realign(&existing.header, r, &header))
        .collect();
    rows.push(realign(&row.header, &row.values, &header));

    let summary = AppendSummary {
        columns: header.len(),
        added_columns,
        existing_rows: existing.rows.len(),
        appended_rows: 1,
    };
    let table = StoredTable {
        comment: Some(comment.to_string()),
        header,
        rows,
    };
    (table, summary)
}

/// Appends one pivoted fetch to the wide table at `path`, rewriting the whole file.
/// A row with no header leaves the file untouched.
pub fn append_wide(path: &Path, comment: &str, row: &WideRow) -> Result<AppendSummary> {
    if row.is_empty() {
        return Ok(AppendSummary::default());
    }

    let existing = read_table(path)?;
    let (table, summary) = plan_wide_append(&existing, comment, row);
    write_table(path, &table)?;

    if !summary.added_columns.is_empty() {
        info!(
            "[TABLE] wide: {} new columns, header now {} wide",
            summary.added_columns.len(),
            summary.columns
        );
    }
    info!(
        path = %path.display(),
        rows = summary.existing_rows + 1,
        "[TABLE] wide: appended fetch row"
    );
    Ok(summary)
}
