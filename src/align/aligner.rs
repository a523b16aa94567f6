use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::history::NamedSeries;
use crate::types::{FillMethod, OddsValue};

use super::audit::{FillAudit, FillRecord, RemovedRowRecord};

// ---------------------------------------------------------------------------
// Timestamp axis
// ---------------------------------------------------------------------------

/// Sorted union of every timestamp in a set of series. Strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimestampIndex(Vec<i64>);

impl TimestampIndex {
    pub fn from_series(series: &[NamedSeries]) -> Self {
        let all: BTreeSet<i64> = series
            .iter()
            .flat_map(|s| s.points.keys().copied())
            .collect();
        Self(all.into_iter().collect())
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub timestamp: i64,
    /// One slot per matrix column; `None` is an absent observation.
    pub cells: Vec<Option<OddsValue>>,
}

impl AlignedRow {
    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<AlignedRow>,
}

impl AlignedMatrix {
    /// One row per index entry, one slot per series, columns in the order given.
    pub fn build(series: &[NamedSeries], index: &TimestampIndex) -> Self {
        let columns = series.iter().map(|s| s.name.clone()).collect();
        let rows = index
            .as_slice()
            .iter()
            .map(|&ts| AlignedRow {
                timestamp: ts,
                cells: series.iter().map(|s| s.get(ts).cloned()).collect(),
            })
            .collect();
        Self { columns, rows }
    }

    pub fn column_values(&self, col: usize) -> impl Iterator<Item = Option<&OddsValue>> + '_ {
        self.rows.iter().map(move |r| r.cells[col].as_ref())
    }
}

/// Result of one alignment run.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub matrix: AlignedMatrix,
    pub audit: FillAudit,
}

// ---------------------------------------------------------------------------
// Alignment pipeline
// ---------------------------------------------------------------------------

/// Aligns `series` onto `index`, drops rows with `min_nonnull_per_row` or fewer
/// populated cells, then forward- and backward-fills each column.
///
/// Columns keep the order of `series`. Filtering happens before filling, so filled
/// values never decide whether a row survives. A column with no value in any
/// surviving row is left empty.
pub fn align(series: &[NamedSeries], index: &TimestampIndex, min_nonnull_per_row: usize) -> Alignment {
    let mut audit = FillAudit::new();
    let mut matrix = AlignedMatrix::build(series, index);
    let initial_rows = matrix.rows.len();

    drop_sparse_rows(&mut matrix, min_nonnull_per_row, &mut audit);
    forward_fill(&mut matrix, &mut audit);
    backward_fill(&mut matrix, &mut audit);

    info!(
        columns = matrix.columns.len(),
        rows_in = initial_rows,
        rows_out = matrix.rows.len(),
        fills = audit.total_fills(),
        "[ALIGN] aligned {} columns over {} timestamps ({} kept)",
        matrix.columns.len(),
        initial_rows,
        matrix.rows.len(),
    );

    Alignment { matrix, audit }
}

/// Builds the timestamp index from `series` and aligns onto it.
pub fn align_series(series: &[NamedSeries], min_nonnull_per_row: usize) -> Alignment {
    let index = TimestampIndex::from_series(series);
    align(series, &index, min_nonnull_per_row)
}

fn drop_sparse_rows(matrix: &mut AlignedMatrix, min_nonnull_per_row: usize, audit: &mut FillAudit) {
    let rows = std::mem::take(&mut matrix.rows);
    for (original_index, row) in rows.into_iter().enumerate() {
        let count = row.non_empty_count();
        if count > min_nonnull_per_row {
            matrix.rows.push(row);
        } else {
            debug!(timestamp = row.timestamp, count, "dropping sparse row");
            audit.record_removed(RemovedRowRecord {
                timestamp: row.timestamp,
                non_empty_count: count,
                original_index,
            });
        }
    }
}

fn forward_fill(matrix: &mut AlignedMatrix, audit: &mut FillAudit) {
    for (col, column) in matrix.columns.iter().enumerate() {
        let mut last: Option<OddsValue> = None;
        for (row_idx, row) in matrix.rows.iter_mut().enumerate() {
            if let Some(v) = &row.cells[col] {
                last = Some(v.clone());
                continue;
            }
            let Some(v) = &last else { continue };
            row.cells[col] = Some(v.clone());
            audit.record_fill(FillRecord {
                row: row_idx,
                timestamp: row.timestamp,
                column: column.clone(),
                value: v.clone(),
                method: FillMethod::ForwardFill,
            });
        }
    }
}

fn backward_fill(matrix: &mut AlignedMatrix, audit: &mut FillAudit) {
    for (col, column) in matrix.columns.iter().enumerate() {
        let Some((first_idx, first)) = matrix
            .rows
            .iter()
            .enumerate()
            .find_map(|(i, r)| r.cells[col].clone().map(|v| (i, v)))
        else {
            continue;
        };
        for (row_idx, row) in matrix.rows.iter_mut().enumerate().take(first_idx) {
            row.cells[col] = Some(first.clone());
            audit.record_fill(FillRecord {
                row: row_idx,
                timestamp: row.timestamp,
                column: column.clone(),
                value: first.clone(),
                method: FillMethod::BackwardFill,
            });
        }
    }
}
