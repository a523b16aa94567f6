use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::REMOVED_PREVIEW_LIMIT;
use crate::types::{FillMethod, OddsValue};

/// A slot that was absent and received a value during filling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillRecord {
    /// Position of the row in the filtered output matrix.
    pub row: usize,
    pub timestamp: i64,
    pub column: String,
    pub value: OddsValue,
    pub method: FillMethod,
}

/// A row dropped by the sparsity filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedRowRecord {
    pub timestamp: i64,
    pub non_empty_count: usize,
    /// Position of the row in the unfiltered matrix.
    pub original_index: usize,
}

/// Bookkeeping for one alignment run. Never feeds back into the matrix.
#[derive(Debug, Clone, Default)]
pub struct FillAudit {
    fills: Vec<FillRecord>,
    removed: Vec<RemovedRowRecord>,
}

impl FillAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fill(&mut self, record: FillRecord) {
        self.fills.push(record);
    }

    pub fn record_removed(&mut self, record: RemovedRowRecord) {
        self.removed.push(record);
    }

    pub fn fills(&self) -> &[FillRecord] {
        &self.fills
    }

    pub fn total_fills(&self) -> usize {
        self.fills.len()
    }

    pub fn fills_with_method(&self, method: FillMethod) -> usize {
        self.fills.iter().filter(|f| f.method == method).count()
    }

    pub fn fills_by_column(&self) -> BTreeMap<&str, Vec<&FillRecord>> {
        let mut out: BTreeMap<&str, Vec<&FillRecord>> = BTreeMap::new();
        for f in &self.fills {
            out.entry(f.column.as_str()).or_default().push(f);
        }
        out
    }

    pub fn fills_by_row(&self) -> BTreeMap<usize, Vec<&FillRecord>> {
        let mut out: BTreeMap<usize, Vec<&FillRecord>> = BTreeMap::new();
        for f in &self.fills {
            out.entry(f.row).or_default().push(f);
        }
        out
    }

    pub fn removed_rows(&self) -> &[RemovedRowRecord] {
        &self.removed
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// First few removed rows, for reports.
    pub fn removed_preview(&self) -> &[RemovedRowRecord] {
        &self.removed[..self.removed.len().min(REMOVED_PREVIEW_LIMIT)]
    }

    pub fn summary(&self) -> AuditSummary {
        AuditSummary {
            total_fills: self.total_fills(),
            forward_fills: self.fills_with_method(FillMethod::ForwardFill),
            backward_fills: self.fills_with_method(FillMethod::BackwardFill),
            fills_per_column: self
                .fills_by_column()
                .into_iter()
                .map(|(column, fills)| (column.to_string(), fills.len()))
                .collect(),
            rows_with_fills: self.fills_by_row().len(),
            removed_rows: self.removed_count(),
            removed_preview: self.removed_preview().to_vec(),
        }
    }

    pub fn log_summary(&self) {
        info!(
            total_fills = self.total_fills(),
            forward = self.fills_with_method(FillMethod::ForwardFill),
            backward = self.fills_with_method(FillMethod::BackwardFill),
            removed_rows = self.removed_count(),
            "[ALIGN] filled {} cells ({} forward, {} backward), removed {} sparse rows",
            self.total_fills(),
            self.fills_with_method(FillMethod::ForwardFill),
            self.fills_with_method(FillMethod::BackwardFill),
            self.removed_count(),
        );
        for (column, fills) in self.fills_by_column() {
            info!("[ALIGN]   {column}: {} filled", fills.len());
        }
        if !self.removed.is_empty() {
            warn!(
                "[ALIGN] sample of {} removed rows (of {}):",
                self.removed_preview().len(),
                self.removed_count()
            );
            for r in self.removed_preview() {
                warn!(
                    "[ALIGN]   row {} at {} had {} non-empty cells",
                    r.original_index, r.timestamp, r.non_empty_count
                );
            }
        }
    }
}

/// Serializable digest of a [`FillAudit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSummary {
    pub total_fills: usize,
    pub forward_fills: usize,
    pub backward_fills: usize,
    pub fills_per_column: BTreeMap<String, usize>,
    pub rows_with_fills: usize,
    pub removed_rows: usize,
    pub removed_preview: Vec<RemovedRowRecord>,
}
