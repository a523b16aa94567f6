//! Timestamp alignment, sparsity filtering and gap filling.

pub mod aligner;
pub mod audit;

pub use aligner::{align, align_series, AlignedMatrix, AlignedRow, Alignment, TimestampIndex};
pub use audit::{AuditSummary, FillAudit, FillRecord, RemovedRowRecord};
