//! Flattening of point-in-time "specials" payloads into per-outcome rows.

pub mod key_index;
pub mod normalize;
pub mod preview;
pub mod rows;

pub use key_index::{build_column_key_index, write_column_key_index, ColumnKeyEntry};
pub use normalize::normalize_label;
pub use preview::summarize_specials;
pub use rows::{column_key, flatten, pivot_wide, SnapshotRow, LONG_FIELDS};
