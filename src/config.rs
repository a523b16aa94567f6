use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Rows must have strictly more populated cells than this to survive alignment.
pub const DEFAULT_MIN_NONNULL_PER_ROW: usize = 20;

/// Number of removed rows kept in the audit preview. The full count is always retained.
pub const REMOVED_PREVIEW_LIMIT: usize = 10;

/// Number of special markets summarised after a specials run.
pub const DEFAULT_SPECIALS_PREVIEW: usize = 10;

/// First column of the wide table: the capture time of each fetch.
pub const FETCHED_AT_COLUMN: &str = "fetched_at";

/// First column of a rendered alignment matrix.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

pub const DEFAULT_LONG_CSV_PATH: &str = "data/special_markets.csv";
pub const DEFAULT_WIDE_CSV_PATH: &str = "data/special_markets_wide.csv";
pub const DEFAULT_KEY_JSON_PATH: &str = "data/special_markets_column_key.json";

/// Process-wide settings for the command-line driver. The library core never reads this;
/// every path and threshold reaches it as an explicit argument.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Sparsity threshold for alignment runs (MIN_NONNULL_PER_ROW)
    pub min_nonnull_per_row: usize,
    /// Long-form specials table (SPECIALS_LONG_CSV)
    pub long_csv_path: PathBuf,
    /// Wide-form specials table (SPECIALS_WIDE_CSV)
    pub wide_csv_path: PathBuf,
    /// Column key document (SPECIALS_KEY_JSON)
    pub key_json_path: PathBuf,
    /// Markets summarised in the log after a specials run (SPECIALS_PREVIEW)
    pub specials_preview: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            min_nonnull_per_row: std::env::var("MIN_NONNULL_PER_ROW")
                .unwrap_or_else(|_| DEFAULT_MIN_NONNULL_PER_ROW.to_string())
                .parse::<usize>()
                .map_err(|_| {
                    AppError::Config("MIN_NONNULL_PER_ROW must be a non-negative integer".to_string())
                })?,
            long_csv_path: std::env::var("SPECIALS_LONG_CSV")
                .unwrap_or_else(|_| DEFAULT_LONG_CSV_PATH.to_string())
                .into(),
            wide_csv_path: std::env::var("SPECIALS_WIDE_CSV")
                .unwrap_or_else(|_| DEFAULT_WIDE_CSV_PATH.to_string())
                .into(),
            key_json_path: std::env::var("SPECIALS_KEY_JSON")
                .unwrap_or_else(|_| DEFAULT_KEY_JSON_PATH.to_string())
                .into(),
            specials_preview: std::env::var("SPECIALS_PREVIEW")
                .unwrap_or_else(|_| DEFAULT_SPECIALS_PREVIEW.to_string())
                .parse::<usize>()
                .unwrap_or(DEFAULT_SPECIALS_PREVIEW),
        })
    }
}
