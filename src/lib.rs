//! Turns fetched betting-odds JSON into analysis-ready tables: a gap-filled,
//! timestamp-aligned matrix from market history, and CSV logs of special-market
//! snapshots whose columns may grow from one poll to the next.

pub mod align;
pub mod config;
pub mod error;
pub mod history;
pub mod output;
pub mod pipeline;
pub mod specials;
pub mod table;
pub mod types;

pub use error::{AppError, MissingData, Result};
