use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing data: {0}")]
    MissingData(MissingData),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a history document could not produce any series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingData {
    NoEvents,
    NoPeriods,
    NoHistory,
    /// The chosen period had a history section but none of its families held an outcome array.
    NoSeries { period: String },
}

impl std::fmt::Display for MissingData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingData::NoEvents => write!(f, "no events found in document"),
            MissingData::NoPeriods => write!(f, "no periods found in event"),
            MissingData::NoHistory => write!(f, "no history section found in any period"),
            MissingData::NoSeries { period } => {
                write!(f, "history in period {period} contains no market series")
            }
        }
    }
}

impl From<MissingData> for AppError {
    fn from(m: MissingData) -> Self {
        AppError::MissingData(m)
    }
}

impl From<tempfile::PersistError> for AppError {
    fn from(e: tempfile::PersistError) -> Self {
        AppError::Io(e.error)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
