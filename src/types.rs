use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

// ---------------------------------------------------------------------------
// Observed values
// ---------------------------------------------------------------------------

/// One observation from a history tuple. Odds are normally numeric but the feed
/// occasionally carries strings, which are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OddsValue {
    Number(Number),
    Text(String),
}

impl OddsValue {
    /// Accepts JSON numbers and strings; anything else is not an observation.
    pub fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => Some(OddsValue::Number(n.clone())),
            Value::String(s) => Some(OddsValue::Text(s.clone())),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OddsValue::Number(n) => n.as_f64(),
            OddsValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for OddsValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OddsValue::Number(n) => write!(f, "{n}"),
            OddsValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for OddsValue {
    fn from(v: f64) -> Self {
        Number::from_f64(v)
            .map(OddsValue::Number)
            .unwrap_or_else(|| OddsValue::Text(v.to_string()))
    }
}

/// Epoch seconds from a history tuple's first element. Fractional seconds are truncated.
pub fn timestamp_from_json(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

// ---------------------------------------------------------------------------
// Fill policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    /// Carried forward from the last known value in the column.
    ForwardFill,
    /// Propagated backward from the column's first known value into a leading gap.
    BackwardFill,
}

impl std::fmt::Display for FillMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillMethod::ForwardFill => write!(f, "forward_fill"),
            FillMethod::BackwardFill => write!(f, "backward_fill"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    /// Raw epoch seconds.
    #[default]
    Epoch,
    /// `YYYY-MM-DD HH:MM:SS` in UTC.
    Human,
}

impl TimestampFormat {
    pub fn render(self, ts: i64) -> String {
        match self {
            TimestampFormat::Epoch => ts.to_string(),
            TimestampFormat::Human => DateTime::from_timestamp(ts, 0)
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| ts.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other} (expected csv or json)")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn odds_value_accepts_numbers_and_strings_only() {
        assert_eq!(OddsValue::from_json(&json!(1.5)), Some(OddsValue::from(1.5)));
        assert_eq!(OddsValue::from_json(&json!("off")), Some(OddsValue::Text("off".to_string())));
        assert!(OddsValue::from_json(&json!(null)).is_none());
        assert!(OddsValue::from_json(&json!([1])).is_none());
    }

    #[test]
    fn number_display_keeps_json_form() {
        assert_eq!(OddsValue::from_json(&json!(1.95)).unwrap().to_string(), "1.95");
        assert_eq!(OddsValue::from_json(&json!(3)).unwrap().to_string(), "3");
    }

    #[test]
    fn timestamp_truncates_fractional_seconds() {
        assert_eq!(timestamp_from_json(&json!(1700000000)), Some(1_700_000_000));
        assert_eq!(timestamp_from_json(&json!(1700000000.9)), Some(1_700_000_000));
        assert_eq!(timestamp_from_json(&json!("1700000000")), None);
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn human_timestamps_are_utc() {
        assert_eq!(TimestampFormat::Human.render(0), "1970-01-01 00:00:00");
        assert_eq!(TimestampFormat::Epoch.render(86_400), "86400");
    }
}
