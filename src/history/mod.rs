//! Flattens a period's nested odds `history` into named, timestamp-keyed series.

pub mod extractor;
pub mod family;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{timestamp_from_json, OddsValue};

pub use extractor::{extract_document, extract_history, order_columns, HistoryExtract};
pub use family::{ColumnRank, MarketFamily};

/// One outcome's price history, keyed by epoch seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    pub rank: ColumnRank,
    pub points: BTreeMap<i64, OddsValue>,
}

impl NamedSeries {
    pub fn new(name: impl Into<String>, rank: ColumnRank) -> Self {
        Self {
            name: name.into(),
            rank,
            points: BTreeMap::new(),
        }
    }

    /// Builds a series from `[timestamp, value, ...]` tuples. Entries that are not
    /// arrays of at least two elements, or whose first two elements are not a
    /// timestamp and a number/string, are skipped. A repeated timestamp keeps the
    /// last value.
    pub fn from_tuples(name: impl Into<String>, rank: ColumnRank, tuples: &[Value]) -> Self {
        let mut series = Self::new(name, rank);
        for item in tuples {
            let Some(tuple) = item.as_array() else { continue };
            if tuple.len() < 2 {
                continue;
            }
            let (Some(ts), Some(value)) = (
                timestamp_from_json(&tuple[0]),
                OddsValue::from_json(&tuple[1]),
            ) else {
                continue;
            };
            series.points.insert(ts, value);
        }
        series
    }

    pub fn insert(&mut self, ts: i64, value: impl Into<OddsValue>) {
        self.points.insert(ts, value.into());
    }

    pub fn get(&self, ts: i64) -> Option<&OddsValue> {
        self.points.get(&ts)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_tuples_are_skipped() {
        let tuples = json!([
            [100, 1.5],
            [200],
            "garbage",
            [null, 1.7],
            [300, null],
            [400, 1.9, "extra", 7],
        ]);
        let series = NamedSeries::from_tuples("x", ColumnRank::Other, tuples.as_array().unwrap());
        let ts: Vec<_> = series.points.keys().copied().collect();
        assert_eq!(ts, [100, 400]);
        assert_eq!(series.get(400), Some(&OddsValue::from(1.9)));
    }

    #[test]
    fn duplicate_timestamp_keeps_last_value() {
        let tuples = json!([[100, 1.5], [100, 1.6]]);
        let series = NamedSeries::from_tuples("x", ColumnRank::Other, tuples.as_array().unwrap());
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(100), Some(&OddsValue::from(1.6)));
    }
}
