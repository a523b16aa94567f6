use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{MissingData, Result};

use super::{MarketFamily, NamedSeries};

/// Series pulled from the first period of the first event that carries a history.
#[derive(Debug, Clone)]
pub struct HistoryExtract {
    /// Key of the period the history came from (e.g. `num_0`).
    pub period: String,
    /// One series per outcome, already in output column order.
    pub series: Vec<NamedSeries>,
}

impl HistoryExtract {
    pub fn column_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Reads `events[0].periods` and extracts the first period (document order) whose
/// `history` is a non-empty object. Once a period is chosen there is no fallback
/// to later periods.
pub fn extract_document(doc: &Value) -> Result<HistoryExtract> {
    let event = doc
        .get("events")
        .and_then(|e| e.as_array())
        .and_then(|a| a.first())
        .ok_or(MissingData::NoEvents)?;

    let periods = event
        .get("periods")
        .and_then(|p| p.as_object())
        .ok_or(MissingData::NoPeriods)?;

    let (period, history) = periods
        .iter()
        .find_map(|(key, period)| {
            period
                .get("history")
                .and_then(|h| h.as_object())
                .filter(|h| !h.is_empty())
                .map(|h| (key.clone(), h))
        })
        .ok_or(MissingData::NoHistory)?;

    info!("Processing history from period: {period}");

    let series = extract_history(history);
    if series.is_empty() {
        return Err(MissingData::NoSeries { period }.into());
    }

    Ok(HistoryExtract { period, series })
}

/// Extracts every family of a history object and returns the series in output
/// column order. When two families produce the same column name the later one wins.
pub fn extract_history(history: &Map<String, Value>) -> Vec<NamedSeries> {
    let mut series: Vec<NamedSeries> = Vec::new();

    for (key, body) in history {
        let Some(body) = body.as_object() else {
            warn!(family = %key, "skipping non-object history entry");
            continue;
        };
        let family = MarketFamily::from_key(key);
        for s in family.extract(body) {
            match series.iter_mut().find(|existing| existing.name == s.name) {
                Some(existing) => *existing = s,
                None => series.push(s),
            }
        }
    }

    order_columns(&mut series);
    info!("Extracted {} columns from history", series.len());
    series
}

/// Sorts series into output column order: money-line, spreads, totals, then the rest
/// by name. Stable and deterministic for identical input.
pub fn order_columns(series: &mut [NamedSeries]) {
    series.sort_by(|a, b| a.rank.compare(&b.rank).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    fn doc_with_history(history: Value) -> Value {
        json!({ "events": [ { "periods": { "num_0": { "history": history } } } ] })
    }

    fn missing(err: AppError) -> MissingData {
        match err {
            AppError::MissingData(m) => m,
            other => panic!("expected MissingData, got {other:?}"),
        }
    }

    #[test]
    fn columns_follow_family_order_rules() {
        let doc = doc_with_history(json!({
            "totals": {
                "3.25": { "over": [[1, 1.9]], "under": [[1, 1.9]] },
                "2.5": { "under": [[1, 2.1]], "over": [[1, 1.8]] },
            },
            "corners": { "over": [[1, 1.5]] },
            "spreads": {
                "0.5": { "away": [[1, 1.7]], "home": [[1, 2.2]] },
                "-0.75": { "home": [[1, 1.9]], "away": [[1, 2.0]] },
                "-1.5": { "home": [[1, 2.9]] },
            },
            "bookings": { "under": [[1, 1.5]] },
            "moneyline": { "away": [[1, 4.0]], "home": [[1, 1.5]], "draw": [[1, 3.2]] },
        }));

        let extract = extract_document(&doc).unwrap();
        assert_eq!(extract.period, "num_0");
        assert_eq!(
            extract.column_names(),
            [
                "money_line_home",
                "money_line_draw",
                "money_line_away",
                "spread_-1.5_home",
                "spread_-0.75_home",
                "spread_-0.75_away",
                "spread_0.5_home",
                "spread_0.5_away",
                "totals_2.5_over",
                "totals_2.5_under",
                "totals_3.25_over",
                "totals_3.25_under",
                "bookings_under",
                "corners_over",
            ]
        );
    }

    #[test]
    fn column_order_is_deterministic() {
        let doc = doc_with_history(json!({
            "spreads": { "1": { "home": [[1, 1.0]] }, "-1": { "away": [[1, 1.0]] } },
            "x": { "b": [[1, 1.0]], "a": [[1, 1.0]] },
        }));
        let first = extract_document(&doc).unwrap();
        let second = extract_document(&doc).unwrap();
        assert_eq!(first.column_names(), second.column_names());
    }

    #[test]
    fn first_period_with_history_is_selected() {
        let doc = json!({ "events": [ { "periods": {
            "num_0": { "history": {} },
            "num_1": { "history": { "moneyline": { "home": [[1, 1.5]] } } },
            "num_2": { "history": { "moneyline": { "home": [[1, 9.9]], "away": [[1, 1.1]] } } },
        } } ] });
        let extract = extract_document(&doc).unwrap();
        assert_eq!(extract.period, "num_1");
        assert_eq!(extract.column_names(), ["money_line_home"]);
    }

    #[test]
    fn chosen_period_without_series_does_not_fall_back() {
        let doc = json!({ "events": [ { "periods": {
            "num_0": { "history": { "moneyline": "suspended" } },
            "num_1": { "history": { "moneyline": { "home": [[1, 1.5]] } } },
        } } ] });
        let err = extract_document(&doc).unwrap_err();
        assert_eq!(missing(err), MissingData::NoSeries { period: "num_0".to_string() });
    }

    #[test]
    fn missing_sections_are_reported() {
        assert_eq!(missing(extract_document(&json!({})).unwrap_err()), MissingData::NoEvents);
        assert_eq!(
            missing(extract_document(&json!({ "events": [] })).unwrap_err()),
            MissingData::NoEvents
        );
        assert_eq!(
            missing(extract_document(&json!({ "events": [ { "home": "A" } ] })).unwrap_err()),
            MissingData::NoPeriods
        );
        assert_eq!(
            missing(
                extract_document(&json!({ "events": [ { "periods": { "num_0": {} } } ] }))
                    .unwrap_err()
            ),
            MissingData::NoHistory
        );
    }
}
