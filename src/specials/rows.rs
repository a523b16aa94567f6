use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::FETCHED_AT_COLUMN;
use crate::table::{Record, WideRow};

use super::normalize::normalize_label;

const DEFAULT_HOME_TEAM: &str = "Home Team";
const DEFAULT_AWAY_TEAM: &str = "Away Team";

/// Long-table field order for a snapshot row.
pub const LONG_FIELDS: [&str; 19] = [
    "special_id",
    "event_id",
    "league_id",
    "category",
    "market_name",
    "bet_type",
    "starts",
    "cutoff",
    "home_team",
    "away_team",
    "line_id",
    "outcome_id",
    "outcome_name",
    "rot_num",
    "handicap",
    "price",
    "fetched_at",
    "api_last",
    "column_key",
];

/// One outcome of one special market, as captured by a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub special_id: Option<String>,
    pub event_id: Option<String>,
    pub league_id: Option<String>,
    pub category: Option<String>,
    pub market_name: String,
    pub bet_type: Option<String>,
    pub starts: Option<String>,
    pub cutoff: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub line_id: Option<String>,
    pub outcome_id: Option<String>,
    pub outcome_name: String,
    pub rot_num: Option<String>,
    pub handicap: Option<f64>,
    pub price: Option<f64>,
    pub fetched_at: String,
    pub api_last: Option<String>,
    /// `category | market | outcome`, the wide-table column for this outcome.
    pub column_key: String,
}

impl SnapshotRow {
    pub fn to_record(&self) -> Record {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let num = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();

        Record::new()
            .with("special_id", opt(&self.special_id))
            .with("event_id", opt(&self.event_id))
            .with("league_id", opt(&self.league_id))
            .with("category", opt(&self.category))
            .with("market_name", self.market_name.as_str())
            .with("bet_type", opt(&self.bet_type))
            .with("starts", opt(&self.starts))
            .with("cutoff", opt(&self.cutoff))
            .with("home_team", self.home_team.as_str())
            .with("away_team", self.away_team.as_str())
            .with("line_id", opt(&self.line_id))
            .with("outcome_id", opt(&self.outcome_id))
            .with("outcome_name", self.outcome_name.as_str())
            .with("rot_num", opt(&self.rot_num))
            .with("handicap", num(self.handicap))
            .with("price", num(self.price))
            .with("fetched_at", self.fetched_at.as_str())
            .with("api_last", opt(&self.api_last))
            .with("column_key", self.column_key.as_str())
    }
}

/// Builds the wide-table column key. Blank parts fall back to placeholders so
/// every outcome gets a three-part key.
pub fn column_key(category: Option<&str>, market: &str, outcome: &str) -> String {
    let part = |s: Option<&str>, fallback: &'static str| -> String {
        s.filter(|s| !s.is_empty()).unwrap_or(fallback).to_string()
    };
    format!(
        "{} | {} | {}",
        part(category, "Uncategorized"),
        part(Some(market), "Unknown Market"),
        part(Some(outcome), "Outcome"),
    )
}

/// Flattens a specials payload (`{"specials": [...], "last": ...}`) into one row
/// per outcome, stamped with `fetched_at`. A payload without a `specials` list
/// yields no rows.
pub fn flatten(payload: &Value, fetched_at: &str) -> Vec<SnapshotRow> {
    let api_last = payload.get("last").and_then(scalar_text);
    let Some(specials) = payload.get("specials").and_then(|s| s.as_array()) else {
        debug!("payload has no specials list");
        return Vec::new();
    };

    let mut rows = Vec::new();
    for special in specials {
        flatten_special(special, fetched_at, api_last.as_deref(), &mut rows);
    }
    info!(
        "Flattened {} special markets to {} outcome rows",
        specials.len(),
        rows.len()
    );
    rows
}

fn flatten_special(special: &Value, fetched_at: &str, api_last: Option<&str>, out: &mut Vec<SnapshotRow>) {
    let event = special.get("event");
    let home_team = team_name(event, "home", DEFAULT_HOME_TEAM);
    let away_team = team_name(event, "away", DEFAULT_AWAY_TEAM);

    let category = special.get("category").and_then(scalar_text);
    let market_name = normalize_label(
        special.get("name").and_then(|v| v.as_str()),
        &home_team,
        &away_team,
        category.as_deref(),
    );

    for line in lines_of(special) {
        let outcome_name = normalize_label(
            line.get("name").and_then(|v| v.as_str()),
            &home_team,
            &away_team,
            category.as_deref(),
        );
        out.push(SnapshotRow {
            special_id: special.get("special_id").and_then(scalar_text),
            event_id: special.get("event_id").and_then(scalar_text),
            league_id: special.get("league_id").and_then(scalar_text),
            column_key: column_key(category.as_deref(), &market_name, &outcome_name),
            category: category.clone(),
            market_name: market_name.clone(),
            bet_type: special.get("bet_type").and_then(scalar_text),
            starts: special.get("starts").and_then(scalar_text),
            cutoff: special.get("cutoff").and_then(scalar_text),
            home_team: home_team.clone(),
            away_team: away_team.clone(),
            line_id: line.get("line_id").and_then(scalar_text),
            outcome_id: line.get("id").and_then(scalar_text),
            outcome_name,
            rot_num: line.get("rot_num").and_then(scalar_text),
            handicap: line.get("handicap").and_then(number),
            price: line.get("price").and_then(number),
            fetched_at: fetched_at.to_string(),
            api_last: api_last.map(str::to_string),
        });
    }
}

fn team_name(event: Option<&Value>, side: &str, fallback: &str) -> String {
    event
        .and_then(|e| e.get(side))
        .and_then(|v| v.as_str())
        .unwrap_or(fallback)
        .to_string()
}

/// Outcome objects of a special market. `lines` is normally an object keyed by
/// line id; an array of outcomes is accepted too.
pub(crate) fn lines_of(special: &Value) -> Vec<&Value> {
    match special.get("lines") {
        Some(Value::Object(map)) => map.values().filter(|v| v.is_object()).collect(),
        Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
        _ => Vec::new(),
    }
}

/// Text form of a JSON scalar; null, arrays and objects have none.
pub(crate) fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Pivots one fetch into a single wide row: `fetched_at` followed by the sorted
/// distinct column keys. When two outcomes share a key the later price wins.
pub fn pivot_wide(rows: &[SnapshotRow]) -> WideRow {
    let Some(first) = rows.first() else {
        return WideRow::default();
    };

    let mut prices: BTreeMap<&str, Option<f64>> = BTreeMap::new();
    for row in rows {
        prices.insert(row.column_key.as_str(), row.price);
    }
    if prices.len() < rows.len() {
        debug!(
            collisions = rows.len() - prices.len(),
            "column key collisions, keeping last price"
        );
    }

    let mut header = vec![FETCHED_AT_COLUMN.to_string()];
    let mut values = vec![first.fetched_at.clone()];
    for (key, price) in prices {
        header.push(key.to_string());
        values.push(price.map(|p| p.to_string()).unwrap_or_default());
    }
    WideRow { header, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FETCHED_AT: &str = "2025-03-01T12:00:00+00:00";

    fn payload() -> Value {
        json!({
            "last": 1740830400,
            "specials": [
                {
                    "special_id": 1601,
                    "event_id": 1619456922,
                    "league_id": 2196,
                    "category": "Team Props",
                    "name": "Team Props - Barcelona Total Corners?",
                    "bet_type": "MULTI_WAY_HEAD_TO_HEAD",
                    "starts": "2025-03-01T20:00:00",
                    "cutoff": "2025-03-01T20:00:00",
                    "event": { "home": "Barcelona", "away": "Atletico Madrid" },
                    "lines": {
                        "11": { "id": 11, "line_id": 501, "name": "Over", "handicap": 5.5, "price": 1.87, "rot_num": 3001 },
                        "12": { "id": 12, "line_id": 502, "name": "Under", "handicap": 5.5, "price": 1.95 }
                    }
                },
                {
                    "special_id": 1602,
                    "category": "Goals",
                    "name": "Will Atletico Madrid score?",
                    "event": { "home": "Barcelona", "away": "Atletico Madrid" },
                    "lines": {}
                },
                {
                    "special_id": 1603,
                    "name": "Winner",
                    "lines": { "1": { "name": "Barcelona", "price": "2.10" } }
                }
            ]
        })
    }

    #[test]
    fn flattens_one_row_per_outcome() {
        let rows = flatten(&payload(), FETCHED_AT);
        assert_eq!(rows.len(), 3);

        let over = &rows[0];
        assert_eq!(over.special_id.as_deref(), Some("1601"));
        assert_eq!(over.market_name, "Home Total Corners");
        assert_eq!(over.outcome_name, "Over");
        assert_eq!(over.price, Some(1.87));
        assert_eq!(over.handicap, Some(5.5));
        assert_eq!(over.api_last.as_deref(), Some("1740830400"));
        assert_eq!(over.column_key, "Team Props | Home Total Corners | Over");
        assert_eq!(over.fetched_at, FETCHED_AT);
    }

    #[test]
    fn missing_metadata_falls_back_to_placeholders() {
        let rows = flatten(&payload(), FETCHED_AT);
        let winner = &rows[2];
        assert_eq!(winner.home_team, "Home Team");
        assert_eq!(winner.category, None);
        assert_eq!(winner.outcome_name, "Barcelona");
        assert_eq!(winner.price, Some(2.10));
        assert_eq!(winner.column_key, "Uncategorized | Winner | Barcelona");
    }

    #[test]
    fn home_team_literal_is_normalized() {
        let payload = json!({ "specials": [ {
            "category": "Goals",
            "name": "Barcelona to score?",
            "event": { "home": "Barcelona", "away": "Getafe" },
            "lines": { "1": { "name": "Yes Barcelona", "price": 1.3 } }
        } ] });
        let rows = flatten(&payload, FETCHED_AT);
        assert_eq!(rows[0].market_name, "Home to score");
        assert_eq!(rows[0].column_key, "Goals | Home to score | Yes Home");
    }

    #[test]
    fn absent_specials_list_yields_no_rows() {
        assert!(flatten(&json!({ "last": 1 }), FETCHED_AT).is_empty());
        assert!(flatten(&json!({ "specials": [] }), FETCHED_AT).is_empty());
    }

    #[test]
    fn record_uses_long_field_order() {
        let rows = flatten(&payload(), FETCHED_AT);
        let record = rows[1].to_record();
        assert_eq!(record.keys().collect::<Vec<_>>(), LONG_FIELDS);
        assert_eq!(record.get("rot_num"), Some(""));
        assert_eq!(record.get("price"), Some("1.95"));
    }

    #[test]
    fn pivot_sorts_keys_and_last_price_wins() {
        let mut rows = flatten(&payload(), FETCHED_AT);
        let mut dup = rows[0].clone();
        dup.price = Some(1.5);
        rows.push(dup);

        let wide = pivot_wide(&rows);
        assert_eq!(
            wide.header,
            [
                "fetched_at",
                "Team Props | Home Total Corners | Over",
                "Team Props | Home Total Corners | Under",
                "Uncategorized | Winner | Barcelona",
            ]
        );
        assert_eq!(wide.values, [FETCHED_AT, "1.5", "1.95", "2.1"]);
    }

    #[test]
    fn pivot_of_nothing_is_empty() {
        assert!(pivot_wide(&[]).is_empty());
    }
}
