use std::cmp::Ordering;

use serde_json::{Map, Value};
use tracing::debug;

use super::NamedSeries;

const MONEYLINE_SIDES: [(&str, &str); 3] = [
    ("home", "money_line_home"),
    ("draw", "money_line_draw"),
    ("away", "money_line_away"),
];
const SPREAD_SIDES: [&str; 2] = ["home", "away"];
const TOTALS_SIDES: [&str; 2] = ["over", "under"];

/// A top-level key of a period's `history` object. Each variant knows how its
/// outcome arrays are nested and how its columns are named and ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketFamily {
    Moneyline,
    Spreads,
    Totals,
    Other(String),
}

impl MarketFamily {
    pub fn from_key(key: &str) -> Self {
        match key {
            "moneyline" => MarketFamily::Moneyline,
            "spreads" => MarketFamily::Spreads,
            "totals" => MarketFamily::Totals,
            other => MarketFamily::Other(other.to_string()),
        }
    }

    /// One series per outcome array found under this family's object.
    pub fn extract(&self, body: &Map<String, Value>) -> Vec<NamedSeries> {
        let mut out = Vec::new();
        match self {
            MarketFamily::Moneyline => {
                for (position, (side, column)) in MONEYLINE_SIDES.iter().enumerate() {
                    if let Some(tuples) = body.get(*side).and_then(|v| v.as_array()) {
                        out.push(NamedSeries::from_tuples(
                            *column,
                            ColumnRank::MoneyLine(position as u8),
                            tuples,
                        ));
                    }
                }
            }
            MarketFamily::Spreads => {
                for (handicap, sides) in body {
                    let Some(sides) = sides.as_object() else { continue };
                    let value = parse_line(handicap);
                    for (side_rank, side) in SPREAD_SIDES.iter().enumerate() {
                        if let Some(tuples) = sides.get(*side).and_then(|v| v.as_array()) {
                            out.push(NamedSeries::from_tuples(
                                format!("spread_{handicap}_{side}"),
                                ColumnRank::Spread { handicap: value, side: side_rank as u8 },
                                tuples,
                            ));
                        }
                    }
                }
            }
            MarketFamily::Totals => {
                for (line, sides) in body {
                    let Some(sides) = sides.as_object() else { continue };
                    let value = parse_line(line);
                    for (side_rank, side) in TOTALS_SIDES.iter().enumerate() {
                        if let Some(tuples) = sides.get(*side).and_then(|v| v.as_array()) {
                            out.push(NamedSeries::from_tuples(
                                format!("totals_{line}_{side}"),
                                ColumnRank::Totals { line: value, side: side_rank as u8 },
                                tuples,
                            ));
                        }
                    }
                }
            }
            MarketFamily::Other(family) => {
                for (sub_key, tuples) in body {
                    if let Some(tuples) = tuples.as_array() {
                        out.push(NamedSeries::from_tuples(
                            format!("{family}_{sub_key}"),
                            ColumnRank::Other,
                            tuples,
                        ));
                    }
                }
            }
        }

        for series in &out {
            debug!(column = %series.name, values = series.len(), "extracted column");
        }
        out
    }
}

impl std::fmt::Display for MarketFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketFamily::Moneyline => write!(f, "moneyline"),
            MarketFamily::Spreads => write!(f, "spreads"),
            MarketFamily::Totals => write!(f, "totals"),
            MarketFamily::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Handicap and total-line keys that fail to parse sort as 0.0.
fn parse_line(key: &str) -> f64 {
    key.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Column ordering
// ---------------------------------------------------------------------------

/// Output position of a column: money-line in fixed order, then spreads by handicap,
/// then totals by line, then everything else by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnRank {
    /// 0 = home, 1 = draw, 2 = away.
    MoneyLine(u8),
    /// `side`: 0 = home, 1 = away.
    Spread { handicap: f64, side: u8 },
    /// `side`: 0 = over, 1 = under.
    Totals { line: f64, side: u8 },
    Other,
}

impl ColumnRank {
    fn group(&self) -> u8 {
        match self {
            ColumnRank::MoneyLine(_) => 0,
            ColumnRank::Spread { .. } => 1,
            ColumnRank::Totals { .. } => 2,
            ColumnRank::Other => 3,
        }
    }

    /// Total order over ranks. Equal ranks are left to the caller's name tie-break.
    pub fn compare(&self, other: &ColumnRank) -> Ordering {
        match (self, other) {
            (ColumnRank::MoneyLine(a), ColumnRank::MoneyLine(b)) => a.cmp(b),
            (
                ColumnRank::Spread { handicap: a, side: sa },
                ColumnRank::Spread { handicap: b, side: sb },
            ) => a.total_cmp(b).then(sa.cmp(sb)),
            (ColumnRank::Totals { line: a, side: sa }, ColumnRank::Totals { line: b, side: sb }) => {
                a.total_cmp(b).then(sa.cmp(sb))
            }
            _ => self.group().cmp(&other.group()),
        }
    }
}
