use serde_json::Value;

use super::rows::{lines_of, scalar_text};

/// One `[category] name -> outcome: price, ...` line for each of the first
/// `limit` special markets in a payload.
pub fn summarize_specials(payload: &Value, limit: usize) -> Vec<String> {
    let Some(specials) = payload.get("specials").and_then(|s| s.as_array()) else {
        return Vec::new();
    };

    specials
        .iter()
        .take(limit)
        .map(|special| {
            let prices = lines_of(special)
                .into_iter()
                .map(|line| format!("{}: {}", text(line, "name"), text(line, "price")))
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{}] {} -> {prices}", text(special, "category"), text(special, "name"))
        })
        .collect()
}

fn text(v: &Value, key: &str) -> String {
    v.get(key).and_then(scalar_text).unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_lines_are_capped() {
        let payload = json!({ "specials": [
            { "category": "Goals", "name": "Both teams to score", "lines": {
                "1": { "name": "Yes", "price": 1.8 },
                "2": { "name": "No", "price": 2.0 }
            } },
            { "name": "Winner", "lines": {} },
            { "name": "Ignored", "lines": {} }
        ] });

        let lines = summarize_specials(&payload, 2);
        assert_eq!(
            lines,
            ["[Goals] Both teams to score -> Yes: 1.8, No: 2.0", "[?] Winner -> "]
        );
    }
}
