/// Category whose labels repeat the category name as a prefix.
const TEAM_PROPS: &str = "team props";
const TEAM_PROPS_PREFIXES: [&str; 2] = ["Team Props - ", "Team Props "];

/// Turns a market or outcome label into a team-agnostic form: literal team names
/// become `Home` / `Away`, the "Team Props" prefix is dropped for that category,
/// question marks are removed and surrounding whitespace trimmed.
pub fn normalize_label(text: Option<&str>, home: &str, away: &str, category: Option<&str>) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return String::new();
    };

    let mut cleaned = text.to_string();
    if !home.is_empty() {
        cleaned = cleaned.replace(home, "Home");
    }
    if !away.is_empty() {
        cleaned = cleaned.replace(away, "Away");
    }
    if category.is_some_and(|c| c.eq_ignore_ascii_case(TEAM_PROPS)) {
        for prefix in TEAM_PROPS_PREFIXES {
            cleaned = cleaned.replace(prefix, "");
        }
    }
    cleaned.replace('?', "").trim().to_string()
}
