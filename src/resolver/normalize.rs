//! Deterministic name normalization shared by both sides of a comparison.

/// Abbreviation expansions applied token by token after lowercasing.
const EXPANSIONS: &[(&str, &str)] = &[
    ("st", "state"),
    ("univ", "university"),
    ("u", "university"),
    ("n", "north"),
    ("s", "south"),
    ("so", "southern"),
    ("e", "east"),
    ("w", "west"),
    ("c", "central"),
    ("cent", "central"),
    ("mich", "michigan"),
    ("ill", "illinois"),
    ("tenn", "tennessee"),
    ("miss", "mississippi"),
    ("ga", "georgia"),
    ("fla", "florida"),
    ("intl", "international"),
    ("mt", "mount"),
    ("no", "northern"),
    ("ark", "arkansas"),
    ("ky", "kentucky"),
    ("la", "louisiana"),
    ("wash", "washington"),
];

/// Lowercases, strips punctuation, collapses whitespace and expands common
/// abbreviations.
///
/// # Examples
///
/// ```
/// use sports_ratings::resolver::normalize_name;
///
/// assert_eq!(normalize_name("Michigan St."), "michigan state");
/// assert_eq!(normalize_name("  N.  Carolina  "), "north carolina");
/// assert_eq!(normalize_name("Texas A&M"), "texas a m");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c == '.' || c == '\'' {
                // Dots and apostrophes join: "St." -> "st", "Hawai'i" -> "hawaii"
                '\0'
            } else {
                ' '
            }
        })
        .filter(|c| *c != '\0')
        .collect();

    cleaned
        .split_whitespace()
        .map(expand_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_token(token: &str) -> &str {
    EXPANSIONS
        .iter()
        .find(|(short, _)| *short == token)
        .map(|(_, long)| *long)
        .unwrap_or(token)
}
