use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static TRAILING_YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([0-9]{4}\)\s*$").expect("trailing year regex should compile"));
static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([0-9]{4})\)").expect("year regex should compile"));

/// A display title split into the text sent to the metadata search and the
/// release year embedded in it, if any.
///
/// The backend stores titles the MovieLens way, `"Toy Story (1995)"`. The year
/// is extracted from the first parenthesized four-digit group anywhere in the
/// title, while only a trailing group is stripped from the search text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedTitle {
    pub search_title: String,
    pub year: Option<String>,
}

impl NormalizedTitle {
    pub fn parse(raw: &str) -> Self {
        let search_title = TRAILING_YEAR_PATTERN.replace(raw, "").trim().to_string();
        let year = YEAR_PATTERN
            .captures(raw)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string());

        Self { search_title, year }
    }
}

/// Splits a raw display title into search text and year
pub fn normalize(raw: &str) -> NormalizedTitle {
    NormalizedTitle::parse(raw)
}
