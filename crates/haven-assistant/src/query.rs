//! Natural-language query extraction.
//!
//! Pulls structured search criteria out of free-text chat messages with
//! word lists and a handful of regexes. Queries the extractor cannot read
//! anything from fall back to plain keyword search against the listing
//! text fields.

use haven_common::models::property::PropertyType;
use regex::Regex;
use std::sync::LazyLock;

/// Cities the extractor recognises. Matching is word-exact and
/// case-insensitive; multi-word names are checked as substrings.
const KNOWN_CITIES: &[&str] = &[
    "berlin",
    "munich",
    "münchen",
    "hamburg",
    "frankfurt",
    "cologne",
    "köln",
    "stuttgart",
    "düsseldorf",
    "dortmund",
    "essen",
    "leipzig",
    "bremen",
    "dresden",
    "hannover",
    "nuremberg",
    "nürnberg",
    "meiningen",
];

/// Synonyms per listing type.
const TYPE_SYNONYMS: &[(PropertyType, &[&str])] = &[
    (PropertyType::Apartment, &["apartment", "flat", "wohnung", "studio", "penthouse"]),
    (PropertyType::House, &["house", "haus"]),
    (PropertyType::Villa, &["villa"]),
    (PropertyType::Land, &["land", "plot", "grundstück"]),
    (PropertyType::Commercial, &["commercial", "office", "büro"]),
];

/// Criteria extracted from a chat message.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PropertyQuery {
    pub cities: Vec<String>,
    pub property_type: Option<PropertyType>,
    pub rooms: Option<i32>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl PropertyQuery {
    /// True when nothing could be extracted and the caller should fall back
    /// to keyword search.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
            && self.property_type.is_none()
            && self.rooms.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

/// Extract search criteria from a free-text message.
pub fn parse_query(message: &str) -> PropertyQuery {
    let lower = message.to_lowercase();
    let (min_price, max_price) = extract_price_range(&lower);
    PropertyQuery {
        cities: extract_cities(&lower),
        property_type: extract_property_type(&lower),
        rooms: extract_room_count(&lower),
        min_price,
        max_price,
    }
}

static WORD_CLEANER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

fn extract_cities(query: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    // Exact word matches first, so "berlinerstr." does not count as Berlin.
    for word in query.split_whitespace() {
        let clean = WORD_CLEANER.replace_all(word, "");
        if KNOWN_CITIES.contains(&clean.as_ref()) && !found.iter().any(|c| c == clean.as_ref()) {
            found.push(clean.into_owned());
        }
    }

    // Multi-word names are checked as substrings.
    for city in KNOWN_CITIES {
        if city.contains(' ') && query.contains(city) && !found.iter().any(|c| c == city) {
            found.push((*city).to_string());
        }
    }

    found
}

fn extract_property_type(query: &str) -> Option<PropertyType> {
    for word in query.split_whitespace() {
        let clean = WORD_CLEANER.replace_all(word, "");
        for (property_type, synonyms) in TYPE_SYNONYMS {
            if synonyms.contains(&clean.as_ref()) {
                return Some(*property_type);
            }
        }
    }
    None
}

static ROOM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:bed(?:room)?s?|rooms?|zimmer)").unwrap());

fn extract_room_count(query: &str) -> Option<i32> {
    ROOM_RE
        .captures(query)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

static UNDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:under|less than|below)\s*(\d[\d.,]*)").unwrap());
static OVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:over|more than|above)\s*(\d[\d.,]*)").unwrap());
static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d.,]*)\s*(?:[-–—]|to)\s*(\d[\d.,]*)").unwrap());

/// Prices in queries are written with thousands separators ("500,000",
/// "500.000"); separators are stripped before parsing.
fn parse_amount(s: &str) -> Option<i64> {
    s.replace([',', '.'], "").parse().ok()
}

fn extract_price_range(query: &str) -> (Option<i64>, Option<i64>) {
    let mut min = None;
    let mut max = None;

    if let Some(caps) = UNDER_RE.captures(query) {
        max = parse_amount(&caps[1]);
    }
    if let Some(caps) = OVER_RE.captures(query) {
        min = parse_amount(&caps[1]);
    }
    if min.is_none() && max.is_none() {
        if let Some(caps) = RANGE_RE.captures(query) {
            min = parse_amount(&caps[1]);
            max = parse_amount(&caps[2]);
        }
    }

    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_city_and_type() {
        let q = parse_query("I'm looking for an apartment in Berlin");
        assert_eq!(q.cities, vec!["berlin"]);
        assert_eq!(q.property_type, Some(PropertyType::Apartment));
        assert!(q.rooms.is_none());
    }

    #[test]
    fn extracts_multiple_cities() {
        let q = parse_query("anything in Hamburg or Munich?");
        assert!(q.cities.contains(&"hamburg".to_string()));
        assert!(q.cities.contains(&"munich".to_string()));
    }

    #[test]
    fn city_match_is_word_exact() {
        // "berlinerstr" must not match Berlin
        let q = parse_query("office on berlinerstr 12");
        assert!(q.cities.is_empty());
        assert_eq!(q.property_type, Some(PropertyType::Commercial));
    }

    #[test]
    fn punctuation_does_not_break_city_match() {
        let q = parse_query("What do you have in Dresden?");
        assert_eq!(q.cities, vec!["dresden"]);
    }

    #[test]
    fn extracts_room_count_variants() {
        assert_eq!(parse_query("3 bedroom house").rooms, Some(3));
        assert_eq!(parse_query("a place with 2 rooms").rooms, Some(2));
        assert_eq!(parse_query("4 zimmer wohnung").rooms, Some(4));
        assert_eq!(parse_query("house with garden").rooms, None);
    }

    #[test]
    fn extracts_price_upper_bound() {
        let q = parse_query("villa under 500,000 please");
        assert_eq!(q.max_price, Some(500_000));
        assert!(q.min_price.is_none());
        assert_eq!(q.property_type, Some(PropertyType::Villa));
    }

    #[test]
    fn extracts_price_lower_bound() {
        let q = parse_query("something over 250000");
        assert_eq!(q.min_price, Some(250_000));
        assert!(q.max_price.is_none());
    }

    #[test]
    fn extracts_price_range() {
        let q = parse_query("budget 200,000 to 350,000");
        assert_eq!(q.min_price, Some(200_000));
        assert_eq!(q.max_price, Some(350_000));

        let q = parse_query("300000-400000 in Leipzig");
        assert_eq!(q.min_price, Some(300_000));
        assert_eq!(q.max_price, Some(400_000));
        assert_eq!(q.cities, vec!["leipzig"]);
    }

    #[test]
    fn german_thousands_separator_parses() {
        let q = parse_query("haus under 500.000");
        assert_eq!(q.max_price, Some(500_000));
        assert_eq!(q.property_type, Some(PropertyType::House));
    }

    #[test]
    fn unparseable_query_is_empty() {
        let q = parse_query("tell me about the neighbourhood");
        assert!(q.is_empty());
    }
}
