use crate::models::CalendarEvent;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Locations shorter than this with no comma or zip code are taken verbatim
/// as a city name
const SHORT_LOCATION_LIMIT: usize = 30;

lazy_static! {
    /// Major North American airport codes mapped to the city a weather
    /// lookup understands
    static ref AIRPORT_CITIES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("ATL", "Atlanta");
        m.insert("AUS", "Austin");
        m.insert("BNA", "Nashville");
        m.insert("BOS", "Boston");
        m.insert("BWI", "Baltimore");
        m.insert("CLT", "Charlotte");
        m.insert("DCA", "Washington");
        m.insert("DEN", "Denver");
        m.insert("DFW", "Dallas");
        m.insert("DTW", "Detroit");
        m.insert("EWR", "Newark");
        m.insert("FLL", "Fort Lauderdale");
        m.insert("IAD", "Washington");
        m.insert("IAH", "Houston");
        m.insert("JFK", "New York");
        m.insert("LAS", "Las Vegas");
        m.insert("LAX", "Los Angeles");
        m.insert("LGA", "New York");
        m.insert("MCO", "Orlando");
        m.insert("MDW", "Chicago");
        m.insert("MIA", "Miami");
        m.insert("MSP", "Minneapolis");
        m.insert("MSY", "New Orleans");
        m.insert("ORD", "Chicago");
        m.insert("PDX", "Portland");
        m.insert("PHL", "Philadelphia");
        m.insert("PHX", "Phoenix");
        m.insert("RDU", "Raleigh");
        m.insert("SAN", "San Diego");
        m.insert("SEA", "Seattle");
        m.insert("SFO", "San Francisco");
        m.insert("SLC", "Salt Lake City");
        m.insert("STL", "St. Louis");
        m.insert("TPA", "Tampa");
        m.insert("YVR", "Vancouver");
        m.insert("YYZ", "Toronto");
        m
    };

    /// Route pattern like "DTW TO LAX", "DTW-LAX" or "DTW – LAX", matched
    /// against the uppercased event text
    static ref FLIGHT_ROUTE_RE: Regex =
        Regex::new(r"\b([A-Z]{3})(?:\s+TO\s+|\s*[-\u{2013}\u{2014}]\s*)([A-Z]{3})\b")
            .expect("flight route regex is valid");

    /// For each state abbreviation, captures the text preceding it in an
    /// address-like string ("123 Main St, Clinton Township MI"). Matching is
    /// case-sensitive: lowercase words like "in" or "or" are ordinary prose,
    /// not state codes.
    static ref STATE_PATTERNS: Vec<(&'static str, Regex)> = US_STATES
        .iter()
        .map(|state| {
            let re = Regex::new(&format!(r"([A-Za-z0-9 .,'\-]+?),?\s+{}\b", state))
                .expect("state regex is valid");
            (*state, re)
        })
        .collect();

    /// Trailing tokens stripped from an address capture before deciding
    /// whether it contains a usable city name
    static ref TRAILING_NOISE_RE: Regex = Regex::new(
        r"(?i)[\s,]*(?:Township|Twp|County|Dr|Drive|St|Street|Ave|Avenue|Rd|Road|Blvd|Boulevard|Ln|Lane|Ct|Court|Way|Pl|Place|\d+)\.?\s*$",
    )
    .expect("trailing noise regex is valid");

    /// Five consecutive digits, treated as a zip code
    static ref ZIP_RE: Regex = Regex::new(r"\d{5}").expect("zip regex is valid");
}

/// US state abbreviations, evaluated in this fixed order; the first state
/// whose pattern matches the location wins
const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

/// Tokens skipped during the backward city-name scan
const NOISE_TOKENS: &[&str] = &[
    "township",
    "twp",
    "county",
    "dr",
    "drive",
    "st",
    "street",
    "ave",
    "avenue",
    "rd",
    "road",
    "blvd",
    "boulevard",
    "ln",
    "lane",
    "ct",
    "court",
    "way",
    "pl",
    "place",
];

/// Extract a best-effort destination city from a calendar event.
///
/// This is not a geocoder. The result feeds a weather lookup that tolerates
/// an unresolvable city, so precision is "usually good enough": a flight
/// route's destination code wins, then a US-address heuristic over the
/// location field, then the trimmed location itself when it is short enough
/// to plausibly be a bare city name. Returns `None` on any non-match and
/// never fails.
pub fn extract_destination(event: &CalendarEvent) -> Option<String> {
    let combined = format!(
        "{} {} {}",
        event.summary.as_deref().unwrap_or(""),
        event.description.as_deref().unwrap_or(""),
        event.location.as_deref().unwrap_or(""),
    );

    // Step 1: flight route pattern; only the destination code is mapped,
    // the origin is ignored. An unknown destination code falls through.
    let upper = combined.to_uppercase();
    if let Some(caps) = FLIGHT_ROUTE_RE.captures(&upper) {
        let destination_code = &caps[2];
        if let Some(city) = AIRPORT_CITIES.get(destination_code) {
            return Some((*city).to_string());
        }
    }

    // Step 2: US address heuristic over the location field only
    let location = event.location.as_deref().unwrap_or("").trim();
    if location.is_empty() {
        return None;
    }

    for (_state, pattern) in STATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(location) {
            let captured = caps[1].trim().to_string();
            if let Some(city) = city_from_address_fragment(&captured) {
                return Some(city);
            }
            // First matching state decides; a dead-end capture falls
            // through to the short-location fallback
            break;
        }
    }

    // Fallback: a short location with no comma and no zip code is taken
    // to already be a city name
    if location.len() < SHORT_LOCATION_LIMIT
        && !location.contains(',')
        && !ZIP_RE.is_match(location)
    {
        return Some(location.to_string());
    }

    None
}

/// Pull a city-like name out of the text captured before a state code.
///
/// Strips trailing noise tokens, then walks the original capture backward
/// word by word, skipping numbers and street suffixes and accumulating up
/// to two words. Stopping at two words truncates the rare three-word city
/// name; that matches the behavior this was ported from and is accepted.
fn city_from_address_fragment(captured: &str) -> Option<String> {
    // Strip trailing noise until the text stops changing
    let mut stripped = captured.to_string();
    loop {
        let next = TRAILING_NOISE_RE.replace(&stripped, "").to_string();
        if next == stripped {
            break;
        }
        stripped = next;
    }
    let stripped = stripped.trim().trim_end_matches(',').trim();

    if stripped.len() <= 2 || stripped.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    // Backward scan over the original capture
    let mut words: Vec<&str> = Vec::new();
    for token in captured
        .split([' ', ','])
        .filter(|t| !t.is_empty())
        .rev()
    {
        let cleaned = token.trim_matches('.');
        if cleaned.is_empty() || cleaned.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if NOISE_TOKENS.contains(&cleaned.to_lowercase().as_str()) {
            continue;
        }
        words.insert(0, cleaned);
        if words.len() >= 2 {
            break;
        }
    }

    let candidate = words.join(" ");
    (candidate.len() > 2).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: &str, description: &str, location: &str) -> CalendarEvent {
        CalendarEvent {
            summary: (!summary.is_empty()).then(|| summary.to_string()),
            description: (!description.is_empty()).then(|| description.to_string()),
            location: (!location.is_empty()).then(|| location.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn flight_route_maps_destination_code() {
        let found = extract_destination(&event("Flight DTW to LAX", "", ""));
        assert_eq!(found.as_deref(), Some("Los Angeles"));
    }

    #[test]
    fn flight_route_with_dash_separator() {
        let found = extract_destination(&event("BOS-SEA boarding 9am", "", ""));
        assert_eq!(found.as_deref(), Some("Seattle"));
    }

    #[test]
    fn flight_route_with_en_dash() {
        let found = extract_destination(&event("JFK \u{2013} DEN", "", ""));
        assert_eq!(found.as_deref(), Some("Denver"));
    }

    #[test]
    fn unknown_destination_code_falls_through() {
        // XYZ is not in the airport table; with no location there is
        // nothing left to try
        assert_eq!(extract_destination(&event("Flight DTW to XYZ", "", "")), None);
    }

    #[test]
    fn address_with_state_yields_city_like_string() {
        let found = extract_destination(&event("", "", "123 Main St, Clinton Township MI"));
        let city = found.expect("address should yield a city candidate");
        assert!(city.len() > 2);
        assert!(!city.contains("Township"));
        assert!(!city.contains("123"));
        assert!(city.contains("Clinton"));
    }

    #[test]
    fn plain_address_yields_city() {
        let found = extract_destination(&event("", "", "Denver, CO"));
        assert_eq!(found.as_deref(), Some("Denver"));
    }

    #[test]
    fn lowercase_prose_words_are_not_state_codes() {
        // "in" must not read as Indiana; the short-location fallback
        // applies instead
        assert_eq!(
            extract_destination(&event("", "", "lunch in paris")).as_deref(),
            Some("lunch in paris")
        );
    }

    #[test]
    fn short_location_is_taken_verbatim() {
        let found = extract_destination(&event("", "", "Miami"));
        assert_eq!(found.as_deref(), Some("Miami"));
    }

    #[test]
    fn long_location_with_zip_is_rejected() {
        // No state match, too structured for the verbatim fallback
        assert_eq!(
            extract_destination(&event("", "", "Building 4, Suite 210, 90210 industrial campus")),
            None
        );
    }

    #[test]
    fn no_signal_yields_none() {
        assert_eq!(extract_destination(&event("Lunch with Sam", "", "")), None);
    }

    #[test]
    fn extraction_is_idempotent() {
        let e = event("Flight ORD to MIA", "", "");
        assert_eq!(extract_destination(&e), extract_destination(&e));
    }
}
