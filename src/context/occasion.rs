use crate::models::CalendarEvent;
use serde::{Deserialize, Serialize};

/// Social context bucket for a calendar event, used to parametrize outfit
/// generation. Exactly one value is produced per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occasion {
    Business,
    Brunch,
    Dinner,
    DateNight,
    GirlsNightOut,
    SportsEvent,
    Concert,
    Errands,
    TravelDay,
    BeachDay,
    CasualDayOut,
}

impl Occasion {
    /// Human-readable label for prompts and display
    pub fn label(&self) -> &'static str {
        match self {
            Occasion::Business => "Business",
            Occasion::Brunch => "Brunch",
            Occasion::Dinner => "Dinner",
            Occasion::DateNight => "Date Night",
            Occasion::GirlsNightOut => "Girls Night Out",
            Occasion::SportsEvent => "Sports Event",
            Occasion::Concert => "Concert",
            Occasion::Errands => "Errands",
            Occasion::TravelDay => "Travel Day",
            Occasion::BeachDay => "Beach Day",
            Occasion::CasualDayOut => "Casual Day Out",
        }
    }
}

impl std::fmt::Display for Occasion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword buckets in priority order; the first bucket with any match wins.
/// The ordering is a contract: Dinner sits before DateNight so family and
/// holiday dinners are not classified as romantic.
const KEYWORD_BUCKETS: &[(Occasion, &[&str])] = &[
    (
        Occasion::Business,
        &[
            "interview",
            "meeting",
            "presentation",
            "conference",
            "work",
            "business",
        ],
    ),
    (Occasion::Brunch, &["brunch", "breakfast"]),
    (Occasion::Dinner, &["dinner", "thanksgiving", "supper"]),
    (Occasion::DateNight, &["date", "romantic", "anniversary"]),
    (
        Occasion::GirlsNightOut,
        &["girls", "ladies night", "girls night"],
    ),
    (
        Occasion::SportsEvent,
        &[
            "game",
            "match",
            "sports",
            "football",
            "basketball",
            "baseball",
            "soccer",
            "hockey",
            "stadium",
        ],
    ),
    (
        Occasion::Concert,
        &["concert", "show", "music", "festival", "performance"],
    ),
    (
        Occasion::Errands,
        &[
            "errand",
            "grocery",
            "shopping",
            "appointment",
            "pickup",
            "dentist",
            "doctor",
            "bank",
        ],
    ),
    (
        Occasion::TravelDay,
        &["travel", "flight", "airport", "trip", "vacation"],
    ),
    (Occasion::BeachDay, &["beach", "pool", "swim"]),
    (
        Occasion::CasualDayOut,
        &["casual", "hangout", "coffee", "lunch", "walk", "park"],
    ),
];

/// Classify the occasion of a calendar event.
///
/// Matching is plain case-insensitive substring containment over the
/// concatenated title, description and location, so a keyword matches even
/// inside a longer token ("Brunchville" matches Brunch). That looseness is
/// inherited behavior and callers treat the result as a UX hint, not ground
/// truth. Missing fields are treated as empty; the function is total and
/// falls back to `CasualDayOut`.
pub fn classify_occasion(event: &CalendarEvent) -> Occasion {
    let haystack = format!(
        "{} {} {}",
        event.summary.as_deref().unwrap_or(""),
        event.description.as_deref().unwrap_or(""),
        event.location.as_deref().unwrap_or(""),
    )
    .to_lowercase();

    for (occasion, keywords) in KEYWORD_BUCKETS {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *occasion;
        }
    }

    Occasion::CasualDayOut
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
    fn meeting_is_business() {
        assert_eq!(
            classify_occasion(&event("Team Meeting", "", "")),
            Occasion::Business
        );
    }

    #[test]
    fn family_dinner_beats_date_night() {
        // "Thanksgiving" lives in the Dinner bucket, which is checked before
        // DateNight by contract
        assert_eq!(
            classify_occasion(&event("Family Thanksgiving Dinner", "", "")),
            Occasion::Dinner
        );
    }

    #[test]
    fn romantic_evening_is_date_night() {
        assert_eq!(
            classify_occasion(&event("Romantic Date Night", "", "")),
            Occasion::DateNight
        );
    }

    #[test]
    fn empty_event_falls_back_to_casual() {
        assert_eq!(
            classify_occasion(&CalendarEvent::default()),
            Occasion::CasualDayOut
        );
    }

    #[test]
    fn keywords_match_in_any_field() {
        assert_eq!(
            classify_occasion(&event("", "celebrating our anniversary", "")),
            Occasion::DateNight
        );
        assert_eq!(
            classify_occasion(&event("", "", "Madison Square Garden concert hall")),
            Occasion::Concert
        );
    }

    #[test]
    fn substring_containment_is_intentional() {
        // "Brunchville" contains "brunch"; loose matching is the contract
        assert_eq!(
            classify_occasion(&event("", "", "Brunchville")),
            Occasion::Brunch
        );
    }

    #[test]
    fn earlier_bucket_wins_ties() {
        // Contains both "meeting" (Business) and "dinner" (Dinner)
        assert_eq!(
            classify_occasion(&event("Dinner meeting with the board", "", "")),
            Occasion::Business
        );
    }
}
