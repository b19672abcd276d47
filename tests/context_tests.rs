use outfitly::context::{classify_occasion, extract_destination, Occasion};
use outfitly::models::CalendarEvent;

/// Build an event from the three free-text fields the extractor reads
fn event(title: &str, description: &str, location: &str) -> CalendarEvent {
    CalendarEvent {
        id: "test-event".to_string(),
        summary: (!title.is_empty()).then(|| title.to_string()),
        description: (!description.is_empty()).then(|| description.to_string()),
        location: (!location.is_empty()).then(|| location.to_string()),
        ..Default::default()
    }
}

#[test]
fn team_meeting_is_business() {
    assert_eq!(
        classify_occasion(&event("Team Meeting", "", "")),
        Occasion::Business
    );
}

#[test]
fn thanksgiving_dinner_is_dinner_not_date_night() {
    // Bucket order is a contract: Dinner is checked before DateNight so
    // family and holiday dinners never read as romantic
    assert_eq!(
        classify_occasion(&event("Family Thanksgiving Dinner", "", "")),
        Occasion::Dinner
    );
}

#[test]
fn romantic_date_night_is_date_night() {
    assert_eq!(
        classify_occasion(&event("Romantic Date Night", "", "")),
        Occasion::DateNight
    );
}

#[test]
fn empty_event_defaults_to_casual_day_out() {
    assert_eq!(
        classify_occasion(&event("", "", "")),
        Occasion::CasualDayOut
    );
}

#[test]
fn classification_covers_every_bucket() {
    let cases = [
        ("Job interview downtown", Occasion::Business),
        ("Sunday brunch with the crew", Occasion::Brunch),
        ("Supper at grandma's", Occasion::Dinner),
        ("Anniversary evening", Occasion::DateNight),
        ("Ladies night!!", Occasion::GirlsNightOut),
        ("Hockey at the stadium", Occasion::SportsEvent),
        ("Jazz festival", Occasion::Concert),
        ("Dentist appointment", Occasion::Errands),
        ("Vacation departure", Occasion::TravelDay),
        ("Pool party", Occasion::BeachDay),
        ("Coffee and a walk", Occasion::CasualDayOut),
    ];

    for (title, expected) in cases {
        assert_eq!(
            classify_occasion(&event(title, "", "")),
            expected,
            "title: {title}"
        );
    }
}

#[test]
fn classification_is_idempotent() {
    let e = event("Basketball game", "with Sam", "the stadium");
    assert_eq!(classify_occasion(&e), classify_occasion(&e));
}

#[test]
fn flight_route_yields_destination_city() {
    // Only the destination code is mapped; DTW (origin) is ignored
    assert_eq!(
        extract_destination(&event("Flight DTW to LAX", "", "")).as_deref(),
        Some("Los Angeles")
    );
}

#[test]
fn address_with_state_yields_city_like_string() {
    let city = extract_destination(&event("", "", "123 Main St, Clinton Township MI"))
        .expect("address should yield a candidate");
    assert!(city.len() > 2);
    assert!(!city.contains("Township"));
    assert!(!city.contains("123"));
}

#[test]
fn bare_city_location_is_taken_verbatim() {
    assert_eq!(
        extract_destination(&event("", "", "Miami")).as_deref(),
        Some("Miami")
    );
}

#[test]
fn no_destination_signal_yields_none() {
    assert_eq!(extract_destination(&event("Lunch with Sam", "", "")), None);
}

#[test]
fn destination_extraction_is_idempotent() {
    let e = event("Flight BOS to SFO", "", "");
    assert_eq!(extract_destination(&e), extract_destination(&e));
}

#[test]
fn client_meeting_in_denver_end_to_end() {
    // The scenario the outfit flow is built around: occasion and a
    // weather-queryable city out of one event
    let e = event("Client Meeting in Denver, CO", "", "Denver, CO");

    assert_eq!(classify_occasion(&e), Occasion::Business);

    let destination = extract_destination(&e).expect("destination should resolve");
    assert!(destination.contains("Denver"));
}
