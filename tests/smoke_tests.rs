use outfitly::config::Config;
use outfitly::context::Occasion;
use outfitly::db::{InMemoryDb, WardrobeDb};
use outfitly::models::{
    CalendarEvent, ClosetItem, GarmentAttributes, Outfit, OutfitSuggestion, PackingEntry,
    PackingList, StylePreferences, WeatherReport,
};
use std::collections::HashMap;

fn test_config() -> Config {
    Config {
        gemini_api_key: String::new(),
        gemini_model: "gemini-2.0-flash".to_string(),
        weather_api_key: String::new(),
        supabase_url: "http://localhost:54321".to_string(),
        supabase_api_key: String::new(),
        auth_jwt_secret: "test_secret".to_string(),
        google_client_id: String::new(),
        google_client_secret: String::new(),
        google_calendar_id: "primary".to_string(),
        calendar_token_path: "config/calendar_token.json".to_string(),
        services: HashMap::new(),
        timezone: "UTC".to_string(),
        default_city: "New York".to_string(),
        port: 3000,
    }
}

fn garment(name: &str) -> GarmentAttributes {
    GarmentAttributes {
        name: name.to_string(),
        category: "top".to_string(),
        color: "navy".to_string(),
        season: "all".to_string(),
        fit: "regular".to_string(),
        material: "cotton".to_string(),
    }
}

/// Smoke test to verify the config shape
#[tokio::test]
async fn test_config_shape() {
    let config = test_config();
    assert_eq!(config.default_city, "New York");
    assert!(!config.is_service_enabled("calendar"));
    assert!(config.gemini_api_key.is_empty());
}

/// Closet CRUD is scoped per user
#[tokio::test]
async fn test_closet_crud() {
    let db = InMemoryDb::default();

    let item = ClosetItem::new("alice", garment("Navy blazer"), None);
    let other = ClosetItem::new("bob", garment("White tee"), None);
    db.add_closet_item(&item).await.unwrap();
    db.add_closet_item(&other).await.unwrap();

    let alices = db.list_closet_items("alice").await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].attributes.name, "Navy blazer");

    // Deleting with the wrong user id is a no-op
    db.delete_closet_item("bob", item.id).await.unwrap();
    assert_eq!(db.list_closet_items("alice").await.unwrap().len(), 1);

    db.delete_closet_item("alice", item.id).await.unwrap();
    assert!(db.list_closet_items("alice").await.unwrap().is_empty());
    assert_eq!(db.list_closet_items("bob").await.unwrap().len(), 1);
}

/// Outfits and packing lists round-trip through the store
#[tokio::test]
async fn test_outfit_and_packing_persistence() {
    let db = InMemoryDb::default();

    let suggestion = OutfitSuggestion {
        items: vec!["Navy blazer".to_string(), "Chinos".to_string()],
        rationale: "Polished but comfortable".to_string(),
        styling_tips: vec!["Add a watch".to_string()],
    };
    let outfit = Outfit::new("alice", Occasion::Business, Some("Denver".to_string()), suggestion);
    db.save_outfit(&outfit).await.unwrap();

    let outfits = db.list_outfits("alice").await.unwrap();
    assert_eq!(outfits.len(), 1);
    assert_eq!(outfits[0].occasion, Occasion::Business);
    assert_eq!(outfits[0].city.as_deref(), Some("Denver"));

    let list = PackingList::new(
        "alice",
        "Seattle",
        4,
        vec![PackingEntry {
            item: "Rain jacket".to_string(),
            quantity: 1,
            reason: Some("Showers likely".to_string()),
        }],
    );
    db.save_packing_list(&list).await.unwrap();

    let lists = db.list_packing_lists("alice").await.unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].destination, "Seattle");
    assert!(db.list_packing_lists("bob").await.unwrap().is_empty());
}

/// Style preferences default to empty and persist per user
#[tokio::test]
async fn test_style_preferences() {
    let db = InMemoryDb::default();

    assert!(db.get_style_preferences("alice").await.unwrap().is_none());

    let preferences = StylePreferences {
        style: Some("minimalist".to_string()),
        favorite_colors: vec!["black".to_string()],
        avoid: vec!["neon".to_string()],
    };
    db.set_style_preferences("alice", &preferences).await.unwrap();

    let stored = db
        .get_style_preferences("alice")
        .await
        .unwrap()
        .expect("preferences were saved");
    assert_eq!(stored.style.as_deref(), Some("minimalist"));
    assert!(db.get_style_preferences("bob").await.unwrap().is_none());
}

/// All-day detection on the calendar event model
#[tokio::test]
async fn test_calendar_event_all_day() {
    let timed = CalendarEvent {
        id: "e1".to_string(),
        summary: Some("Team Meeting".to_string()),
        start_date_time: Some("2026-09-01T10:00:00Z".to_string()),
        ..Default::default()
    };
    assert!(!timed.is_all_day());

    let all_day = CalendarEvent {
        id: "e2".to_string(),
        summary: Some("Beach trip".to_string()),
        start_date: Some("2026-09-05".to_string()),
        ..Default::default()
    };
    assert!(all_day.is_all_day());
}

/// Closet items round-trip through JSON, timestamps included
#[tokio::test]
async fn test_closet_item_serializes() {
    let item = ClosetItem::new("alice", garment("Navy blazer"), None);
    let json = serde_json::to_string(&item).unwrap();
    let parsed: ClosetItem = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.id, item.id);
    assert_eq!(parsed.created_at, item.created_at);
    assert_eq!(parsed.attributes.name, "Navy blazer");
}

/// The fallback weather record is fixed and serializable
#[tokio::test]
async fn test_weather_fallback_serializes() {
    let report = WeatherReport::fallback("Nowhere");
    let json = serde_json::to_string(&report).unwrap();
    let parsed: WeatherReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.city, "Nowhere");
    assert_eq!(parsed.condition, "Clear");
}
