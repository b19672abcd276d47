use crate::context::Occasion;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simplified calendar event representation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

impl CalendarEvent {
    /// All-day events carry a date-only start instead of a dateTime
    pub fn is_all_day(&self) -> bool {
        self.start_date.is_some() && self.start_date_time.is_none()
    }

    /// Event start in the given timezone, when the start field parses.
    /// All-day events count from midnight local time.
    pub fn start_in(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        if let Some(date_time) = &self.start_date_time {
            if let Ok(dt) = DateTime::parse_from_rfc3339(date_time) {
                return Some(dt.with_timezone(tz));
            }
        } else if let Some(date) = &self.start_date {
            if let Ok(date) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                return date
                    .and_hms_opt(0, 0, 0)
                    .and_then(|dt| tz.from_local_datetime(&dt).single());
            }
        }
        None
    }
}

/// Current weather for a city, in the units the prompts use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub condition: String,
    pub humidity: u8,
    pub wind_mph: f64,
}

impl WeatherReport {
    /// Fixed record used whenever the lookup fails or the city cannot be
    /// resolved; outfit generation still needs something to work with
    pub fn fallback(city: &str) -> Self {
        Self {
            city: city.to_string(),
            temperature_f: 70.0,
            feels_like_f: 70.0,
            condition: "Clear".to_string(),
            humidity: 50,
            wind_mph: 5.0,
        }
    }
}

/// Structured attributes the vision model extracts from a garment photo
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GarmentAttributes {
    pub name: String,
    pub category: String,
    pub color: String,
    pub season: String,
    pub fit: String,
    pub material: String,
}

/// A single item in a user's closet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosetItem {
    pub id: Uuid,
    pub user_id: String,
    #[serde(flatten)]
    pub attributes: GarmentAttributes,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClosetItem {
    /// Create a new closet item for a user
    pub fn new(user_id: &str, attributes: GarmentAttributes, image_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            attributes,
            image_url,
            created_at: Utc::now(),
        }
    }
}

/// Style preferences stored per user and fed into the outfit prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StylePreferences {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub favorite_colors: Vec<String>,
    #[serde(default)]
    pub avoid: Vec<String>,
}

/// What the language model returns for an outfit request
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OutfitSuggestion {
    /// Garment names making up the outfit
    pub items: Vec<String>,
    /// Why these pieces work for the occasion and weather
    pub rationale: String,
    /// Short styling tips
    pub styling_tips: Vec<String>,
}

/// A persisted outfit suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outfit {
    pub id: Uuid,
    pub user_id: String,
    pub occasion: Occasion,
    pub city: Option<String>,
    pub suggestion: OutfitSuggestion,
    pub created_at: DateTime<Utc>,
}

impl Outfit {
    pub fn new(
        user_id: &str,
        occasion: Occasion,
        city: Option<String>,
        suggestion: OutfitSuggestion,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            occasion,
            city,
            suggestion,
            created_at: Utc::now(),
        }
    }
}

/// One line of a packing list
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PackingEntry {
    pub item: String,
    pub quantity: u32,
    pub reason: Option<String>,
}

/// A persisted packing list for a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingList {
    pub id: Uuid,
    pub user_id: String,
    pub destination: String,
    pub days: u32,
    pub entries: Vec<PackingEntry>,
    pub created_at: DateTime<Utc>,
}

impl PackingList {
    pub fn new(user_id: &str, destination: &str, days: u32, entries: Vec<PackingEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            destination: destination.to_string(),
            days,
            entries,
            created_at: Utc::now(),
        }
    }
}

/// A saved inspiration image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspoImage {
    pub id: Uuid,
    pub user_id: String,
    pub image_url: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A calendar event annotated with the signals the extractor derived from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContext {
    pub event: CalendarEvent,
    pub occasion: Occasion,
    pub destination: Option<String>,
}
