use crate::error::{env_error, AppResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use toml;

/// Default city used when neither the event nor the user profile yields one
pub const DEFAULT_CITY: &str = "New York";

/// Default Gemini model for outfit generation and garment classification
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Main configuration structure for the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API key for outfit generation and vision classification
    pub gemini_api_key: String,
    /// Gemini model name
    pub gemini_model: String,
    /// OpenWeatherMap API key
    pub weather_api_key: String,
    /// Supabase project URL (hosted database + auth)
    pub supabase_url: String,
    /// Supabase service API key
    pub supabase_api_key: String,
    /// Secret the hosted auth provider signs user JWTs with
    pub auth_jwt_secret: String,
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Google Calendar ID to read events from
    pub google_calendar_id: String,
    /// Path where the calendar OAuth token is cached
    pub calendar_token_path: String,
    /// Map of service names to their enabled status
    pub services: HashMap<String, bool>,
    /// Timezone for event windows
    pub timezone: String,
    /// City to fall back to when no destination can be derived
    pub default_city: String,
    /// Port for the HTTP API
    pub port: u16,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let gemini_api_key = env::var("GEMINI_API_KEY").map_err(|_| env_error("GEMINI_API_KEY"))?;
        let weather_api_key =
            env::var("WEATHER_API_KEY").map_err(|_| env_error("WEATHER_API_KEY"))?;
        let supabase_url = env::var("SUPABASE_URL").map_err(|_| env_error("SUPABASE_URL"))?;
        let supabase_api_key =
            env::var("SUPABASE_API_KEY").map_err(|_| env_error("SUPABASE_API_KEY"))?;
        let auth_jwt_secret =
            env::var("AUTH_JWT_SECRET").map_err(|_| env_error("AUTH_JWT_SECRET"))?;

        // Calendar integration is optional at startup; the keys are only
        // needed once the calendar service is enabled
        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default();
        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| String::from("primary"));

        let calendar_token_path = env::var("CALENDAR_TOKEN_PATH")
            .unwrap_or_else(|_| String::from("config/calendar_token.json"));

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| String::from(DEFAULT_GEMINI_MODEL));

        // Default timezone
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        let default_city = env::var("DEFAULT_CITY").unwrap_or_else(|_| String::from(DEFAULT_CITY));

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        // Initialize default services
        let mut services = HashMap::new();
        services.insert("calendar".to_string(), true);
        services.insert("vision".to_string(), true);
        services.insert("stylist".to_string(), true);

        // Load service configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/services.toml") {
            if let Ok(file_services) = toml::from_str::<HashMap<String, bool>>(&content) {
                // Merge with defaults
                for (key, value) in file_services {
                    services.insert(key, value);
                }
            }
        }

        Ok(Config {
            gemini_api_key,
            gemini_model,
            weather_api_key,
            supabase_url,
            supabase_api_key,
            auth_jwt_secret,
            google_client_id,
            google_client_secret,
            google_calendar_id,
            calendar_token_path,
            services,
            timezone,
            default_city,
            port,
        })
    }

    /// Check if a service is enabled
    pub fn is_service_enabled(&self, name: &str) -> bool {
        *self.services.get(name).unwrap_or(&false)
    }
}
