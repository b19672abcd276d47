use crate::config::Config;
use crate::error::{calendar_error, AppResult};
use crate::models::CalendarEvent;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// Manages the Google Calendar OAuth token, cached as JSON on disk
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Get the OAuth token, refreshing it through the token endpoint if the
    /// cached one has expired
    pub async fn get_token(&self) -> AppResult<Value> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.calendar_token_path.clone()
        };

        let token_str = fs::read_to_string(&token_path).map_err(|_| {
            calendar_error("No calendar token found. Run the calendar_setup binary first.")
        })?;

        let token: Value = serde_json::from_str(&token_str)
            .map_err(|e| calendar_error(&format!("Failed to parse token JSON: {}", e)))?;

        // Check if token is expired
        if let Some(expiry) = token.get("expires_at").and_then(|v| v.as_i64()) {
            let now = Utc::now().timestamp();
            if expiry > now {
                return Ok(token);
            }
            // Token is expired, refresh it
            return self.refresh_token(&token).await;
        }

        Err(calendar_error(
            "Cached token has no expiry. Run the calendar_setup binary again.",
        ))
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &Value) -> AppResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| calendar_error("No refresh token in token data"))?;

        let (client_id, client_secret) = {
            let config_read = self.config.read().await;
            (
                config_read.google_client_id.clone(),
                config_read.google_client_secret.clone(),
            )
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| calendar_error(&format!("Failed to parse token response: {}", e)))?;

        if new_token.get("access_token").is_none() {
            return Err(calendar_error(
                "Token response missing 'access_token' field",
            ));
        }

        // Combine new access token with existing refresh token
        let mut token_data = serde_json::Map::new();
        token_data.insert(
            "access_token".to_string(),
            new_token.get("access_token").cloned().unwrap_or(Value::Null),
        );
        token_data.insert("refresh_token".to_string(), json!(refresh_token));

        // Calculate expiry
        let expires_in = new_token
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);
        let expires_at = Utc::now().timestamp() + expires_in;
        token_data.insert("expires_at".to_string(), json!(expires_at));

        let token_json = json!(token_data);
        self.set_token(token_json.clone()).await?;

        Ok(token_json)
    }

    /// Write the token JSON to the configured cache path
    pub async fn set_token(&self, token_json: Value) -> AppResult<()> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.calendar_token_path.clone()
        };

        if let Some(parent) = Path::new(&token_path).parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&token_path, token_json.to_string())?;

        Ok(())
    }
}

/// Client for the Google Calendar REST API
#[derive(Clone)]
pub struct CalendarClient {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
}

impl CalendarClient {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            token_manager: TokenManager::new(Arc::clone(&config)),
            config,
            client: Client::new(),
        }
    }

    /// Get upcoming events from the calendar (now to 4 weeks out)
    pub async fn upcoming_events(&self) -> AppResult<Vec<CalendarEvent>> {
        let calendar_id = {
            let config_read = self.config.read().await;
            config_read.google_calendar_id.clone()
        };

        // Get authentication token
        let token = self.token_manager.get_token().await?;
        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| calendar_error("No access token available"))?;

        // Calculate time range (from now to 4 weeks in the future)
        let now = Utc::now();
        let time_min = now.to_rfc3339();
        let time_max = (now + chrono::Duration::days(28)).to_rfc3339();

        let url_str = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            calendar_id
        );

        let mut url = Url::parse(&url_str)
            .map_err(|e| calendar_error(&format!("Failed to parse URL: {}", e)))?;

        let mut query_params = HashMap::new();
        query_params.insert("timeMin", time_min);
        query_params.insert("timeMax", time_max);
        query_params.insert("singleEvents", "true".to_string());
        query_params.insert("orderBy", "startTime".to_string());

        for (key, value) in query_params {
            url.query_pairs_mut().append_pair(key, &value);
        }

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: Value = response
            .json()
            .await
            .map_err(|e| calendar_error(&format!("Failed to parse events response: {}", e)))?;

        let events = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| calendar_error("No items in response"))?;

        Ok(events.iter().map(parse_event).collect())
    }
}

/// Convert one Google Calendar API item into our event shape
fn parse_event(event: &Value) -> CalendarEvent {
    let text_field = |key: &str| {
        event
            .get(key)
            .and_then(|s| s.as_str())
            .map(|s| s.to_string())
    };

    let nested = |outer: &str, inner: &str| {
        event
            .get(outer)
            .and_then(|o| o.as_object())
            .and_then(|o| o.get(inner))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    CalendarEvent {
        id: event
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or("")
            .to_string(),
        summary: text_field("summary"),
        description: text_field("description"),
        location: text_field("location"),
        start_date_time: nested("start", "dateTime"),
        start_date: nested("start", "date"),
        end_date_time: nested("end", "dateTime"),
        end_date: nested("end", "date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timed_event() {
        let item = json!({
            "id": "evt1",
            "summary": "Team Meeting",
            "location": "HQ, Denver CO",
            "start": { "dateTime": "2026-09-01T10:00:00-06:00" },
            "end": { "dateTime": "2026-09-01T11:00:00-06:00" }
        });

        let event = parse_event(&item);
        assert_eq!(event.id, "evt1");
        assert_eq!(event.summary.as_deref(), Some("Team Meeting"));
        assert!(!event.is_all_day());
    }

    #[test]
    fn parses_all_day_event() {
        let item = json!({
            "id": "evt2",
            "summary": "Beach trip",
            "start": { "date": "2026-09-05" },
            "end": { "date": "2026-09-06" }
        });

        let event = parse_event(&item);
        assert!(event.is_all_day());
        assert_eq!(event.start_date.as_deref(), Some("2026-09-05"));
        assert!(event.location.is_none());
    }
}
