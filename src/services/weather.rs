use crate::error::{weather_error, AppResult};
use crate::models::WeatherReport;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;
use url::Url;

/// OpenWeatherMap current weather endpoint
const CURRENT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Client for the hosted weather API
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
}

impl WeatherClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
        }
    }

    /// Look up current weather for a city.
    ///
    /// The city string comes from the destination heuristic and may be
    /// garbage; an unresolvable city is an error here, but callers that
    /// only need "something to dress for" should use
    /// [`fetch_or_fallback`](Self::fetch_or_fallback).
    pub async fn fetch(&self, city: &str) -> AppResult<WeatherReport> {
        let mut url = Url::parse(CURRENT_WEATHER_URL)
            .map_err(|e| weather_error(&format!("Failed to parse URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("q", city)
            .append_pair("units", "imperial")
            .append_pair("appid", &self.api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| weather_error(&format!("Failed to fetch weather: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(weather_error(&format!(
                "Failed to fetch weather: HTTP {} - {}",
                status, error_body
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| weather_error(&format!("Failed to parse weather response: {}", e)))?;

        Self::parse_report(city, &data)
    }

    /// Look up current weather, degrading to the fixed fallback record on
    /// any failure. This is the entry point the outfit flow uses: a wrong
    /// or unresolved city must never break a suggestion.
    pub async fn fetch_or_fallback(&self, city: &str) -> WeatherReport {
        match self.fetch(city).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Weather lookup for '{}' failed, using fallback: {}", city, e);
                WeatherReport::fallback(city)
            }
        }
    }

    /// Pull the fields the prompts care about out of the provider response
    fn parse_report(city: &str, data: &Value) -> AppResult<WeatherReport> {
        let main = data
            .get("main")
            .ok_or_else(|| weather_error("No 'main' block in weather response"))?;

        let temperature_f = main
            .get("temp")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| weather_error("No temperature in weather response"))?;
        let feels_like_f = main
            .get("feels_like")
            .and_then(|v| v.as_f64())
            .unwrap_or(temperature_f);
        let humidity = main
            .get("humidity")
            .and_then(|v| v.as_u64())
            .unwrap_or(50)
            .min(100) as u8;

        let condition = data
            .get("weather")
            .and_then(|w| w.as_array())
            .and_then(|w| w.first())
            .and_then(|w| w.get("main"))
            .and_then(|c| c.as_str())
            .unwrap_or("Clear")
            .to_string();

        let wind_mph = data
            .get("wind")
            .and_then(|w| w.get("speed"))
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        // Prefer the resolved city name the provider echoes back
        let city = data
            .get("name")
            .and_then(|n| n.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(city)
            .to_string();

        Ok(WeatherReport {
            city,
            temperature_f,
            feels_like_f,
            condition,
            humidity,
            wind_mph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_provider_response() {
        let data = json!({
            "name": "Denver",
            "main": { "temp": 54.3, "feels_like": 51.0, "humidity": 38 },
            "weather": [{ "main": "Snow" }],
            "wind": { "speed": 12.5 }
        });

        let report = WeatherClient::parse_report("denver", &data).unwrap();
        assert_eq!(report.city, "Denver");
        assert_eq!(report.condition, "Snow");
        assert_eq!(report.humidity, 38);
        assert!((report.temperature_f - 54.3).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_temperature_is_an_error() {
        let data = json!({ "main": {}, "weather": [] });
        assert!(WeatherClient::parse_report("nowhere", &data).is_err());
    }

    #[test]
    fn fallback_report_is_fixed() {
        let report = WeatherReport::fallback("Atlantis");
        assert_eq!(report.city, "Atlantis");
        assert_eq!(report.condition, "Clear");
    }
}
