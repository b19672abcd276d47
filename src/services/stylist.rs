use crate::context::Occasion;
use crate::error::{ai_error, AppResult, Error};
use crate::models::{
    ClosetItem, OutfitSuggestion, PackingEntry, StylePreferences, WeatherReport,
};
use rig::completion::{Chat, Message};
use rig::providers::gemini::Client as GeminiClient;
use serde::de::DeserializeOwned;
use serde_json::from_str;
use tracing::{error, info};

const SYSTEM_PROMPT: &str = "You are a personal stylist. You receive an occasion, a weather report, the user's style preferences and optionally their closet contents, and you respond with outfit or packing recommendations as JSON only, matching the exact shape requested.";

const OUTFIT_PROMPT_TEMPLATE: &str = "Suggest one complete outfit.

Occasion: {occasion}
Weather in {city}: {temperature}°F (feels like {feels_like}°F), {condition}, humidity {humidity}%, wind {wind} mph.
Style preferences: {preferences}
{closet_section}

Respond with a single JSON object in exactly this shape and nothing else:
{
  \"items\": [\"garment name\", ...],
  \"rationale\": \"why this works for the occasion and weather\",
  \"styling_tips\": [\"short tip\", ...]
}

If a closet list was provided, prefer items from it. The response must start with `{` and end with `}`.";

const PACKING_PROMPT_TEMPLATE: &str = "Build a packing list for a trip.

Destination: {destination}
Trip length: {days} days
Weather at destination: {temperature}°F, {condition}.
Style preferences: {preferences}

Respond with a JSON array in exactly this shape and nothing else:
[
  { \"item\": \"name\", \"quantity\": 1, \"reason\": \"optional short reason\" }
]

The response must start with `[` and end with `]`.";

/// Language-model-backed outfit and packing recommendations
#[derive(Clone)]
pub struct Stylist {
    api_key: String,
    model: String,
}

impl Stylist {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Ask the model for an outfit matching the occasion, weather and
    /// preferences; closet items are offered to the prompt when present
    pub async fn suggest_outfit(
        &self,
        occasion: Occasion,
        weather: &WeatherReport,
        preferences: &StylePreferences,
        closet: &[ClosetItem],
    ) -> AppResult<OutfitSuggestion> {
        info!(
            "Requesting outfit suggestion: occasion={}, city={}",
            occasion, weather.city
        );

        let closet_section = if closet.is_empty() {
            String::new()
        } else {
            let items = closet
                .iter()
                .map(|item| {
                    format!(
                        "- {} ({}, {}, {})",
                        item.attributes.name,
                        item.attributes.category,
                        item.attributes.color,
                        item.attributes.material
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("Closet contents:\n{}", items)
        };

        let user_prompt = OUTFIT_PROMPT_TEMPLATE
            .replace("{occasion}", occasion.label())
            .replace("{city}", &weather.city)
            .replace("{temperature}", &format!("{:.0}", weather.temperature_f))
            .replace("{feels_like}", &format!("{:.0}", weather.feels_like_f))
            .replace("{condition}", &weather.condition)
            .replace("{humidity}", &weather.humidity.to_string())
            .replace("{wind}", &format!("{:.0}", weather.wind_mph))
            .replace("{preferences}", &format_preferences(preferences))
            .replace("{closet_section}", &closet_section);

        let response = self.chat(&user_prompt).await?;
        parse_json_from_response::<OutfitSuggestion>(&response)
    }

    /// Ask the model for a packing list for a trip
    pub async fn packing_list(
        &self,
        destination: &str,
        days: u32,
        weather: &WeatherReport,
        preferences: &StylePreferences,
    ) -> AppResult<Vec<PackingEntry>> {
        info!(
            "Requesting packing list: destination={}, days={}",
            destination, days
        );

        let user_prompt = PACKING_PROMPT_TEMPLATE
            .replace("{destination}", destination)
            .replace("{days}", &days.to_string())
            .replace("{temperature}", &format!("{:.0}", weather.temperature_f))
            .replace("{condition}", &weather.condition)
            .replace("{preferences}", &format_preferences(preferences));

        let response = self.chat(&user_prompt).await?;
        parse_json_from_response::<Vec<PackingEntry>>(&response)
    }

    /// Run one chat turn against the Gemini model
    async fn chat(&self, user_prompt: &str) -> AppResult<String> {
        let gemini_client = GeminiClient::new(&self.api_key);

        let agent = gemini_client
            .agent(&self.model)
            .preamble(SYSTEM_PROMPT)
            .temperature(0.4)
            .build();

        let response = agent
            .chat(user_prompt.to_string(), Vec::<Message>::new())
            .await
            .map_err(|e| ai_error(&format!("Stylist request failed: {}", e)))?;

        info!("Received stylist response from Gemini");
        Ok(response)
    }
}

/// Render style preferences into a prompt line
fn format_preferences(preferences: &StylePreferences) -> String {
    let mut parts = Vec::new();
    if let Some(style) = &preferences.style {
        parts.push(format!("style: {}", style));
    }
    if !preferences.favorite_colors.is_empty() {
        parts.push(format!(
            "favorite colors: {}",
            preferences.favorite_colors.join(", ")
        ));
    }
    if !preferences.avoid.is_empty() {
        parts.push(format!("avoid: {}", preferences.avoid.join(", ")));
    }
    if parts.is_empty() {
        "none stated".to_string()
    } else {
        parts.join("; ")
    }
}

/// Attempt to parse typed JSON out of a model response.
///
/// Tries the whole response first, then the first `{..}` span, then the
/// first `[..]` span. Models wrap JSON in prose and code fences often
/// enough that going straight to serde is not an option.
pub fn parse_json_from_response<T: DeserializeOwned>(response: &str) -> AppResult<T> {
    match from_str::<T>(response) {
        Ok(value) => return Ok(value),
        Err(e) => {
            error!("Failed to parse entire response as JSON: {}", e);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (response.find(open), response.rfind(close)) {
            if start < end {
                let json_str = &response[start..=end];
                match from_str::<T>(json_str) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        error!("Failed to parse JSON from response: {}", e);
                        error!("JSON string: {}", json_str);
                    }
                }
            }
        }
    }

    error!("Could not extract valid JSON from response: {}", response);
    Err(Error::AiService(
        "Could not extract valid JSON from the model response".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json_object() {
        let response = r#"{"items":["blazer","chinos"],"rationale":"sharp but relaxed","styling_tips":["roll the sleeves"]}"#;
        let suggestion: OutfitSuggestion = parse_json_from_response(response).unwrap();
        assert_eq!(suggestion.items.len(), 2);
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let response = "Here is your outfit:\n```json\n{\"items\":[\"sundress\"],\"rationale\":\"hot day\",\"styling_tips\":[]}\n```\nEnjoy!";
        let suggestion: OutfitSuggestion = parse_json_from_response(response).unwrap();
        assert_eq!(suggestion.items, vec!["sundress"]);
    }

    #[test]
    fn parses_packing_array() {
        let response = r#"[{"item":"rain jacket","quantity":1,"reason":"showers expected"},{"item":"t-shirt","quantity":3,"reason":null}]"#;
        let entries: Vec<PackingEntry> = parse_json_from_response(response).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item, "rain jacket");
    }

    #[test]
    fn garbage_response_is_an_error() {
        assert!(parse_json_from_response::<OutfitSuggestion>("I cannot help with that").is_err());
    }

    #[test]
    fn preferences_render_compactly() {
        let prefs = StylePreferences {
            style: Some("minimalist".to_string()),
            favorite_colors: vec!["black".to_string(), "cream".to_string()],
            avoid: vec![],
        };
        assert_eq!(
            format_preferences(&prefs),
            "style: minimalist; favorite colors: black, cream"
        );
        assert_eq!(format_preferences(&StylePreferences::default()), "none stated");
    }
}
