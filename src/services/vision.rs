use crate::error::{ai_error, AppResult};
use crate::models::GarmentAttributes;
use crate::services::stylist::parse_json_from_response;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};
use std::io::Cursor;
use tracing::info;

/// Gemini REST endpoint for multimodal generation
const GENERATE_CONTENT_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Images are downscaled to fit this edge length before upload
const MAX_IMAGE_EDGE: u32 = 1024;

const CLASSIFY_PROMPT: &str = "Look at the clothing item in this photo and describe it as JSON.

Respond with a single JSON object in exactly this shape and nothing else:
{
  \"name\": \"short human name for the item\",
  \"category\": \"top | bottom | dress | outerwear | shoes | accessory\",
  \"color\": \"dominant color\",
  \"season\": \"summer | winter | spring | fall | all\",
  \"fit\": \"slim | regular | relaxed | oversized\",
  \"material\": \"best guess at the fabric\"
}

The response must start with `{` and end with `}`.";

/// Vision-model-backed garment classification
#[derive(Clone)]
pub struct VisionClassifier {
    client: Client,
    api_key: String,
    model: String,
}

impl VisionClassifier {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Classify a garment photo into structured attributes
    pub async fn classify_garment(&self, image_data: &[u8]) -> AppResult<GarmentAttributes> {
        info!("Classifying garment image, size: {} bytes", image_data.len());

        let jpeg = preprocess_image(image_data)?;
        let encoded = BASE64.encode(&jpeg);

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": CLASSIFY_PROMPT },
                    { "inline_data": { "mime_type": "image/jpeg", "data": encoded } }
                ]
            }],
            "generationConfig": { "temperature": 0.2 }
        });

        let url = format!(
            "{}/{}:generateContent?key={}",
            GENERATE_CONTENT_URL, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ai_error(&format!("Vision request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(ai_error(&format!(
                "Vision request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ai_error(&format!("Failed to parse vision response: {}", e)))?;

        let text = data
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .and_then(|p| p.first())
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| ai_error("No text in vision response"))?;

        parse_json_from_response::<GarmentAttributes>(text)
    }
}

/// Downscale and re-encode an uploaded photo to a bounded JPEG payload
fn preprocess_image(image_data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| ai_error(&format!("Failed to decode image: {}", e)))?;

    info!(
        "Image loaded with dimensions {}x{}",
        img.width(),
        img.height()
    );

    let img = if img.width() > MAX_IMAGE_EDGE || img.height() > MAX_IMAGE_EDGE {
        img.resize(
            MAX_IMAGE_EDGE,
            MAX_IMAGE_EDGE,
            image::imageops::FilterType::Triangle,
        )
    } else {
        img
    };

    let mut buffer = Vec::new();
    img.to_rgb8()
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .map_err(|e| ai_error(&format!("Failed to encode image to JPEG: {}", e)))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_rejects_garbage_bytes() {
        assert!(preprocess_image(b"not an image").is_err());
    }

    #[test]
    fn preprocess_downscales_large_images() {
        // Solid-color image above the edge limit
        let img = image::DynamicImage::new_rgb8(2048, 1536);
        let mut input = Vec::new();
        img.write_to(&mut Cursor::new(&mut input), image::ImageFormat::Png)
            .unwrap();

        let jpeg = preprocess_image(&input).unwrap();
        let out = image::load_from_memory(&jpeg).unwrap();
        assert!(out.width() <= MAX_IMAGE_EDGE);
        assert!(out.height() <= MAX_IMAGE_EDGE);
    }
}
