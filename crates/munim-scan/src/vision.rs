//! Cloud vision tier for parchi extraction.
//!
//! Posts the parchi image to an OpenAI-compatible chat completions
//! endpoint with a fixed extraction prompt and parses the model's JSON
//! reply into [`ParchiData`]. A failure here is not fatal; the scanner
//! falls through to local OCR.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use munim_core::config::ScanConfig;
use munim_core::types::{ParchiData, ParchiItem};
use munim_core::{MunimError, Result};

const EXTRACTION_PROMPT: &str = "You are reading a handwritten Indian shop bill (parchi). \
Extract every line item and the total. Respond with ONLY a JSON object, no prose, shaped as: \
{\"items\": [{\"product\": \"आटा\", \"quantity\": 10, \"unit\": \"किलो\", \"price\": 450}, \
{\"product\": \"Milk\", \"quantity\": 2, \"unit\": \"packet\", \"price\": 60}], \"totalAmount\": 510}. \
Product names may be in Hindi or English; keep them as written. \
Use null for any field you cannot read.";

/// Confidence reported for successful vision extraction. The model reads
/// handwriting far better than local OCR, so this sits above anything the
/// line parser produces.
const VISION_CONFIDENCE: f32 = 0.95;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct VisionRequest {
    model: String,
    messages: Vec<VisionMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct VisionMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct VisionResponse {
    #[serde(default)]
    choices: Vec<VisionChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct VisionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Shape the extraction prompt asks the model to produce.
#[derive(Deserialize)]
struct ExtractedBill {
    #[serde(default)]
    items: Vec<ExtractedItem>,
    #[serde(default, alias = "totalAmount")]
    total_amount: Option<f64>,
}

#[derive(Deserialize)]
struct ExtractedItem {
    product: String,
    quantity: Option<f64>,
    unit: Option<String>,
    price: Option<f64>,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the cloud vision endpoint.
pub struct VisionClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl VisionClient {
    pub fn new(config: &ScanConfig, model: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.vision_timeout_secs))
            .build()
            .map_err(|e| MunimError::Vision(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.vision_endpoint.clone(),
            model: model.into(),
            api_key,
        })
    }

    /// Send a parchi image (as a data URL) for extraction.
    pub async fn extract(&self, image_data_url: &str) -> Result<ParchiData> {
        if self.endpoint.is_empty() {
            return Err(MunimError::Vision("No vision endpoint configured".to_string()));
        }

        let request = VisionRequest {
            model: self.model.clone(),
            messages: vec![VisionMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url.to_string(),
                        },
                    },
                ],
            }],
            temperature: 0.0,
            max_tokens: 1024,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MunimError::Vision(format!("Vision request failed: {}", e)))?;

        let status = response.status();
        let body: VisionResponse = response
            .json()
            .await
            .map_err(|e| MunimError::Vision(format!("Invalid vision response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(MunimError::Vision(error.message));
        }
        if !status.is_success() {
            return Err(MunimError::Vision(format!("Vision endpoint returned {}", status)));
        }

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MunimError::Vision("Vision response had no content".to_string()))?;

        debug!(chars = content.len(), "Vision model replied");
        parse_vision_content(&content)
    }
}

/// Parse the model's reply into [`ParchiData`].
///
/// Models often wrap JSON in markdown fences despite the prompt, so
/// fences are stripped before parsing.
pub fn parse_vision_content(content: &str) -> Result<ParchiData> {
    let cleaned = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let bill: ExtractedBill = serde_json::from_str(cleaned)
        .map_err(|e| MunimError::Vision(format!("Vision reply was not valid JSON: {}", e)))?;

    let items: Vec<ParchiItem> = bill
        .items
        .into_iter()
        .map(|i| ParchiItem {
            product: i.product,
            quantity: i.quantity,
            unit: i.unit,
            price: i.price,
        })
        .collect();

    let total_amount = bill
        .total_amount
        .or_else(|| {
            let sum: f64 = items.iter().filter_map(|i| i.price).sum();
            (sum > 0.0).then_some(sum)
        });

    Ok(ParchiData {
        raw_text: cleaned.to_string(),
        items,
        total_amount,
        confidence: VISION_CONFIDENCE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let content = r#"{"items": [{"product": "आटा", "quantity": 10, "unit": "किलो", "price": 450}], "totalAmount": 450}"#;
        let data = parse_vision_content(content).unwrap();
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].product, "आटा");
        assert_eq!(data.total_amount, Some(450.0));
        assert_eq!(data.confidence, 0.95);
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = "```json\n{\"items\": [{\"product\": \"Milk\", \"quantity\": 2, \"unit\": \"packet\", \"price\": 60}], \"totalAmount\": 60}\n```";
        let data = parse_vision_content(content).unwrap();
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].product, "Milk");
    }

    #[test]
    fn test_missing_total_summed_from_items() {
        let content = r#"{"items": [{"product": "A", "quantity": 1, "unit": null, "price": 450}, {"product": "B", "quantity": 2, "unit": null, "price": 60}]}"#;
        let data = parse_vision_content(content).unwrap();
        assert_eq!(data.total_amount, Some(510.0));
    }

    #[test]
    fn test_null_fields_allowed() {
        let content = r#"{"items": [{"product": "A", "quantity": null, "unit": null, "price": null}], "totalAmount": null}"#;
        let data = parse_vision_content(content).unwrap();
        assert_eq!(data.items.len(), 1);
        assert!(data.items[0].quantity.is_none());
        assert!(data.total_amount.is_none());
    }

    #[test]
    fn test_prose_reply_is_an_error() {
        assert!(parse_vision_content("I could not read the bill.").is_err());
    }

    #[test]
    fn test_snake_case_total_accepted() {
        let content = r#"{"items": [], "total_amount": 100}"#;
        let data = parse_vision_content(content).unwrap();
        assert_eq!(data.total_amount, Some(100.0));
    }
}
