use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{Config, API_KEY_ENV};
use crate::models::{FoodType, NewMealItem, Nutrients};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Name used when the label yields no usable product name.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

const LABEL_INSTRUCTIONS: &str = "Read the nutrition label in this image. \
Report the product name, its total calories for the whole package \
(per-100g kcal scaled by the package weight), and carbohydrates, protein, \
fat and sugar in grams per 100g exactly as printed. Classify the product as \
Veggie, Vegan, Meat or Unknown. Use 0 for any value you cannot read and \
'Unknown Product' when the name is not visible. Reply with the JSON object only.";

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("{} environment variable is not set.", API_KEY_ENV)]
    MissingApiKey,
    #[error("Label recognition request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Label recognition failed: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Could not read the label response: {0}")]
    Malformed(String),
}

/// Turns a photographed nutrition label into item data ready to log.
#[async_trait]
pub trait LabelRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8], media_type: &str) -> Result<NewMealItem, RecognitionError>;
}

#[derive(Clone)]
pub struct GeminiLabelClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiLabelClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone(), config.model.clone())
    }

    fn request_body(image: &[u8], media_type: &str) -> Value {
        json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": media_type,
                            "data": STANDARD.encode(image)
                        }
                    },
                    { "text": LABEL_INSTRUCTIONS }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "calories": { "type": "NUMBER" },
                        "carbs": { "type": "NUMBER" },
                        "protein": { "type": "NUMBER" },
                        "fat": { "type": "NUMBER" },
                        "sugar": { "type": "NUMBER" },
                        "type": {
                            "type": "STRING",
                            "enum": ["Veggie", "Vegan", "Meat", "Unknown"]
                        }
                    },
                    "required": ["name", "calories", "carbs", "protein", "fat", "sugar", "type"]
                }
            }
        })
    }
}

#[async_trait]
impl LabelRecognizer for GeminiLabelClient {
    #[instrument(skip(self, image), fields(model = %self.model, bytes = image.len()))]
    async fn recognize(&self, image: &[u8], media_type: &str) -> Result<NewMealItem, RecognitionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RecognitionError::MissingApiKey)?;

        let url = format!("{}/models/{}:generateContent", API_BASE_URL, self.model);
        debug!("Sending label to Gemini");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(image, media_type))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini rejected label request");
            return Err(RecognitionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let data = decode_response(&body)?;
        let text = response_text(&data)?;
        let item = parse_label_json(text)?;
        debug!(name = %item.name, calories = item.nutrients.calories, "Label recognized");
        Ok(item)
    }
}

/// A success status with a body that is not JSON is still a bad answer.
fn decode_response(body: &str) -> Result<Value, RecognitionError> {
    serde_json::from_str(body).map_err(|e| RecognitionError::Malformed(e.to_string()))
}

/// First text part of the first candidate.
fn response_text(data: &Value) -> Result<&str, RecognitionError> {
    if let Some(message) = data
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(RecognitionError::Malformed(message.to_string()));
    }

    data.get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .and_then(|parts| parts.iter().find_map(|p| p.get("text").and_then(|t| t.as_str())))
        .ok_or_else(|| RecognitionError::Malformed("response contained no text".to_string()))
}

/// Normalize the model's JSON answer into loggable item data.
pub fn parse_label_json(text: &str) -> Result<NewMealItem, RecognitionError> {
    let trimmed = strip_code_fence(text.trim());
    let parsed: Value =
        serde_json::from_str(trimmed).map_err(|e| RecognitionError::Malformed(e.to_string()))?;
    let obj: &Map<String, Value> = parsed
        .as_object()
        .ok_or_else(|| RecognitionError::Malformed("expected a JSON object".to_string()))?;

    let parse_num = |k: &str| -> f64 {
        obj.get(k)
            .and_then(|v| {
                v.as_f64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            })
            .filter(|n: &f64| n.is_finite() && *n > 0.0)
            .unwrap_or(0.0)
    };

    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_PRODUCT)
        .to_string();

    let food_type = obj
        .get("type")
        .and_then(|v| v.as_str())
        .map(FoodType::from_label)
        .unwrap_or_default();

    Ok(NewMealItem {
        name,
        food_type,
        nutrients: Nutrients {
            calories: parse_num("calories"),
            carbs: parse_num("carbs"),
            protein: parse_num("protein"),
            fat: parse_num("fat"),
            sugar: parse_num("sugar"),
        },
    })
}

fn strip_code_fence(text: &str) -> &str {
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(text)
}

/// Media type for an image path, from its extension.
pub fn media_type_for(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}
