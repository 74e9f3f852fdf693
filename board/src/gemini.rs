//! Gemini client for free-form and schema-constrained text generation.

use crate::error::{BoardError, Result};
use crate::youtube_api::types::ErrorEnvelope;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Where the Gemini API lives unless configured otherwise.
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE.to_string(),
            client,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Generates free-form text for `prompt`.
    ///
    /// Any failure, be it the network, a non-success status or an empty reply, is a
    /// [`BoardError::Generation`].
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let text = self.call_gemini_api(prompt, None).await?;
        Ok(text.trim().to_string())
    }

    /// Generates JSON matching `schema` and decodes it into `T`.
    ///
    /// A reply that does not decode into `T` is a [`BoardError::Format`].
    #[instrument(skip(self, prompt, schema), fields(model = %self.model))]
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<T> {
        let config = GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema,
        };
        let text = self.call_gemini_api(prompt, Some(config)).await?;
        serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            tracing::error!(error = %e, response = %text, "failed to parse Gemini response as JSON");
            BoardError::Format("Invalid data format received from the API.".to_string())
        })
    }

    async fn call_gemini_api(
        &self,
        prompt: &str,
        generation_config: Option<GenerationConfig>,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                BoardError::Generation(format!("Gemini API request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %error_text, "Gemini API error");
            let message = ErrorEnvelope::message_from(&error_text).unwrap_or(error_text);
            return Err(BoardError::Generation(format!(
                "Gemini API returned {status}: {message}"
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            BoardError::Generation(format!("Failed to parse Gemini response: {e}"))
        })?;

        let text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(BoardError::Generation(
                "No content in Gemini response".to_string(),
            ));
        }

        tracing::debug!(chars = text.len(), "Gemini generated content");
        Ok(text)
    }
}

/// Models occasionally wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}
