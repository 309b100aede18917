use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ChatConfig;
use crate::errors::{classify_reqwest_error, ChatError, ChatResult, ShapeIssue};
use crate::turn::{Part, Turn};
use crate::types::*;

/// Client for interacting with the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: ChatConfig,
    api_key: String,
}

impl GeminiClient {
    /// Create a new Gemini API client
    pub fn new(config: ChatConfig) -> ChatResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ChatError::ConfigError(
                "API key is required to initialize the Gemini client".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ChatError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// URL of the generateContent method, without the key query parameter
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url(),
            self.config.model_name()
        )
    }

    /// Builds the wire request from the whole history, oldest turn first.
    pub fn build_request(&self, turns: &[Turn]) -> GenerateContentRequest {
        let system_instruction = self
            .config
            .system_prompt
            .as_ref()
            .map(|prompt| SystemInstruction {
                parts: vec![Part::text(prompt.clone())],
            });

        let generation_config = self.config.temperature.map(|temperature| GenerationConfig {
            temperature: Some(temperature),
        });

        GenerateContentRequest {
            contents: turns.iter().map(Content::from).collect(),
            system_instruction,
            generation_config,
        }
    }

    /// Posts the request and returns the raw body of a successful response.
    pub async fn send(&self, request: &GenerateContentRequest) -> ChatResult<String> {
        let url = self.endpoint_url();
        debug!(url = %url, turns = request.contents.len(), "Sending generateContent request");

        let body = serde_json::to_vec(request)
            .map_err(|e| ChatError::UnexpectedError(format!("Failed to encode request: {}", e)))?;

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini API returned an error status");

            return Err(ChatError::HttpError {
                status_code: status.as_u16(),
                message: format!(
                    "{} {}",
                    status.canonical_reason().unwrap_or("Unknown Status"),
                    error_body.trim()
                )
                .trim()
                .to_string(),
            });
        }

        response.text().await.map_err(classify_reqwest_error)
    }

    /// Parses a response body. Invalid JSON is a decode error; whether the
    /// JSON holds a usable reply is decided later by `extract_text`.
    pub fn decode_response(&self, body: &str) -> ChatResult<GenerateContentResponse> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ChatError::DecodeError(format!("Failed to parse response: {}", e)))?;
        Ok(GenerateContentResponse::new(value))
    }

    /// Generate content using the Gemini API
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> ChatResult<GenerateContentResponse> {
        let body = self.send(request).await?;
        self.decode_response(&body)
    }

    /// Pulls `candidates[0].content.parts[0].text` out of a response.
    /// Nothing past index 0 is looked at.
    pub fn extract_text(&self, response: &GenerateContentResponse) -> Result<String, ShapeIssue> {
        let candidate = response.first_candidate().ok_or_else(|| {
            debug!("Response has no candidates");
            ShapeIssue::UnexpectedStructure(response.body.to_string())
        })?;

        let part = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .and_then(|parts| parts.first())
            .ok_or(ShapeIssue::MissingContent)?;

        part.get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ShapeIssue::MissingText)
    }
}
