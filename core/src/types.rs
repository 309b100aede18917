use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::turn::{Part, Turn};

/// Request to Gemini API to generate content
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One entry of the request history
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.wire_name().to_string(),
            parts: turn.content.clone(),
        }
    }
}

/// System prompt; the API takes it without a role
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

/// Generation configuration options
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response from Gemini API, kept as parsed JSON.
///
/// Only `candidates[0].content.parts[0].text` is ever read, so nothing else
/// in the body (extra candidates, extra parts, unknown fields) can make an
/// otherwise usable reply fail.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct GenerateContentResponse {
    pub body: Value,
}

impl GenerateContentResponse {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// `candidates[0]`, if `candidates` is a non-empty array
    pub fn first_candidate(&self) -> Option<&Value> {
        self.body.get("candidates")?.as_array()?.first()
    }
}
