//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use verdant_core::config::{AssistantConfig, GenerationConfig, SafetySetting};

use crate::error::AssistantError;

/// Request body sent on every attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: WireGenerationConfig,
    pub safety_settings: Vec<WireSafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateRequest {
    /// Single-turn request carrying `message` and the configured parameters.
    #[must_use]
    pub fn new(message: &str, config: &AssistantConfig) -> Self {
        Self {
            contents: vec![Content::text(message)],
            generation_config: (&config.generation).into(),
            safety_settings: config.safety.iter().map(Into::into).collect(),
            system_instruction: config.system_instruction.as_deref().map(Content::text),
        }
    }

    /// Text of the first user part.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}

/// A list of text parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    /// Content with one text part.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// `generationConfig` as the endpoint spells it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&GenerationConfig> for WireGenerationConfig {
    fn from(g: &GenerationConfig) -> Self {
        Self {
            temperature: g.temperature,
            top_k: g.top_k,
            top_p: g.top_p,
            max_output_tokens: g.max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireSafetySetting {
    pub category: String,
    pub threshold: String,
}

impl From<&SafetySetting> for WireSafetySetting {
    fn from(s: &SafetySetting) -> Self {
        Self {
            category: s.category.clone(),
            threshold: s.threshold.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Pull `candidates[0].content.parts[0].text` out of a success body.
///
/// # Errors
/// Returns `AssistantError::Format` if the body is not JSON or the path is
/// missing, not a string, or empty.
pub fn extract_text(body: &str) -> Result<String, AssistantError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| AssistantError::Format(format!("response is not JSON: {e}")))?;

    json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| {
            AssistantError::Format("missing candidates[0].content.parts[0].text".to_string())
        })
}

/// `error.message` from a failure body, if the body has one.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"].as_str().map(ToString::to_string)
}
