//! Configuration for the Verdant assistant.
//!
//! Maps directly to `verdant.toml`. Every field has a default, so an empty
//! document yields a working configuration (minus the API key).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Generation endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Top-level Verdant configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdantConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Outbound model calls.
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Location facts appended to answers.
    #[serde(default)]
    pub augmentation: AugmentationConfig,
    /// Where the location table comes from.
    #[serde(default)]
    pub locations: LocationsConfig,
}

impl VerdantConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `VerdantError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::VerdantError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Outbound call settings for the generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Full URL of the `generateContent` endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API credential. Takes precedence over `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Minimum spacing between two outbound dispatches.
    #[serde(default = "default_2000")]
    pub min_request_interval_ms: u64,
    /// Per-attempt HTTP timeout.
    #[serde(default = "default_30000")]
    pub request_timeout_ms: u64,
    /// Optional persona sent as `systemInstruction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// Sampling parameters.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Content-safety thresholds.
    #[serde(default = "default_safety")]
    pub safety: Vec<SafetySetting>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            min_request_interval_ms: 2000,
            request_timeout_ms: 30_000,
            system_instruction: None,
            generation: GenerationConfig::default(),
            safety: default_safety(),
        }
    }
}

impl AssistantConfig {
    /// The credential to use, if any.
    ///
    /// An explicit `api_key` wins; otherwise the variable named by
    /// `api_key_env` is read. Blank values count as missing.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_0_7")]
    pub temperature: f32,
    #[serde(default = "default_40")]
    pub top_k: u32,
    #[serde(default = "default_0_95")]
    pub top_p: f32,
    #[serde(default = "default_2048")]
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// One harm category and the threshold at which the endpoint blocks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// How a location-flavoured query is matched against records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// The whole query must appear inside a name, city, or material.
    QueryInField,
    /// Either the query appears inside a field, or a field appears inside the query.
    #[default]
    Bidirectional,
}

/// Location augmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentationConfig {
    /// Whether answers are augmented at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Raw substrings that mark a query as location-related.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Cap on appended records.
    #[serde(default = "default_3_usize")]
    pub max_matches: usize,
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keywords: default_keywords(),
            max_matches: 3,
            match_policy: MatchPolicy::default(),
        }
    }
}

/// Location dataset source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationsConfig {
    /// JSON dataset to load instead of the bundled one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_keywords() -> Vec<String> {
    ["compost", "recycl", "location", "facility", "where"]
        .iter()
        .map(ToString::to_string)
        .collect()
}
fn default_safety() -> Vec<SafetySetting> {
    vec![SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT".to_string(),
        threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
    }]
}
fn default_0_7() -> f32 { 0.7 }
fn default_0_95() -> f32 { 0.95 }
fn default_3_usize() -> usize { 3 }
fn default_40() -> u32 { 40 }
fn default_2000() -> u64 { 2000 }
fn default_2048() -> u32 { 2048 }
fn default_30000() -> u64 { 30_000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = VerdantConfig::from_toml("").expect("empty toml");
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.assistant.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.assistant.min_request_interval_ms, 2000);
        assert_eq!(cfg.assistant.generation, GenerationConfig::default());
        assert_eq!(cfg.assistant.safety.len(), 1);
        assert_eq!(
            cfg.augmentation.keywords,
            vec!["compost", "recycl", "location", "facility", "where"]
        );
        assert_eq!(cfg.augmentation.max_matches, 3);
        assert_eq!(cfg.augmentation.match_policy, MatchPolicy::Bidirectional);
        assert!(cfg.locations.dataset_path.is_none());
    }

    #[test]
    fn partial_document_overrides_selected_fields() {
        let cfg = VerdantConfig::from_toml(
            r#"
            [assistant]
            api_key = "abc"
            min_request_interval_ms = 500

            [assistant.generation]
            temperature = 0.2

            [augmentation]
            match_policy = "query_in_field"
            keywords = ["depot"]
            "#,
        )
        .expect("valid toml");
        assert_eq!(cfg.assistant.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.assistant.min_request_interval_ms, 500);
        assert!((cfg.assistant.generation.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(cfg.assistant.generation.top_k, 40);
        assert_eq!(cfg.augmentation.match_policy, MatchPolicy::QueryInField);
        assert_eq!(cfg.augmentation.keywords, vec!["depot"]);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = VerdantConfig::from_toml("[assistant\nendpoint = 3").expect_err("invalid");
        assert!(matches!(err, crate::VerdantError::Config(_)));
    }

    #[test]
    fn explicit_key_wins_and_blank_is_missing() {
        let mut cfg = AssistantConfig {
            api_key: Some("explicit".into()),
            api_key_env: "VERDANT_TEST_UNSET_VARIABLE_1".into(),
            ..AssistantConfig::default()
        };
        assert_eq!(cfg.resolve_api_key().as_deref(), Some("explicit"));

        cfg.api_key = Some("   ".into());
        assert!(cfg.resolve_api_key().is_none());

        cfg.api_key = None;
        assert!(cfg.resolve_api_key().is_none());
    }

    #[test]
    fn key_falls_back_to_named_variable() {
        let var = "VERDANT_TEST_KEY_FALLBACK_7F3A";
        let cfg = AssistantConfig {
            api_key: None,
            api_key_env: var.into(),
            ..AssistantConfig::default()
        };

        // SAFETY: the variable name is unique to this test, so no other
        // thread reads or writes it.
        unsafe { std::env::set_var(var, "from-env") };
        assert_eq!(cfg.resolve_api_key().as_deref(), Some("from-env"));

        // SAFETY: as above.
        unsafe { std::env::set_var(var, "  ") };
        assert!(cfg.resolve_api_key().is_none());

        let explicit = AssistantConfig {
            api_key: Some("explicit".into()),
            ..cfg.clone()
        };
        // SAFETY: as above.
        unsafe { std::env::set_var(var, "from-env") };
        assert_eq!(explicit.resolve_api_key().as_deref(), Some("explicit"));

        // SAFETY: as above.
        unsafe { std::env::remove_var(var) };
        assert!(cfg.resolve_api_key().is_none());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("verdant.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").expect("write");
        let cfg = VerdantConfig::from_file(&path).expect("load");
        assert_eq!(cfg.general.log_level, "debug");
    }
}
