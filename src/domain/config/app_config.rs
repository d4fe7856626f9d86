//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;
use crate::domain::transcription::{Granularity, ResponseDetail};

/// Default transcription model identifier
pub const DEFAULT_TRANSCRIBE_MODEL: &str = "whisper-1";

/// Default extraction model identifier
pub const DEFAULT_EXTRACT_MODEL: &str = "gpt-4";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub transcribe_model: Option<String>,
    pub extract_model: Option<String>,
    pub extract: Option<bool>,
    pub granularity: Option<String>,
    pub detail: Option<String>,
    pub notify: Option<bool>,
    pub max_duration: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            api_base_url: None,
            transcribe_model: Some(DEFAULT_TRANSCRIBE_MODEL.to_string()),
            extract_model: Some(DEFAULT_EXTRACT_MODEL.to_string()),
            extract: Some(true),
            granularity: Some("word".to_string()),
            detail: Some("verbose".to_string()),
            notify: Some(false),
            max_duration: Some("2m".to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            api_base_url: other.api_base_url.or(self.api_base_url),
            transcribe_model: other.transcribe_model.or(self.transcribe_model),
            extract_model: other.extract_model.or(self.extract_model),
            extract: other.extract.or(self.extract),
            granularity: other.granularity.or(self.granularity),
            detail: other.detail.or(self.detail),
            notify: other.notify.or(self.notify),
            max_duration: other.max_duration.or(self.max_duration),
        }
    }

    /// Get transcription model, or the default if not set
    pub fn transcribe_model_or_default(&self) -> &str {
        self.transcribe_model
            .as_deref()
            .unwrap_or(DEFAULT_TRANSCRIBE_MODEL)
    }

    /// Get extraction model, or the default if not set
    pub fn extract_model_or_default(&self) -> &str {
        self.extract_model.as_deref().unwrap_or(DEFAULT_EXTRACT_MODEL)
    }

    /// Get extraction setting, or true if not set
    pub fn extract_or_default(&self) -> bool {
        self.extract.unwrap_or(true)
    }

    /// Get granularity as parsed Granularity, or default if not set/invalid
    pub fn granularity_or_default(&self) -> Granularity {
        self.granularity
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get detail as parsed ResponseDetail, or default if not set/invalid
    pub fn detail_or_default(&self) -> ResponseDetail {
        self.detail
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_capture)
    }
}
