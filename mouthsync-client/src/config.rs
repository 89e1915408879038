//! Backend endpoint configuration

use crate::{ClientError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Where the backend lives and which paths it serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Multipart processing endpoint
    pub generate_path: String,
    /// Example transcript endpoint, answers `{"text": ...}`
    pub example_text_path: String,
    /// Example audio endpoint, answers raw audio bytes
    pub example_audio_path: String,
    pub health_path: String,
    /// Request timeout; `None` leaves it to the transport
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            generate_path: "/api/generate-viseme".to_string(),
            example_text_path: "/api/example/text".to_string(),
            example_audio_path: "/api/example/audio".to_string(),
            health_path: "/api/health".to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Config with default paths against another backend
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins `path` onto the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ClientError::InvalidConfig(format!("{}: {}", joined, e)))
    }
}
