//! mouthsync Client Library
//!
//! This library talks to the viseme-generation backend: it submits an audio
//! recording and its transcript for processing, fetches example content and
//! reports backend health.

pub mod client;
pub mod config;

pub use client::{GenerateRequest, HealthReport, VisemeClient};
pub use config::ClientConfig;

use async_trait::async_trait;
use mouthsync_core::{AudioClip, Language, ProcessingResponse};

/// Result type for mouthsync-client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error types for mouthsync-client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Audio and transcript are both required")]
    InputIncomplete,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<mouthsync_core::Error> for ClientError {
    fn from(err: mouthsync_core::Error) -> Self {
        ClientError::MalformedResponse(err.to_string())
    }
}

/// Something that turns audio plus transcript into a viseme timeline
#[async_trait]
pub trait VisemeService: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<ProcessingResponse>;
}

/// Source of example transcript and audio for a language
#[async_trait]
pub trait ExampleSource: Send + Sync {
    async fn example_text(&self, language: Language) -> Result<String>;

    async fn example_audio(&self, language: Language) -> Result<AudioClip>;
}
