//! reqwest-backed client for the viseme-generation backend

use crate::{ClientConfig, ClientError, ExampleSource, Result, VisemeService};
use async_trait::async_trait;
use mouthsync_core::{AudioClip, Language, ProcessingResponse};
use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// A processing submission
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub audio: AudioClip,
    pub transcript: String,
    /// Omitted from the form when `None`
    pub language: Option<Language>,
}

impl GenerateRequest {
    /// Builds a request, refusing a blank transcript
    pub fn new(audio: AudioClip, transcript: &str, language: Option<Language>) -> Result<Self> {
        let transcript = transcript.trim();
        if transcript.is_empty() || audio.data.is_empty() {
            return Err(ClientError::InputIncomplete);
        }
        Ok(Self {
            audio,
            transcript: transcript.to_string(),
            language,
        })
    }
}

/// Backend health as reported by the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub components: BTreeMap<String, serde_json::Value>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Deserialize)]
struct ExampleText {
    text: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// HTTP client for the viseme-generation backend
#[derive(Debug, Clone)]
pub struct VisemeClient {
    http: Client,
    config: ClientConfig,
}

impl VisemeClient {
    /// Creates a client for the configured backend
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Fail early on an unusable base URL
        config.endpoint(&config.generate_path)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submits audio and transcript as a multipart form
    pub async fn generate(&self, request: &GenerateRequest) -> Result<ProcessingResponse> {
        let url = self.config.endpoint(&self.config.generate_path)?;

        let audio_part = multipart::Part::bytes(request.audio.data.to_vec())
            .file_name(request.audio.file_name.clone())
            .mime_str(&request.audio.mime)?;

        let mut form = multipart::Form::new()
            .part("audio_file", audio_part)
            .text("transcript", request.transcript.clone());
        if let Some(language) = request.language {
            form = form.text("language", language.code().to_string());
        }

        tracing::info!(
            url = %url,
            file = %request.audio.file_name,
            bytes = request.audio.data_size(),
            "submitting audio for viseme generation"
        );

        let response = self.http.post(url).multipart(form).send().await?;
        let body = check_status(response).await?.text().await?;

        let parsed = ProcessingResponse::from_json(&body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            visemes = parsed.viseme_timeline.len(),
            total_duration = parsed.metadata.total_duration,
            processing_time = ?parsed.processing_time,
            "viseme timeline received"
        );
        Ok(parsed)
    }

    /// Fetches the example transcript for a language
    pub async fn example_text(&self, language: Language) -> Result<String> {
        let url = self.config.endpoint(&self.config.example_text_path)?;
        let response = self
            .http
            .get(url)
            .query(&[("language", language.code())])
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;

        let example: ExampleText = serde_json::from_str(&body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        Ok(example.text)
    }

    /// Fetches the example recording for a language
    pub async fn example_audio(&self, language: Language) -> Result<AudioClip> {
        let url = self.config.endpoint(&self.config.example_audio_path)?;
        let response = self
            .http
            .get(url)
            .query(&[("language", language.code())])
            .send()
            .await?;
        let response = check_status(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("audio/wav")
            .to_string();
        if !content_type.starts_with("audio/") {
            return Err(ClientError::MalformedResponse(format!(
                "expected audio, got {}",
                content_type
            )));
        }

        let data = response.bytes().await?.to_vec();
        tracing::debug!(bytes = data.len(), content_type = %content_type, "example audio fetched");
        Ok(AudioClip::from_download(
            &format!("example_{}", language.code()),
            &content_type,
            data,
        ))
    }

    /// Queries the health endpoint
    pub async fn health(&self) -> Result<HealthReport> {
        let url = self.config.endpoint(&self.config.health_path)?;
        let response = self.http.get(url).send().await?;
        let body = check_status(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

/// Turns a non-2xx response into [`ClientError::Status`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{} ({})", error, details),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    tracing::warn!(status = status.as_u16(), message = %message, "backend request failed");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl VisemeService for VisemeClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<ProcessingResponse> {
        VisemeClient::generate(self, request).await
    }
}

#[async_trait]
impl ExampleSource for VisemeClient {
    async fn example_text(&self, language: Language) -> Result<String> {
        VisemeClient::example_text(self, language).await
    }

    async fn example_audio(&self, language: Language) -> Result<AudioClip> {
        VisemeClient::example_audio(self, language).await
    }
}
