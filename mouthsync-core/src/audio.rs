//! In-memory audio clips handed to the backend and the audio output

use std::path::Path;
use std::sync::Arc;

/// An audio recording selected by the user or fetched as an example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// File name sent with the upload
    pub file_name: String,
    /// MIME type, e.g. `audio/wav`
    pub mime: String,
    /// Encoded audio bytes
    pub data: Arc<[u8]>,
}

impl AudioClip {
    /// Creates a new clip
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Reads a clip from disk, inferring its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, extension_to_content_type(&extension), data))
    }

    /// Builds a clip from a downloaded body and its `content-type` header
    pub fn from_download(stem: &str, content_type: &str, data: Vec<u8>) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_string();
        let file_name = format!("{}.{}", stem, content_type_to_extension(content_type));
        Self::new(file_name, mime, data)
    }

    /// Returns the size of the audio data in bytes
    pub fn data_size(&self) -> usize {
        self.data.len()
    }
}

/// Maps a content type (parameters allowed) to a file extension, defaulting to `wav`
pub fn content_type_to_extension(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    match mime {
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/webm" => "webm",
        "audio/aac" => "aac",
        _ => "wav",
    }
}

/// Maps a file extension to a content type, defaulting to `application/octet-stream`
pub fn extension_to_content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "wav" | "wave" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" | "mp4" => "audio/mp4",
        "webm" => "audio/webm",
        "aac" => "audio/aac",
        _ => "application/octet-stream",
    }
}
