//! Response model of the viseme-generation backend

use crate::{Result, Timeline, VisemeInterval};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Successful processing response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResponse {
    /// Intervals ordered by start time
    pub viseme_timeline: Vec<VisemeInterval>,
    pub metadata: ResponseMetadata,
    /// Server-side processing time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Transcript as the backend processed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Total voiced duration in seconds
    pub total_duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viseme_statistics: Option<VisemeStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_timestamp: Option<String>,
}

/// Per-viseme counts; JSON object keys are the viseme ids as strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisemeStatistics {
    pub counts: BTreeMap<String, u32>,
    pub total_visemes: usize,
}

impl ProcessingResponse {
    /// Parses a response body
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Validates the intervals and builds a [`Timeline`]
    pub fn to_timeline(&self) -> Result<Timeline> {
        Timeline::new(self.viseme_timeline.clone())
    }

    /// Consumes the response, validating its intervals
    pub fn into_timeline(self) -> Result<Timeline> {
        Timeline::new(self.viseme_timeline)
    }

    /// One-line summary shown after a successful request
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} visemes, {:.2}s",
            self.viseme_timeline.len(),
            self.metadata.total_duration
        );
        if let Some(processing_time) = self.processing_time {
            summary.push_str(&format!(", processed in {:.3}s", processing_time));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const BODY: &str = r#"{
        "request_id": "3f1c",
        "processing_time": 1.23456,
        "status": "success",
        "viseme_timeline": [
            {"start": 0.0, "end": 0.5, "duration": 0.5, "phoneme": "m", "viseme": 1},
            {"start": 0.5, "end": 1.2, "duration": 0.7, "phoneme": "a", "viseme": 12}
        ],
        "transcript": "ma",
        "metadata": {
            "audio_filename": "ma.wav",
            "total_duration": 1.2,
            "viseme_statistics": {"counts": {"1": 1, "12": 1}, "total_visemes": 2},
            "process_timestamp": "2024-05-01T10:00:00"
        }
    }"#;

    #[test]
    fn test_parses_full_backend_response() {
        let response = ProcessingResponse::from_json(BODY).unwrap();
        assert_eq!(response.viseme_timeline.len(), 2);
        assert_eq!(response.request_id.as_deref(), Some("3f1c"));
        let stats = response.metadata.viseme_statistics.as_ref().unwrap();
        assert_eq!(stats.total_visemes, 2);
        assert_eq!(stats.counts.get("12"), Some(&1));

        let timeline = response.into_timeline().unwrap();
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_parses_minimal_response() {
        let body = r#"{"viseme_timeline": [], "metadata": {"total_duration": 0.0}}"#;
        let response = ProcessingResponse::from_json(body).unwrap();
        assert!(response.processing_time.is_none());
        assert_eq!(response.summary(), "0 visemes, 0.00s");
    }

    #[test]
    fn test_summary_includes_processing_time() {
        let response = ProcessingResponse::from_json(BODY).unwrap();
        assert_eq!(response.summary(), "2 visemes, 1.20s, processed in 1.235s");
    }

    #[test]
    fn test_missing_timeline_is_an_error() {
        let err = ProcessingResponse::from_json(r#"{"metadata": {"total_duration": 1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_overlapping_response_rejected() {
        let body = r#"{"viseme_timeline": [
            {"start": 0.0, "end": 0.6, "phoneme": "m", "viseme": 1},
            {"start": 0.5, "end": 1.0, "phoneme": "a", "viseme": 12}
        ], "metadata": {"total_duration": 1.0}}"#;
        let response = ProcessingResponse::from_json(body).unwrap();
        assert!(matches!(
            response.into_timeline(),
            Err(Error::Overlapping { index: 1 })
        ));
    }
}
