//! mouthsync Core Library
//!
//! This library provides the data model of the lip-sync player: viseme
//! categories and mouth shapes, validated viseme timelines, the backend
//! response model, and the resolver that maps playback time to the active
//! timeline interval.

pub mod audio;
pub mod resolver;
pub mod response;
pub mod timeline;
pub mod viseme;

pub use audio::AudioClip;
pub use resolver::resolve;
pub use response::{ProcessingResponse, ResponseMetadata, VisemeStatistics};
pub use timeline::{Timeline, VisemeInterval};
pub use viseme::{Language, MouthMapping, MouthShape, VisemeCategory};

/// Result type for mouthsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for mouthsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interval {index} has a non-finite time")]
    NonFiniteTime { index: usize },

    #[error("Interval {index} is invalid: start {start}, end {end}")]
    InvalidInterval { index: usize, start: f64, end: f64 },

    #[error("Interval {index} starts before the previous interval")]
    Unsorted { index: usize },

    #[error("Interval {index} overlaps the previous interval")]
    Overlapping { index: usize },

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
}
