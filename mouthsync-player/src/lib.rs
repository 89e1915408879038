//! mouthsync Player Library
//!
//! This library drives the avatar: it keeps the current viseme timeline,
//! runs a per-frame loop while audio plays, resolves the active viseme and
//! swaps the displayed mouth image.

pub mod audio;
pub mod driver;
pub mod frame;
pub mod player;
pub mod renderer;
pub mod store;

#[cfg(test)]
mod test_support;

pub use audio::{AudioOutput, WallClockAudio};
pub use driver::{PlaybackDriver, PlaybackState};
pub use frame::{FrameHandle, FrameScheduler, ManualScheduler};
pub use player::{Player, Status};
pub use renderer::{AssetCatalog, AvatarRenderer, DisplayedImage, PreloadCache};
pub use store::TimelineStore;

/// Result type for mouthsync-player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for mouthsync-player operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Client error: {0}")]
    Client(#[from] mouthsync_client::ClientError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// The audio subsystem refused to start or continue playback
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("No audio source loaded")]
    NoSource,

    #[error("Audio could not be decoded: {0}")]
    Decode(String),

    #[error("Playback not permitted: {0}")]
    NotPermitted(String),
}
