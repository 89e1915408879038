//! Audio playback seam

use crate::PlaybackError;
use mouthsync_core::AudioClip;
use std::time::Instant;

/// The single audio-playback handle owned by the playback driver
pub trait AudioOutput {
    /// Replaces the loaded clip; `None` unloads it
    fn set_source(&mut self, source: Option<AudioClip>);

    fn has_source(&self) -> bool;

    /// Seeks to zero and starts playing
    fn play_from_start(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Clip length in seconds, once known
    fn duration(&self) -> Option<f64>;

    /// True once playback has run to the end of the clip
    fn has_ended(&self) -> bool;
}

/// Simulated playback clock for hosts without an audio device.
///
/// Position advances with wall time from `play_from_start` until `duration`
/// is reached. Nothing is decoded or output.
#[derive(Debug, Default)]
pub struct WallClockAudio {
    source: Option<AudioClip>,
    duration: Option<f64>,
    started_at: Option<Instant>,
    paused_position: f64,
}

impl WallClockAudio {
    /// Creates a clock that stops after `duration` seconds
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn elapsed(&self) -> f64 {
        let elapsed = self
            .started_at
            .map_or(self.paused_position, |start| start.elapsed().as_secs_f64());
        match self.duration {
            Some(duration) => elapsed.min(duration),
            None => elapsed,
        }
    }
}

impl AudioOutput for WallClockAudio {
    fn set_source(&mut self, source: Option<AudioClip>) {
        self.source = source;
        self.started_at = None;
        self.paused_position = 0.0;
    }

    fn has_source(&self) -> bool {
        self.source.is_some()
    }

    fn play_from_start(&mut self) -> Result<(), PlaybackError> {
        let source = self.source.as_ref().ok_or(PlaybackError::NoSource)?;
        if source.data.is_empty() {
            return Err(PlaybackError::Decode(format!(
                "{} contains no audio data",
                source.file_name
            )));
        }
        self.paused_position = 0.0;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        self.paused_position = self.elapsed();
        self.started_at = None;
    }

    fn current_time(&self) -> f64 {
        self.elapsed()
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn has_ended(&self) -> bool {
        match self.duration {
            Some(duration) => self.is_running() && self.elapsed() >= duration,
            None => false,
        }
    }
}
