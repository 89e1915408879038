//! Test doubles shared by the unit tests

use crate::{AudioOutput, PlaybackError};
use mouthsync_core::{AudioClip, Timeline, VisemeInterval};

/// Audio output whose clock and failures are set by the test
#[derive(Debug, Default)]
pub struct ScriptedAudio {
    pub source: Option<AudioClip>,
    pub time: f64,
    pub duration: Option<f64>,
    pub ended: bool,
    pub playing: bool,
    pub plays: u32,
    pub fail_with: Option<PlaybackError>,
}

impl ScriptedAudio {
    pub fn clip() -> AudioClip {
        AudioClip::new("clip.wav", "audio/wav", vec![0u8; 32])
    }
}

impl AudioOutput for ScriptedAudio {
    fn set_source(&mut self, source: Option<AudioClip>) {
        self.source = source;
        self.playing = false;
        self.time = 0.0;
    }

    fn has_source(&self) -> bool {
        self.source.is_some()
    }

    fn play_from_start(&mut self) -> Result<(), PlaybackError> {
        if let Some(err) = self.fail_with.clone() {
            return Err(err);
        }
        self.time = 0.0;
        self.ended = false;
        self.playing = true;
        self.plays += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn has_ended(&self) -> bool {
        self.ended
    }
}

pub fn timeline(spans: &[(u32, f64, f64)]) -> Timeline {
    Timeline::new(
        spans
            .iter()
            .map(|&(viseme, start, end)| VisemeInterval::new(viseme, "", start, end))
            .collect(),
    )
    .unwrap()
}
