//! Holds the timeline for the currently loaded audio

use mouthsync_core::Timeline;

/// The timeline of the current audio and transcript, if processed.
///
/// Every change bumps [`TimelineStore::generation`], which lets an active
/// playback session notice that its timeline was replaced.
#[derive(Debug, Default)]
pub struct TimelineStore {
    current: Option<Timeline>,
    generation: u64,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, timeline: Timeline) {
        tracing::debug!(intervals = timeline.len(), "timeline stored");
        self.current = Some(timeline);
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("timeline discarded");
        }
        self.generation += 1;
    }

    pub fn get(&self) -> Option<&Timeline> {
        self.current.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
