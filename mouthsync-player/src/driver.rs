//! Playback driver: Stopped/Playing state machine and the per-frame loop

use crate::{AudioOutput, AvatarRenderer, FrameHandle, FrameScheduler, PlaybackError, TimelineStore};
use mouthsync_core::{resolve, AudioClip, MouthMapping};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// State of one play-through; exists only while playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlaybackSession {
    last_resolved_index: Option<usize>,
    /// Store generation the resolved index refers to
    generation: u64,
}

/// Owns the audio handle and the frame loop
#[derive(Debug)]
pub struct PlaybackDriver<A, S> {
    audio: A,
    scheduler: S,
    state: PlaybackState,
    session: Option<PlaybackSession>,
    pending_frame: Option<FrameHandle>,
}

impl<A: AudioOutput, S: FrameScheduler> PlaybackDriver<A, S> {
    /// Creates a stopped driver
    pub fn new(audio: A, scheduler: S) -> Self {
        Self {
            audio,
            scheduler,
            state: PlaybackState::Stopped,
            session: None,
            pending_frame: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Index resolved on the latest frame of the current session
    pub fn last_resolved_index(&self) -> Option<usize> {
        self.session.and_then(|session| session.last_resolved_index)
    }

    /// The frame the loop is waiting for, if any
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Replaces the audio source, stopping playback first
    pub fn load_source(&mut self, source: Option<AudioClip>, renderer: &mut AvatarRenderer) {
        self.stop(renderer);
        self.audio.set_source(source);
    }

    /// Starts playback from time zero.
    ///
    /// Returns `Ok(false)` without doing anything when already playing or when
    /// the timeline or the audio source is missing. A failure from the audio
    /// subsystem leaves the driver stopped with no frame pending.
    pub fn start(
        &mut self,
        store: &TimelineStore,
        renderer: &mut AvatarRenderer,
    ) -> Result<bool, PlaybackError> {
        if self.is_playing() || store.get().is_none() || !self.audio.has_source() {
            return Ok(false);
        }

        self.state = PlaybackState::Playing;
        self.session = Some(PlaybackSession {
            last_resolved_index: None,
            generation: store.generation(),
        });
        renderer.show_default();

        if let Err(e) = self.audio.play_from_start() {
            tracing::warn!(error = %e, "audio playback failed to start");
            self.stop(renderer);
            return Err(e);
        }

        self.pending_frame = Some(self.scheduler.request_frame());
        tracing::info!("playback started");
        Ok(true)
    }

    /// Stops playback. The pending frame is cancelled before this returns.
    ///
    /// Returns `false` when already stopped.
    pub fn stop(&mut self, renderer: &mut AvatarRenderer) -> bool {
        if !self.is_playing() {
            return false;
        }

        self.state = PlaybackState::Stopped;
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.session = None;
        self.audio.pause();
        renderer.show_default();

        tracing::info!("playback stopped");
        true
    }

    /// Audio-end signal from the host
    pub fn handle_audio_ended(&mut self, renderer: &mut AvatarRenderer) {
        if self.stop(renderer) {
            tracing::debug!("audio reached its end");
        }
    }

    /// Runs one frame of the loop.
    ///
    /// Frames delivered while stopped, or with a handle other than the pending
    /// one, are ignored and never re-arm the loop.
    pub fn tick(
        &mut self,
        handle: FrameHandle,
        store: &TimelineStore,
        renderer: &mut AvatarRenderer,
        mapping: &MouthMapping,
    ) {
        if !self.is_playing() || self.pending_frame != Some(handle) {
            tracing::trace!(?handle, "stale frame ignored");
            return;
        }
        self.pending_frame = None;

        let Some(timeline) = store.get() else {
            self.stop(renderer);
            return;
        };

        let time = self.audio.current_time();
        if let Some(session) = self.session.as_mut() {
            if session.generation != store.generation() {
                session.last_resolved_index = None;
                session.generation = store.generation();
            }

            if let Some(index) = resolve(timeline, time) {
                if session.last_resolved_index != Some(index) {
                    if let Some(interval) = timeline.get(index) {
                        tracing::trace!(index, time, phoneme = %interval.phoneme, "viseme change");
                        renderer.render(interval.viseme, mapping);
                    }
                    session.last_resolved_index = Some(index);
                }
            }
        }

        if self.audio.has_ended() {
            self.handle_audio_ended(renderer);
            return;
        }

        if self.is_playing() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    /// Playback position as a fraction of the clip, once the duration is known
    pub fn progress(&self) -> Option<f64> {
        let duration = self.audio.duration().filter(|duration| *duration > 0.0)?;
        Some((self.audio.current_time() / duration).clamp(0.0, 1.0))
    }
}
