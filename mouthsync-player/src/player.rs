//! The player controller: one explicit session object tying the pieces together

use crate::{
    AssetCatalog, AudioOutput, AvatarRenderer, DisplayedImage, FrameHandle, FrameScheduler,
    PlaybackDriver, PlaybackError, Result, TimelineStore,
};
use mouthsync_client::{ClientError, ExampleSource, GenerateRequest, VisemeService};
use mouthsync_core::{AudioClip, Language, MouthMapping, Timeline};

/// User-facing outcome of the latest processing or example request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Processing,
    /// Timeline ready; carries the response summary
    Ready(String),
    Failed(String),
}

/// Lip-sync player session.
///
/// Owns the timeline store, the playback driver and the avatar renderer and
/// passes them to one another by reference. Hosts forward user input and
/// frame callbacks to it.
#[derive(Debug)]
pub struct Player<A, S> {
    store: TimelineStore,
    driver: PlaybackDriver<A, S>,
    renderer: AvatarRenderer,
    language: Language,
    transcript: String,
    audio: Option<AudioClip>,
    status: Status,
}

impl<A: AudioOutput, S: FrameScheduler> Player<A, S> {
    /// Creates a player and preloads the neutral mouth image
    pub fn new(audio: A, scheduler: S, catalog: AssetCatalog, language: Language) -> Self {
        let mut renderer = AvatarRenderer::new(catalog);
        renderer.preload_default();
        Self {
            store: TimelineStore::new(),
            driver: PlaybackDriver::new(audio, scheduler),
            renderer,
            language,
            transcript: String::new(),
            audio: None,
            status: Status::Idle,
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn audio(&self) -> Option<&AudioClip> {
        self.audio.as_ref()
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.store.get()
    }

    pub fn displayed(&self) -> &DisplayedImage {
        self.renderer.displayed()
    }

    pub fn renderer(&self) -> &AvatarRenderer {
        &self.renderer
    }

    pub fn driver(&self) -> &PlaybackDriver<A, S> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut PlaybackDriver<A, S> {
        &mut self.driver
    }

    pub fn is_playing(&self) -> bool {
        self.driver.is_playing()
    }

    pub fn progress(&self) -> Option<f64> {
        self.driver.progress()
    }

    /// Mapping table for the current language, looked up on every frame
    pub fn mapping(&self) -> MouthMapping {
        MouthMapping::for_language(self.language)
    }

    /// Audio and a non-blank transcript are present
    pub fn can_process(&self) -> bool {
        self.audio.is_some() && !self.transcript.trim().is_empty()
    }

    /// A timeline and its audio are present
    pub fn can_play(&self) -> bool {
        self.store.is_loaded() && self.audio.is_some()
    }

    /// Replaces the audio clip; stops playback and discards the timeline
    pub fn select_audio(&mut self, clip: Option<AudioClip>) {
        if let Some(clip) = &clip {
            tracing::info!(file = %clip.file_name, bytes = clip.data_size(), "audio selected");
        }
        self.driver.load_source(clip.clone(), &mut self.renderer);
        self.audio = clip;
        self.store.clear();
        self.status = Status::Idle;
    }

    /// Replaces the transcript; a changed transcript discards the timeline
    pub fn set_transcript(&mut self, transcript: impl Into<String>) {
        let transcript = transcript.into();
        if transcript != self.transcript {
            self.transcript = transcript;
            self.discard_timeline();
        }
    }

    /// Switches language; a changed language discards the timeline
    pub fn set_language(&mut self, language: Language) {
        if language != self.language {
            tracing::info!(%language, "language changed");
            self.language = language;
            self.discard_timeline();
        }
    }

    fn discard_timeline(&mut self) {
        self.driver.stop(&mut self.renderer);
        self.store.clear();
        self.status = Status::Idle;
    }

    /// Submits the current audio and transcript and installs the resulting timeline.
    ///
    /// Missing input fails with [`ClientError::InputIncomplete`] before any
    /// request is made. Any other failure is recorded in [`Player::status`]
    /// and leaves the player ready to retry.
    pub async fn process<V>(&mut self, service: &V) -> Result<()>
    where
        V: VisemeService + ?Sized,
    {
        let (Some(audio), false) = (self.audio.clone(), self.transcript.trim().is_empty()) else {
            return Err(ClientError::InputIncomplete.into());
        };

        self.discard_timeline();
        self.status = Status::Processing;

        let outcome = match GenerateRequest::new(audio, &self.transcript, Some(self.language)) {
            Ok(request) => service.generate(&request).await,
            Err(e) => Err(e),
        };

        let installed = outcome.and_then(|response| {
            let summary = response.summary();
            let timeline = response.into_timeline()?;
            Ok((summary, timeline))
        });

        match installed {
            Ok((summary, timeline)) => {
                tracing::info!(%summary, "processing succeeded");
                self.install_timeline(timeline, summary);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "processing failed");
                self.status = Status::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Installs an already validated timeline for the current audio, e.g. one
    /// saved from an earlier run, and preloads every mouth image
    pub fn install_timeline(&mut self, timeline: Timeline, summary: String) {
        self.driver.stop(&mut self.renderer);
        self.store.set(timeline);
        let cached = self.renderer.preload_all();
        tracing::debug!(cached_images = cached, "mouth images preloaded");
        self.status = Status::Ready(summary);
    }

    /// Loads the example transcript and recording for the current language
    pub async fn load_example<E>(&mut self, source: &E) -> Result<()>
    where
        E: ExampleSource + ?Sized,
    {
        let fetched = match source.example_text(self.language).await {
            Ok(text) => source
                .example_audio(self.language)
                .await
                .map(|clip| (text, clip)),
            Err(e) => Err(e),
        };

        match fetched {
            Ok((text, clip)) => {
                self.select_audio(Some(clip));
                self.transcript = text;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load example");
                self.status = Status::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Starts playback; see [`PlaybackDriver::start`]
    pub fn start(&mut self) -> std::result::Result<bool, PlaybackError> {
        self.driver.start(&self.store, &mut self.renderer)
    }

    pub fn stop(&mut self) -> bool {
        self.driver.stop(&mut self.renderer)
    }

    /// Play button: stops when playing, starts otherwise
    pub fn toggle_playback(&mut self) -> std::result::Result<bool, PlaybackError> {
        if self.is_playing() {
            self.stop();
            Ok(false)
        } else {
            self.start()
        }
    }

    /// Delivers a frame callback requested through the scheduler
    pub fn on_frame(&mut self, handle: FrameHandle) {
        let mapping = self.mapping();
        self.driver
            .tick(handle, &self.store, &mut self.renderer, &mapping);
    }

    /// Audio-end signal from the host
    pub fn on_audio_ended(&mut self) {
        self.driver.handle_audio_ended(&mut self.renderer);
    }
}
