//! mouthsync CLI Tool
//!
//! Command-line interface for generating viseme timelines and playing them
//! back against a simulated display clock.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{frame_period, PlayerConfig};
use mouthsync_client::{GenerateRequest, VisemeClient};
use mouthsync_core::{
    resolve, AudioClip, Language, MouthMapping, ProcessingResponse, Timeline, VisemeCategory,
    VisemeInterval,
};
use mouthsync_player::{AssetCatalog, ManualScheduler, Player, WallClockAudio};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mouthsync")]
#[command(about = "mouthsync - lip-sync avatar timelines from audio and transcript")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory holding the mouth images
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    /// Transcript language (vi, en)
    #[arg(short, long, global = true)]
    language: Option<Language>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit audio and transcript for viseme generation
    Process {
        /// Input audio file
        audio: PathBuf,

        /// Transcript text
        #[arg(short, long, conflicts_with = "transcript_file")]
        transcript: Option<String>,

        /// Read the transcript from a file
        #[arg(long)]
        transcript_file: Option<PathBuf>,

        /// Save the backend response as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a saved timeline and show its contents
    Inspect {
        /// Saved response or bare interval array
        timeline: PathBuf,
    },

    /// Show which viseme is active at a playback time
    Resolve {
        timeline: PathBuf,

        /// Playback time in seconds
        #[arg(short, long, allow_hyphen_values = true)]
        time: f64,
    },

    /// Play a timeline against a simulated clock, printing every mouth swap
    Play {
        /// Audio file the timeline belongs to
        audio: PathBuf,

        timeline: PathBuf,

        /// Playback length in seconds (defaults to the timeline end)
        #[arg(long)]
        duration: Option<f64>,

        /// Simulated display refresh rate
        #[arg(long)]
        frame_rate: Option<f64>,
    },

    /// Download the example transcript and audio
    Example {
        /// Directory to write the files into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Query backend health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.quiet);

    let config = load_config(&cli.global)?;

    match cli.command {
        Commands::Process {
            audio,
            transcript,
            transcript_file,
            output,
        } => {
            let transcript = read_transcript(transcript, transcript_file)?;
            process_audio(&config, &audio, &transcript, output).await?
        }

        Commands::Inspect { timeline } => inspect_timeline(&timeline)?,

        Commands::Resolve { timeline, time } => resolve_time(&config, &timeline, time)?,

        Commands::Play {
            audio,
            timeline,
            duration,
            frame_rate,
        } => {
            let frame_rate = frame_rate.unwrap_or(config.frame_rate);
            play_timeline(&config, &audio, &timeline, duration, frame_rate).await?
        }

        Commands::Example { output_dir } => fetch_example(&config, &output_dir).await?,

        Commands::Health => check_health(&config).await?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(global: &GlobalArgs) -> Result<PlayerConfig> {
    let mut config = match &global.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };

    if let Some(base_url) = &global.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(assets_dir) = &global.assets_dir {
        config.assets_dir = assets_dir.clone();
    }
    if let Some(language) = global.language {
        config.language = language;
    }

    config.validate()?;
    Ok(config)
}

fn read_transcript(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    let transcript = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read transcript {}", path.display()))?,
        (None, None) => anyhow::bail!("A transcript is required (--transcript or --transcript-file)"),
    };
    Ok(transcript)
}

/// Reads either a saved backend response or a bare array of intervals
fn read_timeline(path: &Path) -> Result<(Timeline, Option<ProcessingResponse>)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read timeline {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).context("Timeline file is not valid JSON")?;

    if value.is_array() {
        let intervals: Vec<VisemeInterval> =
            serde_json::from_value(value).context("Failed to parse viseme intervals")?;
        let timeline = Timeline::new(intervals).context("Invalid timeline")?;
        Ok((timeline, None))
    } else {
        let response: ProcessingResponse =
            serde_json::from_value(value).context("Failed to parse backend response")?;
        let timeline = response.to_timeline().context("Invalid timeline")?;
        Ok((timeline, Some(response)))
    }
}

async fn process_audio(
    config: &PlayerConfig,
    audio: &Path,
    transcript: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("Processing audio: {}", audio.display());

    let clip = AudioClip::from_path(audio)
        .with_context(|| format!("Failed to read audio file {}", audio.display()))?;
    let request = GenerateRequest::new(clip, transcript, Some(config.language))
        .context("Audio and transcript are both required")?;

    let client = VisemeClient::new(config.api.clone()).context("Failed to create client")?;
    info!(base_url = %config.api.base_url, language = %config.language, "submitting audio");
    let response = match client.generate(&request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "viseme generation failed");
            return Err(e).context("Viseme generation failed");
        }
    };

    let timeline = response
        .to_timeline()
        .context("Backend returned an invalid timeline")?;
    println!("Success: {}", response.summary());

    if let Some(output) = output {
        let file = File::create(&output).context("Failed to create output file")?;
        serde_json::to_writer_pretty(BufWriter::new(file), &response)
            .context("Failed to write response")?;
        println!("Saved {} intervals to {}", timeline.len(), output.display());
    } else {
        print_intervals(&timeline, 10);
    }

    Ok(())
}

fn inspect_timeline(path: &Path) -> Result<()> {
    let (timeline, response) = read_timeline(path)?;

    println!("\n=== Timeline Information ===");
    println!("Intervals: {}", timeline.len());
    println!("End time: {:.3} s", timeline.duration());
    println!("Voiced duration: {:.3} s", timeline.voiced_duration());
    if let Some(response) = &response {
        if let Some(request_id) = &response.request_id {
            println!("Request: {}", request_id);
        }
        if let Some(transcript) = &response.transcript {
            println!("Transcript: {}", transcript);
        }
        if let Some(processing_time) = response.processing_time {
            println!("Processing time: {:.3} s", processing_time);
        }
    }

    println!("\n=== Viseme counts ===");
    for (viseme, count) in timeline.statistics() {
        let name = VisemeCategory::from_id(viseme)
            .map(|category| format!("{:?}", category))
            .unwrap_or_else(|| "unknown".to_string());
        println!("  {:>3} {:<18} {}", viseme, name, count);
    }

    print_intervals(&timeline, 10);
    Ok(())
}

fn print_intervals(timeline: &Timeline, limit: usize) {
    println!("\n=== Intervals (first {} entries) ===", limit);
    for (i, interval) in timeline.iter().take(limit).enumerate() {
        println!(
            "  [{}] viseme {} '{}' from {:.3}s to {:.3}s",
            i, interval.viseme, interval.phoneme, interval.start, interval.end
        );
    }
    if timeline.len() > limit {
        println!("  ... and {} more entries", timeline.len() - limit);
    }
}

fn resolve_time(config: &PlayerConfig, path: &Path, time: f64) -> Result<()> {
    let (timeline, _) = read_timeline(path)?;
    let mapping = MouthMapping::for_language(config.language);

    match resolve(&timeline, time) {
        Some(index) => {
            let interval = timeline
                .get(index)
                .context("Resolved index outside the timeline")?;
            println!(
                "{:.3}s -> [{}] viseme {} '{}' -> {}",
                time,
                index,
                interval.viseme,
                interval.phoneme,
                mapping.shape_for_id(interval.viseme)
            );
        }
        None => println!("{:.3}s -> none (default mouth)", time),
    }

    Ok(())
}

async fn play_timeline(
    config: &PlayerConfig,
    audio: &Path,
    timeline_path: &Path,
    duration: Option<f64>,
    frame_rate: f64,
) -> Result<()> {
    let period = frame_period(frame_rate)?;
    if let Some(duration) = duration {
        check_duration(duration)?;
    }

    let (timeline, response) = read_timeline(timeline_path)?;
    let clip = AudioClip::from_path(audio)
        .with_context(|| format!("Failed to read audio file {}", audio.display()))?;
    let duration = duration.unwrap_or_else(|| timeline.duration());
    let summary = response
        .map(|response| response.summary())
        .unwrap_or_else(|| format!("{} visemes", timeline.len()));

    let mut player = Player::new(
        WallClockAudio::new(Some(duration)),
        ManualScheduler::new(),
        AssetCatalog::new(&config.assets_dir),
        config.language,
    );
    player.select_audio(Some(clip));
    player.install_timeline(timeline, summary);

    println!(
        "Playing {:.2}s at {} fps ({} mapping)",
        duration, frame_rate, config.language
    );
    if let Err(e) = player.start() {
        warn!(error = %e, "playback failed to start");
        return Err(e).context("Playback failed to start");
    }
    info!(intervals = player.timeline().map_or(0, Timeline::len), "playback started");

    let mut ticker = tokio::time::interval(period);
    let mut shown = player.displayed().shape();
    let mut frames = 0u64;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let interrupted = loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => break true,
        }

        for handle in player.driver_mut().scheduler_mut().take_due() {
            player.on_frame(handle);
            frames += 1;
        }

        let current = player.displayed().shape();
        if current != shown {
            let position = player.progress().unwrap_or(0.0) * duration;
            println!("  {:>7.3}s  {}", position, current);
            shown = current;
        }

        if !player.is_playing() {
            break false;
        }
    };

    if interrupted {
        player.stop();
        warn!(frames, "playback interrupted");
        println!("Interrupted");
    }
    println!(
        "Finished after {} frames, {} image swaps",
        frames,
        player.renderer().swap_count()
    );

    Ok(())
}

/// Playback length must be a finite, non-negative number of seconds
fn check_duration(duration: f64) -> Result<()> {
    if !(duration.is_finite() && duration >= 0.0) {
        anyhow::bail!("duration must be a non-negative number of seconds, got {}", duration);
    }
    Ok(())
}

async fn fetch_example(config: &PlayerConfig, output_dir: &Path) -> Result<()> {
    let client = VisemeClient::new(config.api.clone()).context("Failed to create client")?;

    let text = client
        .example_text(config.language)
        .await
        .context("Failed to fetch example text")?;
    let clip = client
        .example_audio(config.language)
        .await
        .context("Failed to fetch example audio")?;

    std::fs::create_dir_all(output_dir).context("Failed to create output directory")?;
    let text_path = output_dir.join(format!("example_{}.txt", config.language));
    std::fs::write(&text_path, &text).context("Failed to write example text")?;
    let audio_path = output_dir.join(&clip.file_name);
    std::fs::write(&audio_path, &clip.data[..]).context("Failed to write example audio")?;

    println!("Transcript: {}", text);
    println!("Saved {} and {}", text_path.display(), audio_path.display());
    Ok(())
}

async fn check_health(config: &PlayerConfig) -> Result<()> {
    let client = VisemeClient::new(config.api.clone()).context("Failed to create client")?;
    let report = match client.health().await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, base_url = %config.api.base_url, "health check failed");
            return Err(e).context("Health check failed");
        }
    };

    println!("Status: {}", report.status);
    if let Some(timestamp) = &report.timestamp {
        println!("Timestamp: {}", timestamp);
    }
    for (component, state) in &report.components {
        println!("  {}: {}", component, state);
    }

    if !report.is_healthy() {
        warn!(status = %report.status, "backend is not healthy");
        anyhow::bail!("backend reports status '{}'", report.status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mouthsync",
            "resolve",
            "timeline.json",
            "--time",
            "0.5",
            "--language",
            "en",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.global.language, Some(Language::En));
        assert_eq!(cli.global.verbose, 2);
        assert!(matches!(cli.command, Commands::Resolve { time, .. } if time == 0.5));
    }

    #[test]
    fn test_transcript_sources_conflict() {
        let result = Cli::try_parse_from([
            "mouthsync",
            "process",
            "a.wav",
            "--transcript",
            "xin chào",
            "--transcript-file",
            "t.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_timeline_accepts_both_shapes() {
        let dir = tempfile::tempdir().unwrap();

        let bare = dir.path().join("bare.json");
        std::fs::write(
            &bare,
            r#"[{"viseme": 1, "phoneme": "m", "start": 0.0, "end": 0.5}]"#,
        )
        .unwrap();
        let (timeline, response) = read_timeline(&bare).unwrap();
        assert_eq!(timeline.len(), 1);
        assert!(response.is_none());

        let full = dir.path().join("full.json");
        std::fs::write(
            &full,
            r#"{"viseme_timeline": [{"viseme": 1, "phoneme": "m", "start": 0.0, "end": 0.5}],
                "metadata": {"total_duration": 0.5}, "request_id": "r1"}"#,
        )
        .unwrap();
        let (timeline, response) = read_timeline(&full).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(response.unwrap().request_id.as_deref(), Some("r1"));
    }

    #[test]
    fn test_read_timeline_rejects_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"[{"viseme": 1, "start": 0.0, "end": 0.5}, {"viseme": 2, "start": 0.4, "end": 0.9}]"#,
        )
        .unwrap();
        let err = read_timeline(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("overlaps"));
    }

    #[test]
    fn test_duration_must_be_finite() {
        assert!(check_duration(0.0).is_ok());
        assert!(check_duration(2.5).is_ok());
        assert!(check_duration(f64::NAN).is_err());
        assert!(check_duration(f64::INFINITY).is_err());
        assert!(check_duration(-1.0).is_err());
    }

    #[tokio::test]
    async fn test_play_rejects_out_of_range_settings() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("a.wav");
        std::fs::write(&audio, [0u8; 16]).unwrap();
        let timeline = dir.path().join("t.json");
        std::fs::write(&timeline, r#"[{"viseme": 1, "start": 0.0, "end": 0.05}]"#).unwrap();
        let config = PlayerConfig {
            assets_dir: dir.path().to_path_buf(),
            ..PlayerConfig::default()
        };

        let err = play_timeline(&config, &audio, &timeline, Some(0.05), 1e10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = play_timeline(&config, &audio, &timeline, Some(f64::NAN), 60.0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[tokio::test]
    async fn test_play_runs_to_duration() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("a.wav");
        std::fs::write(&audio, [0u8; 16]).unwrap();
        let timeline = dir.path().join("t.json");
        std::fs::write(&timeline, r#"[{"viseme": 1, "start": 0.0, "end": 0.05}]"#).unwrap();
        let config = PlayerConfig {
            assets_dir: dir.path().to_path_buf(),
            ..PlayerConfig::default()
        };

        play_timeline(&config, &audio, &timeline, Some(0.05), 200.0)
            .await
            .unwrap();
    }

    #[test]
    fn test_transcript_required() {
        assert!(read_transcript(None, None).is_err());
        assert_eq!(read_transcript(Some("a".into()), None).unwrap(), "a");
    }
}
