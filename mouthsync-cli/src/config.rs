//! Player configuration file

use anyhow::{Context, Result};
use mouthsync_client::ClientConfig;
use mouthsync_core::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings read from `--config`; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Backend endpoints
    pub api: ClientConfig,
    /// Directory holding the mouth images
    pub assets_dir: PathBuf,
    pub language: Language,
    /// Simulated display refresh rate for `play`
    pub frame_rate: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            api: ClientConfig::default(),
            assets_dir: PathBuf::from("static/images"),
            language: Language::default(),
            frame_rate: 60.0,
        }
    }
}

impl PlayerConfig {
    /// Reads a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        frame_period(self.frame_rate)?;
        Ok(())
    }
}

/// Time between two simulated display frames.
///
/// Rejects rates whose period is zero or too long to represent.
pub fn frame_period(frame_rate: f64) -> Result<Duration> {
    if !(frame_rate.is_finite() && frame_rate > 0.0) {
        anyhow::bail!("frame rate must be positive, got {}", frame_rate);
    }
    match Duration::try_from_secs_f64(1.0 / frame_rate) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => anyhow::bail!("frame rate {} is out of range", frame_rate),
    }
}
