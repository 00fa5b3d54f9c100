use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration module
/// This module handles loading and validating the merge settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Extension of the subtitle chunks
    #[serde(default = "default_subtitle_extension")]
    pub subtitle_extension: String,

    /// Extension of the video chunks paired with them
    #[serde(default = "default_video_extension")]
    pub video_extension: String,

    /// ffprobe executable, looked up on PATH unless absolute
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Seconds to wait for each ffprobe call; 0 disables the limit
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Draw a progress bar while merging
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_subtitle_extension() -> String {
    "srt".to_string()
}

fn default_video_extension() -> String {
    // Recording devices this tool targets split into .mov chunks
    "mov".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    60
}

fn default_show_progress() -> bool {
    true
}

impl Config {
    /// Load a configuration file.
    ///
    /// A missing file is only an error when `required` is set; otherwise the
    /// defaults are returned.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            if required {
                return Err(anyhow!("Config file not found: {:?}", path));
            }
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let subtitle_ext = self.subtitle_extension.trim_start_matches('.');
        let video_ext = self.video_extension.trim_start_matches('.');

        if subtitle_ext.is_empty() {
            return Err(anyhow!("Subtitle extension must not be empty"));
        }
        if video_ext.is_empty() {
            return Err(anyhow!("Video extension must not be empty"));
        }
        if subtitle_ext.eq_ignore_ascii_case(video_ext) {
            return Err(anyhow!(
                "Subtitle and video extensions must differ (both are '{}')",
                subtitle_ext
            ));
        }
        if self.ffprobe_path.trim().is_empty() {
            return Err(anyhow!("ffprobe path must not be empty"));
        }

        Ok(())
    }

    /// Per-call probe timeout, `None` when disabled
    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_secs > 0).then(|| Duration::from_secs(self.probe_timeout_secs))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            subtitle_extension: default_subtitle_extension(),
            video_extension: default_video_extension(),
            ffprobe_path: default_ffprobe_path(),
            probe_timeout_secs: default_probe_timeout_secs(),
            show_progress: default_show_progress(),
            log_level: LogLevel::default(),
        }
    }
}
