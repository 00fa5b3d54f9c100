/*!
 * Video duration probing.
 *
 * Durations come from `ffprobe`, one process per video. The trait exists so
 * the merger can be driven by a deterministic source in tests.
 */

use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::app_config::Config;
use crate::errors::{MergeError, MergeResult};

/// Source of media durations in milliseconds
#[async_trait]
pub trait DurationProber: Send + Sync {
    /// Playback duration of the media file at `path`
    async fn duration_ms(&self, path: &Path) -> MergeResult<u64>;
}

/// Prober backed by the `ffprobe` command line tool
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    /// Executable to run
    ffprobe_path: String,
    /// Upper bound per invocation; `None` waits forever
    timeout: Option<Duration>,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ffprobe_path.clone(), config.probe_timeout())
    }

    /// Turn ffprobe's `format=duration` output into milliseconds.
    ///
    /// Fractional milliseconds are truncated.
    pub fn parse_duration_output(path: &Path, stdout: &str) -> MergeResult<u64> {
        let trimmed = stdout.trim();
        let seconds: f64 = trimmed.parse().map_err(|_| {
            MergeError::probe(path, format!("unparsable duration output '{}'", trimmed))
        })?;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(MergeError::probe(path, format!("invalid duration '{}'", trimmed)));
        }

        Ok((seconds * 1000.0) as u64)
    }
}

#[async_trait]
impl DurationProber for FfprobeProber {
    async fn duration_ms(&self, path: &Path) -> MergeResult<u64> {
        debug!("Probing duration of {:?} with {}", path, self.ffprobe_path);

        let ffprobe_future = Command::new(&self.ffprobe_path)
            .args([
                "-v", "error",
                "-show_entries", "format=duration",
                "-of", "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(timeout_duration) => tokio::select! {
                result = ffprobe_future => result,
                _ = tokio::time::sleep(timeout_duration) => {
                    return Err(MergeError::probe(
                        path,
                        format!("{} timed out after {} seconds", self.ffprobe_path, timeout_duration.as_secs()),
                    ));
                }
            },
            None => ffprobe_future.await,
        }
        .map_err(|e| MergeError::probe(path, format!("failed to execute {}: {}", self.ffprobe_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed for {:?}: {}", path, stderr.trim());
            return Err(MergeError::probe(
                path,
                format!("{} exited with {}: {}", self.ffprobe_path, output.status, stderr.trim()),
            ));
        }

        let duration_ms = Self::parse_duration_output(path, &String::from_utf8_lossy(&output.stdout))?;
        debug!("Duration of {:?}: {} ms", path, duration_ms);

        Ok(duration_ms)
    }
}
