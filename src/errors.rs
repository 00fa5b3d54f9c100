/*!
 * Error types for the srtmerge application.
 *
 * Every failure aborts the merge; nothing is retried or skipped, because a
 * missing duration would shift every later timestamp by the wrong amount.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while pairing, probing, merging or writing subtitles
#[derive(Error, Debug)]
pub enum MergeError {
    /// Input directory is missing or unreadable
    #[error("Directory error: {}: {reason}", path.display())]
    Directory {
        /// Directory that could not be listed
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// No subtitle/video pairs were found
    #[error("No subtitle/video pairs found in {}", .0.display())]
    EmptyInput(PathBuf),

    /// The external duration query failed or returned garbage
    #[error("Probe failed for {}: {reason}", path.display())]
    Probe {
        /// Video file being probed
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A subtitle file could not be parsed
    #[error("Subtitle parse error in {} (line {line}): {reason}", path.display())]
    SubtitleParse {
        /// Offending subtitle file
        path: PathBuf,
        /// 1-based line number where parsing failed
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// The merged output could not be written
    #[error("Write error for {}: {reason}", path.display())]
    Write {
        /// Destination file
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Configuration file is unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MergeError {
    /// Short name of the failure kind, used for the CLI error line
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Directory { .. } => "directory not found",
            Self::EmptyInput(_) => "no pairs found",
            Self::Probe { .. } => "probe failure",
            Self::SubtitleParse { .. } => "parse failure",
            Self::Write { .. } => "write failure",
            Self::Config(_) => "configuration failure",
        }
    }

    pub(crate) fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Probe { path: path.into(), reason: reason.into() }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write { path: path.into(), reason: reason.to_string() }
    }
}

/// Result alias used across the library
pub type MergeResult<T> = std::result::Result<T, MergeError>;
