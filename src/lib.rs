/*!
 * # srtmerge - stitch numbered subtitle chunks into one track
 *
 * Cameras and recorders split long takes into numbered chunks, each with a
 * video file and an SRT file whose timestamps restart at zero. This crate
 * pairs those files, orders them numerically and concatenates the
 * subtitles, shifting every chunk by the running total of the preceding
 * video durations (queried with ffprobe).
 *
 * ## Architecture
 *
 * - `file_utils`: pairing subtitles with same-stem videos and ordering them
 * - `media_probe`: video durations via ffprobe behind the `DurationProber` trait
 * - `subtitle_processor`: SRT parsing and serialization
 * - `merger`: cumulative offsets and concatenation
 * - `app_controller`: one end-to-end merge run
 * - `app_config`: configuration management
 * - `errors`: error taxonomy
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod media_probe;
pub mod merger;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{MergeError, MergeResult};
pub use file_utils::{extract_number, FileManager, MediaPair};
pub use media_probe::{DurationProber, FfprobeProber};
pub use merger::{MergedTrack, SubtitleMerger};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
