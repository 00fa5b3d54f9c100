use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;
use log::{debug, warn};

use crate::errors::{MergeError, MergeResult};

// @module: Directory scanning, numeric pairing and natural ordering

// @const: Digit run at the very start of a filename
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)").expect("leading number regex is valid")
});

// @const: Digit run right before the extension, or at the end
static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)(?:\.[^.]+)?$").expect("trailing number regex is valid")
});

/// A subtitle file and the video it was recorded alongside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPair {
    /// Number shared by both filenames
    pub numeric_key: u64,
    /// Path of the SRT file
    pub subtitle_path: PathBuf,
    /// Path of the video with the same stem
    pub video_path: PathBuf,
}

impl fmt::Display for MediaPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} + {}", self.numeric_key, self.subtitle_path.display(), self.video_path.display())
    }
}

/// Extract the numeric token of a filename.
///
/// A leading digit run wins; otherwise the digit run right before the
/// extension (or at the end when there is none) is used.
pub fn extract_number(file_name: &str) -> Option<u64> {
    let digits = LEADING_NUMBER
        .captures(file_name)
        .or_else(|| TRAILING_NUMBER.captures(file_name))
        .and_then(|caps| caps.get(1))?
        .as_str();

    match digits.parse::<u64>() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!("Ignoring {}: number {} is too large", file_name, digits);
            None
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension.trim_start_matches('.')))
        .unwrap_or(false)
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    /// List regular files directly inside `dir`, sorted by name
    pub fn list_files<P: AsRef<Path>>(dir: P) -> MergeResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let directory_error = |reason: String| MergeError::Directory {
            path: dir.to_path_buf(),
            reason,
        };

        if !Self::dir_exists(dir) {
            return Err(directory_error("does not exist or is not a directory".to_string()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| directory_error(e.to_string()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Pair every numbered subtitle in `dir` with the video sharing its stem.
    ///
    /// Subtitles without a number or without a video sibling are skipped.
    /// Pairs come back in filename order; see [`FileManager::sequence_pairs`].
    pub fn find_pairs<P: AsRef<Path>>(
        dir: P,
        subtitle_extension: &str,
        video_extension: &str,
    ) -> MergeResult<Vec<MediaPair>> {
        let files = Self::list_files(dir)?;

        let mut videos_by_stem: HashMap<String, PathBuf> = HashMap::new();
        for path in files.iter().filter(|p| has_extension(p, video_extension)) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                videos_by_stem.entry(stem.to_string()).or_insert_with(|| path.clone());
            }
        }

        let mut pairs = Vec::new();
        for path in files.iter().filter(|p| has_extension(p, subtitle_extension)) {
            let (Some(file_name), Some(stem)) = (
                path.file_name().and_then(|s| s.to_str()),
                path.file_stem().and_then(|s| s.to_str()),
            ) else {
                debug!("Skipping non UTF-8 filename {:?}", path);
                continue;
            };

            let Some(numeric_key) = extract_number(file_name) else {
                debug!("Skipping {}: no number in filename", file_name);
                continue;
            };

            match videos_by_stem.get(stem) {
                Some(video_path) => pairs.push(MediaPair {
                    numeric_key,
                    subtitle_path: path.clone(),
                    video_path: video_path.clone(),
                }),
                None => debug!("Skipping {}: no matching .{} file", file_name, video_extension),
            }
        }

        Ok(pairs)
    }

    /// Order pairs by their numeric key (9 before 10).
    ///
    /// The sort is stable: pairs sharing a key keep their input order.
    pub fn sequence_pairs(mut pairs: Vec<MediaPair>) -> Vec<MediaPair> {
        pairs.sort_by_key(|pair| pair.numeric_key);

        for window in pairs.windows(2) {
            if window[0].numeric_key == window[1].numeric_key {
                warn!(
                    "Duplicate number {} for {:?} and {:?}; keeping directory order",
                    window[0].numeric_key, window[0].subtitle_path, window[1].subtitle_path
                );
            }
        }

        pairs
    }
}
