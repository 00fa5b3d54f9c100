use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::errors::{MergeError, MergeResult};

// @module: SubRip parsing and serialization

// @const: SRT timing line regex, tolerant of '.' as millisecond separator
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timestamp regex is valid")
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Move both timestamps later by `offset_ms`.
    ///
    /// Returns `None`, leaving the entry untouched, if either end would overflow.
    pub fn shift(&mut self, offset_ms: u64) -> Option<()> {
        let start_time_ms = self.start_time_ms.checked_add(offset_ms)?;
        let end_time_ms = self.end_time_ms.checked_add(offset_ms)?;
        self.start_time_ms = start_time_ms;
        self.end_time_ms = end_time_ms;
        Some(())
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

fn components_to_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Result<u64, String> {
    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err("Invalid time components".to_string());
    }
    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
        .ok_or_else(|| "timestamp out of range".to_string())
}

fn capture_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64, String> {
    let mut values = [0u64; 4];
    for (offset, value) in values.iter_mut().enumerate() {
        let raw = caps.get(start_idx + offset).map_or("", |m| m.as_str());
        *value = raw
            .parse()
            .map_err(|_| format!("timestamp field '{}' out of range", raw))?;
    }
    components_to_ms(values[0], values[1], values[2], values[3])
}

// @enum: Where the parser is inside the current block
enum ParseState {
    Index,
    Timing { seq_num: usize },
    Text { seq_num: usize, start_ms: u64, end_ms: u64, lines: Vec<String> },
}

/// Subtitle entries loaded from (or destined for) one SRT file
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// File the entries were loaded from; for a merged track, the input directory
    pub source_file: PathBuf,

    /// List of subtitle entries, in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create an empty collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Load and parse an SRT file
    pub fn load_srt<P: AsRef<Path>>(path: P) -> MergeResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| MergeError::SubtitleParse {
            path: path.to_path_buf(),
            line: 0,
            reason: format!("cannot read file: {}", e),
        })?;
        let content = String::from_utf8(bytes).map_err(|e| MergeError::SubtitleParse {
            path: path.to_path_buf(),
            line: 0,
            reason: format!("not valid UTF-8: {}", e),
        })?;

        let entries = Self::parse_srt_string(&content, path)?;
        debug!("Loaded {} entries from {:?}", entries.len(), path);

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse SRT content. `origin` is only used for error messages.
    ///
    /// Entries keep their file order; nothing is sorted, dropped or trimmed
    /// apart from a trailing carriage return on each line.
    pub fn parse_srt_string(content: &str, origin: &Path) -> MergeResult<Vec<SubtitleEntry>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let parse_error = |line: usize, reason: String| MergeError::SubtitleParse {
            path: origin.to_path_buf(),
            line,
            reason,
        };

        let mut entries = Vec::new();
        let mut state = ParseState::Index;
        let mut line_count = 0;

        for line in content.lines() {
            line_count += 1;
            let trimmed = line.trim();

            state = match state {
                ParseState::Index => {
                    if trimmed.is_empty() {
                        ParseState::Index
                    } else {
                        let seq_num = trimmed.parse::<usize>().map_err(|_| {
                            parse_error(line_count, format!("expected subtitle index, found '{}'", trimmed))
                        })?;
                        ParseState::Timing { seq_num }
                    }
                }
                ParseState::Timing { seq_num } => {
                    let caps = TIMESTAMP_REGEX.captures(trimmed).ok_or_else(|| {
                        parse_error(line_count, format!("expected timing line for entry {}, found '{}'", seq_num, trimmed))
                    })?;
                    let start_ms = capture_ms(&caps, 1).map_err(|r| parse_error(line_count, r))?;
                    let end_ms = capture_ms(&caps, 5).map_err(|r| parse_error(line_count, r))?;
                    if start_ms > end_ms {
                        return Err(parse_error(
                            line_count,
                            format!("entry {} ends before it starts", seq_num),
                        ));
                    }
                    ParseState::Text { seq_num, start_ms, end_ms, lines: Vec::new() }
                }
                ParseState::Text { seq_num, start_ms, end_ms, mut lines } => {
                    if trimmed.is_empty() {
                        entries.push(SubtitleEntry::new(seq_num, start_ms, end_ms, lines.join("\n")));
                        ParseState::Index
                    } else {
                        lines.push(line.to_string());
                        ParseState::Text { seq_num, start_ms, end_ms, lines }
                    }
                }
            };
        }

        match state {
            ParseState::Index => {}
            ParseState::Timing { seq_num } => {
                return Err(parse_error(
                    line_count,
                    format!("entry {} has no timing line", seq_num),
                ));
            }
            ParseState::Text { seq_num, start_ms, end_ms, lines } => {
                entries.push(SubtitleEntry::new(seq_num, start_ms, end_ms, lines.join("\n")));
            }
        }

        if entries.is_empty() {
            warn!("No subtitle entries found in {:?}", origin);
        }

        Ok(entries)
    }

    /// Shift every entry later by `offset_ms`
    pub fn shift(&mut self, offset_ms: u64) -> MergeResult<()> {
        for entry in self.entries.iter_mut() {
            entry.shift(offset_ms).ok_or_else(|| MergeError::SubtitleParse {
                path: self.source_file.clone(),
                line: 0,
                reason: format!("entry {} shifted by {} ms is out of range", entry.seq_num, offset_ms),
            })?;
        }
        Ok(())
    }

    /// Renumber entries sequentially from 1 in their current order
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }
    }

    /// Serialize all entries in SRT format
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write subtitles to an SRT file as UTF-8.
    ///
    /// The content lands in a temporary file next to `path` and is renamed
    /// into place at the end, so a failed write leaves no output behind.
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> MergeResult<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if !parent.is_dir() {
            return Err(MergeError::write(path, format!("directory {:?} does not exist", parent)));
        }

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| MergeError::write(path, e))?;
        temp.write_all(self.to_srt_string().as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| MergeError::write(path, e))?;
        temp.persist(path).map_err(|e| MergeError::write(path, e.error))?;

        Ok(())
    }
}
