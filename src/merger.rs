use std::path::Path;
use indicatif::ProgressBar;
use log::{debug, info};

use crate::errors::{MergeError, MergeResult};
use crate::file_utils::MediaPair;
use crate::media_probe::DurationProber;
use crate::subtitle_processor::SubtitleCollection;

// @module: Offset accumulation and subtitle concatenation

/// Result of a merge, not yet written anywhere
#[derive(Debug, Clone)]
pub struct MergedTrack {
    /// All entries in playback order, renumbered from 1
    pub subtitles: SubtitleCollection,

    /// Offset applied to each pair, in sequence order
    pub segment_offsets_ms: Vec<u64>,
}

impl MergedTrack {
    /// Number of merged entries
    pub fn len(&self) -> usize {
        self.subtitles.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtitles.entries.is_empty()
    }
}

/// Concatenates the subtitles of sequenced pairs, shifting each file by the
/// summed durations of the videos before it.
pub struct SubtitleMerger<'a> {
    prober: &'a dyn DurationProber,
    progress: Option<ProgressBar>,
}

impl<'a> SubtitleMerger<'a> {
    pub fn new(prober: &'a dyn DurationProber) -> Self {
        Self { prober, progress: None }
    }

    /// Advance `progress` once per merged pair
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Merge `pairs`, which must already be in sequence order.
    ///
    /// File i is shifted by the durations of videos 0..i. The video of the
    /// last pair is never probed. Any probe or parse failure aborts the
    /// whole merge.
    pub async fn merge(&self, source_dir: &Path, pairs: &[MediaPair]) -> MergeResult<MergedTrack> {
        if pairs.is_empty() {
            return Err(MergeError::EmptyInput(source_dir.to_path_buf()));
        }

        let mut merged = SubtitleCollection::new(source_dir.to_path_buf());
        let mut segment_offsets_ms = Vec::with_capacity(pairs.len());
        let mut cumulative_offset_ms: u64 = 0;

        for (idx, pair) in pairs.iter().enumerate() {
            info!("Processing {}: {:?} and {:?}", pair.numeric_key, pair.subtitle_path, pair.video_path);

            if idx > 0 {
                let previous_video = &pairs[idx - 1].video_path;
                let duration_ms = self.prober.duration_ms(previous_video).await?;
                cumulative_offset_ms = cumulative_offset_ms.checked_add(duration_ms).ok_or_else(|| {
                    MergeError::probe(previous_video, "cumulative duration out of range")
                })?;
            }

            let mut subtitles = SubtitleCollection::load_srt(&pair.subtitle_path)?;

            if idx > 0 {
                subtitles.shift(cumulative_offset_ms)?;
            }

            debug!(
                "Appending {} entries from {:?} at offset {} ms",
                subtitles.entries.len(), pair.subtitle_path, cumulative_offset_ms
            );
            merged.entries.append(&mut subtitles.entries);
            segment_offsets_ms.push(cumulative_offset_ms);

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        merged.renumber();

        Ok(MergedTrack {
            subtitles: merged,
            segment_offsets_ms,
        })
    }
}
