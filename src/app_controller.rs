use std::path::Path;
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::app_config::Config;
use crate::errors::{MergeError, MergeResult};
use crate::file_utils::{FileManager, MediaPair};
use crate::media_probe::{DurationProber, FfprobeProber};
use crate::merger::{MergedTrack, SubtitleMerger};

// @module: Application controller for subtitle merging

/// Drives one merge: pair, sequence, merge, write
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> MergeResult<Self> {
        config
            .validate()
            .map_err(|e| MergeError::Config(e.to_string()))?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Find and order the pairs in `input_dir` without touching any media
    pub fn plan(&self, input_dir: &Path) -> MergeResult<Vec<MediaPair>> {
        let pairs = FileManager::find_pairs(
            input_dir,
            &self.config.subtitle_extension,
            &self.config.video_extension,
        )?;

        if pairs.is_empty() {
            return Err(MergeError::EmptyInput(input_dir.to_path_buf()));
        }

        Ok(FileManager::sequence_pairs(pairs))
    }

    /// Merge everything in `input_dir` into `output_file`, probing with ffprobe
    pub async fn run(&self, input_dir: &Path, output_file: &Path) -> MergeResult<MergedTrack> {
        let prober = FfprobeProber::from_config(&self.config);
        self.run_with_prober(input_dir, output_file, &prober).await
    }

    /// Same as [`Controller::run`] with a caller supplied duration source
    pub async fn run_with_prober(
        &self,
        input_dir: &Path,
        output_file: &Path,
        prober: &dyn DurationProber,
    ) -> MergeResult<MergedTrack> {
        let start_time = Instant::now();

        let pairs = self.plan(input_dir)?;
        info!("Found {} subtitle/video pairs in {:?}", pairs.len(), input_dir);

        let mut merger = SubtitleMerger::new(prober);
        let progress_bar = self.config.show_progress.then(|| Self::progress_bar(pairs.len() as u64));
        if let Some(progress_bar) = &progress_bar {
            merger = merger.with_progress(progress_bar.clone());
        }

        let result = merger.merge(input_dir, &pairs).await;
        if let Some(progress_bar) = progress_bar {
            progress_bar.finish_and_clear();
        }
        let merged = result?;

        if merged.is_empty() {
            warn!("Merged track has no entries; writing an empty file");
        }

        merged.subtitles.write_to_srt(output_file)?;

        info!(
            "Wrote {} entries to {:?} in {:.1}s",
            merged.len(),
            output_file,
            start_time.elapsed().as_secs_f64()
        );

        Ok(merged)
    }

    fn progress_bar(total: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }
}
