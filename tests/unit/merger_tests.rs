/*!
 * Tests for cumulative offsets and concatenation
 */

use std::path::Path;
use anyhow::Result;
use srtmerge::errors::MergeError;
use srtmerge::file_utils::FileManager;
use srtmerge::merger::SubtitleMerger;
use crate::common;
use crate::common::mock_prober::MockProber;

const ONE_SECOND: &str = "1\n00:00:00,000 --> 00:00:01,000\nline\n";

#[tokio::test]
async fn test_merge_withThreeChunks_shouldShiftBySumOfPrecedingVideos() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    for stem in ["clip_1", "clip_2", "clip_3"] {
        common::create_chunk(dir, stem, ONE_SECOND)?;
    }

    let prober = MockProber::new()
        .with_duration("clip_1.mov", 5000)
        .with_duration("clip_2.mov", 3000);
    let pairs = FileManager::sequence_pairs(FileManager::find_pairs(dir, "srt", "mov")?);

    let merged = SubtitleMerger::new(&prober).merge(dir, &pairs).await?;
    let times: Vec<(usize, u64, u64)> = merged
        .subtitles
        .entries
        .iter()
        .map(|e| (e.seq_num, e.start_time_ms, e.end_time_ms))
        .collect();

    assert_eq!(times, vec![(1, 0, 1000), (2, 5000, 6000), (3, 8000, 9000)]);
    assert_eq!(merged.segment_offsets_ms, vec![0, 5000, 8000]);
    assert_eq!(merged.subtitles.source_file, dir);
    Ok(())
}

/// File i is shifted by videos 0..i, so the last video is never probed and
/// each probe targets the preceding pair's video.
#[tokio::test]
async fn test_merge_withThreeChunks_shouldProbePrecedingVideosOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    for stem in ["10", "9", "2"] {
        common::create_chunk(dir, stem, ONE_SECOND)?;
    }

    let prober = MockProber::new()
        .with_duration("2.mov", 1000)
        .with_duration("9.mov", 2000);
    let pairs = FileManager::sequence_pairs(FileManager::find_pairs(dir, "srt", "mov")?);

    let merged = SubtitleMerger::new(&prober).merge(dir, &pairs).await?;

    assert_eq!(prober.probed(), vec!["2.mov", "9.mov"]);
    assert_eq!(merged.segment_offsets_ms, vec![0, 1000, 3000]);
    Ok(())
}

#[tokio::test]
async fn test_merge_withSinglePair_shouldNotProbeOrShift() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let (subtitle, _) = common::create_chunk(
        dir,
        "001_take",
        "1\n00:01:00,250 --> 00:01:02,000\nHello\nworld\n\n2\n00:01:03,000 --> 00:01:04,000\nBye\n\n",
    )?;

    let prober = MockProber::new();
    let pairs = FileManager::find_pairs(dir, "srt", "mov")?;
    let merged = SubtitleMerger::new(&prober).merge(dir, &pairs).await?;

    assert!(prober.probed().is_empty());
    assert_eq!(merged.subtitles.to_srt_string(), std::fs::read_to_string(subtitle)?);
    Ok(())
}

#[tokio::test]
async fn test_merge_withSeveralEntriesPerFile_shouldKeepRelativeOrderAndRenumber() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_chunk(dir, "a_1", "4\n00:00:02,000 --> 00:00:03,000\nsecond\n\n9\n00:00:00,500 --> 00:00:01,000\nfirst\n")?;
    common::create_chunk(dir, "a_2", "1\n00:00:00,000 --> 00:00:00,500\nthird\n")?;

    let prober = MockProber::new().with_duration("a_1.mov", 4000);
    let pairs = FileManager::sequence_pairs(FileManager::find_pairs(dir, "srt", "mov")?);
    let merged = SubtitleMerger::new(&prober).merge(dir, &pairs).await?;

    let summary: Vec<(usize, &str, u64)> = merged
        .subtitles
        .entries
        .iter()
        .map(|e| (e.seq_num, e.text.as_str(), e.start_time_ms))
        .collect();
    assert_eq!(summary, vec![(1, "second", 2000), (2, "first", 500), (3, "third", 4000)]);
    Ok(())
}

#[tokio::test]
async fn test_merge_withFailingProbe_shouldAbort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    for stem in ["1", "2", "3"] {
        common::create_chunk(dir, stem, ONE_SECOND)?;
    }

    let prober = MockProber::new()
        .with_duration("1.mov", 1000)
        .failing_on("2.mov");
    let pairs = FileManager::sequence_pairs(FileManager::find_pairs(dir, "srt", "mov")?);
    let result = SubtitleMerger::new(&prober).merge(dir, &pairs).await;

    assert!(matches!(result, Err(MergeError::Probe { .. })));
    assert_eq!(prober.probed(), vec!["1.mov", "2.mov"]);
    Ok(())
}

#[tokio::test]
async fn test_merge_withMalformedSecondFile_shouldReturnParseError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_chunk(dir, "1", ONE_SECOND)?;
    common::create_chunk(dir, "2", "1\nthis is not a timing line\ntext\n")?;

    let prober = MockProber::new().with_duration("1.mov", 1000);
    let pairs = FileManager::sequence_pairs(FileManager::find_pairs(dir, "srt", "mov")?);
    let result = SubtitleMerger::new(&prober).merge(dir, &pairs).await;

    match result {
        Err(MergeError::SubtitleParse { path, .. }) => assert_eq!(path, dir.join("2.srt")),
        other => panic!("expected parse error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_merge_withNoPairs_shouldReturnEmptyInput() {
    let prober = MockProber::new();
    let result = SubtitleMerger::new(&prober).merge(Path::new("somewhere"), &[]).await;
    assert!(matches!(result, Err(MergeError::EmptyInput(_))));
}

#[tokio::test]
async fn test_merge_withOffsetPastMaximumTimestamp_shouldReturnParseError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_chunk(dir, "1", ONE_SECOND)?;
    common::create_chunk(dir, "2", ONE_SECOND)?;

    let prober = MockProber::new().with_duration("1.mov", u64::MAX);
    let pairs = FileManager::sequence_pairs(FileManager::find_pairs(dir, "srt", "mov")?);
    let result = SubtitleMerger::new(&prober).merge(dir, &pairs).await;

    match result {
        Err(MergeError::SubtitleParse { path, .. }) => assert_eq!(path, dir.join("2.srt")),
        other => panic!("expected out of range error, got {:?}", other),
    }
    Ok(())
}
