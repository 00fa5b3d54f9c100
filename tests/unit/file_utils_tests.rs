/*!
 * Tests for numeric extraction, pairing and sequencing
 */

use std::path::PathBuf;
use anyhow::Result;
use srtmerge::errors::MergeError;
use srtmerge::file_utils::{extract_number, FileManager, MediaPair};
use crate::common;

fn pair(key: u64, stem: &str) -> MediaPair {
    MediaPair {
        numeric_key: key,
        subtitle_path: PathBuf::from(format!("{}.srt", stem)),
        video_path: PathBuf::from(format!("{}.mov", stem)),
    }
}

#[test]
fn test_extract_number_withLeadingDigits_shouldUseLeadingRun() {
    assert_eq!(extract_number("001_clip.srt"), Some(1));
    assert_eq!(extract_number("42.srt"), Some(42));
    // Leading run wins over a trailing one
    assert_eq!(extract_number("7_take_99.srt"), Some(7));
}

#[test]
fn test_extract_number_withTrailingDigits_shouldUseRunBeforeExtension() {
    assert_eq!(extract_number("clip_001.srt"), Some(1));
    assert_eq!(extract_number("DJI_0123.MOV"), Some(123));
    assert_eq!(extract_number("clip10"), Some(10));
}

#[test]
fn test_extract_number_withoutDigits_shouldReturnNone() {
    assert_eq!(extract_number("clip.srt"), None);
    assert_eq!(extract_number("notes"), None);
    assert_eq!(extract_number("a1b.srt"), None);
}

#[test]
fn test_sequence_pairs_withMixedKeys_shouldOrderNumerically() {
    let ordered = FileManager::sequence_pairs(vec![pair(9, "9"), pair(10, "10"), pair(2, "2")]);
    let keys: Vec<u64> = ordered.iter().map(|p| p.numeric_key).collect();
    assert_eq!(keys, vec![2, 9, 10]);
}

#[test]
fn test_sequence_pairs_withDuplicateKeys_shouldKeepInputOrder() {
    let ordered = FileManager::sequence_pairs(vec![pair(3, "b_3"), pair(1, "x_1"), pair(3, "a_03")]);
    let stems: Vec<String> = ordered
        .iter()
        .map(|p| p.subtitle_path.to_string_lossy().to_string())
        .collect();
    assert_eq!(stems, vec!["x_1.srt", "b_3.srt", "a_03.srt"]);
}

#[test]
fn test_find_pairs_withPartialDirectory_shouldSkipUnmatchedFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_chunk(dir, "clip_10", "")?;
    common::create_chunk(dir, "clip_9", "")?;
    common::create_test_file(dir, "clip_11.srt", "")?;   // no video
    common::create_test_file(dir, "clip_12.mov", "")?;   // no subtitle
    common::create_chunk(dir, "intro", "")?;             // no number
    std::fs::create_dir(dir.join("13.srt"))?;            // directory, not a file

    let pairs = FileManager::find_pairs(dir, "srt", "mov")?;
    let mut keys: Vec<u64> = pairs.iter().map(|p| p.numeric_key).collect();
    keys.sort();
    assert_eq!(keys, vec![9, 10]);

    for p in &pairs {
        assert_eq!(p.subtitle_path.file_stem(), p.video_path.file_stem());
    }

    Ok(())
}

#[test]
fn test_find_pairs_withUppercaseVideoExtension_shouldPair() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "001_run.srt", "")?;
    common::create_test_file(dir, "001_run.MOV", "")?;

    let pairs = FileManager::find_pairs(dir, "srt", "mov")?;
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].numeric_key, 1);
    assert_eq!(pairs[0].video_path, dir.join("001_run.MOV"));

    Ok(())
}

#[test]
fn test_find_pairs_withNestedFiles_shouldNotRecurse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("nested");
    std::fs::create_dir(&nested)?;
    common::create_chunk(&nested, "001", "")?;

    let pairs = FileManager::find_pairs(temp_dir.path(), "srt", "mov")?;
    assert!(pairs.is_empty());

    Ok(())
}

#[test]
fn test_find_pairs_withMissingDirectory_shouldReturnDirectoryError() {
    let result = FileManager::find_pairs("./non_existent_directory_12345", "srt", "mov");
    assert!(matches!(result, Err(MergeError::Directory { .. })));
}

#[test]
fn test_find_pairs_withFileInsteadOfDirectory_shouldReturnDirectoryError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "001.srt", "")?;

    let result = FileManager::find_pairs(&file, "srt", "mov");
    assert!(matches!(result, Err(MergeError::Directory { .. })));

    Ok(())
}
