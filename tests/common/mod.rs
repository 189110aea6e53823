/*!
 * Common test utilities for the smartsub test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use smartsub::subtitle_processor::SubtitleEntry;


/// Route library logs through env_logger while tests run (RUST_LOG controls the level)
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Three sequential blocks whose joined text is long enough to be analyzed
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.

";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// `n` sequential one-second entries with text `line <i>`
pub fn numbered_entries(n: usize) -> Vec<SubtitleEntry> {
    (0..n)
        .map(|i| {
            SubtitleEntry::new(
                (i + 1).to_string(),
                SubtitleEntry::format_timestamp(i as u64 * 2_000),
                SubtitleEntry::format_timestamp(i as u64 * 2_000 + 1_500),
                format!("line {}", i),
            )
        })
        .collect()
}

/// SRT text for `numbered_entries(n)`
pub fn numbered_srt(n: usize) -> String {
    numbered_entries(n).iter().map(|e| e.to_string()).collect()
}
