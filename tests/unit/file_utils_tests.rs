/*!
 * Tests for file utilities
 */

use anyhow::Result;
use smartsub::file_utils::FileManager;

use crate::common;

/// Directory scans find subtitles recursively in sorted order
#[test]
fn test_findFiles_shouldRecurseAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    std::fs::create_dir_all(&nested)?;

    common::create_test_subtitle(&nested, "b.srt")?;
    common::create_test_subtitle(temp_dir.path(), "a.SRT")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "ignore me")?;

    let files = FileManager::find_files(temp_dir.path(), "srt")?;
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a.SRT"));
    assert!(files[1].ends_with("season1/b.srt"));
    Ok(())
}

/// Writing creates missing parent directories
#[test]
fn test_writeToFile_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out/deeper/file.srt");

    FileManager::write_to_file(&path, "content")?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(std::fs::read_to_string(&path)?, "content");
    Ok(())
}

/// UTF-8 with BOM is decoded without the mark
#[test]
fn test_readSubtitleFile_withUtf8Bom_shouldStripIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("bom.srt");
    std::fs::write(&path, "\u{feff}1\n00:00:01,000 --> 00:00:02,000\nHi\n")?;

    let content = FileManager::read_subtitle_file(&path)?;
    assert!(content.starts_with('1'));
    Ok(())
}

/// Missing files surface as errors
#[test]
fn test_readSubtitleFile_withMissingFile_shouldError() {
    assert!(FileManager::read_subtitle_file("/definitely/not/here.srt").is_err());
}

/// Invalid UTF-8 falls back to Windows-1252
#[test]
fn test_decodeText_withLatin1Bytes_shouldFallBackToWindows1252() {
    // "Café" with 0xE9 for é
    let bytes = [0x43, 0x61, 0x66, 0xE9];
    assert_eq!(FileManager::decode_text(&bytes), "Café");
}

/// UTF-16 LE with BOM is honored
#[test]
fn test_decodeText_withUtf16LeBom_shouldDecode() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "Hi".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    assert_eq!(FileManager::decode_text(&bytes), "Hi");
}
