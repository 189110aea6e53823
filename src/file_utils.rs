use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Marker placed in translated subtitle file names
pub const TRANSLATED_MARKER: &str = "_translated_";

/// Suffix placed in analysis report file names
pub const ANALYSIS_SUFFIX: &str = "_analysis";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: <stem>_translated_<lang><ext> next to the input
    pub fn translated_output_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let mut output_filename = format!("{}{}{}", stem, TRANSLATED_MARKER, target_language);
        if let Some(ext) = input_file.extension() {
            output_filename.push('.');
            output_filename.push_str(&ext.to_string_lossy());
        }

        input_file.with_file_name(output_filename)
    }

    // @generates: <stem>_<lang>_analysis.txt next to the input
    pub fn analysis_output_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        input_file.with_file_name(format!("{}_{}{}.txt", stem, target_language, ANALYSIS_SUFFIX))
    }

    /// Whether a path looks like one of our own generated artifacts
    pub fn is_generated_output<P: AsRef<Path>>(path: P) -> bool {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        stem.contains(TRANSLATED_MARKER) || stem.ends_with(ANALYSIS_SUFFIX)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let wanted = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(wanted) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a subtitle file, detecting its text encoding
    pub fn read_subtitle_file<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;

        Ok(Self::decode_text(&bytes))
    }

    /// Decode raw bytes: BOM first, then strict UTF-8, then Windows-1252
    pub fn decode_text(bytes: &[u8]) -> String {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            debug!("Detected {} byte order mark", encoding.name());
            let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            return text.into_owned();
        }

        if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }

        debug!("Input is not valid UTF-8, decoding as {}", WINDOWS_1252.name());
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
        text.into_owned()
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
