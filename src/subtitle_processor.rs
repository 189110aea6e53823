use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranslationError;
use crate::file_utils::FileManager;

// @module: Subtitle parsing and reconstruction

// @const: SRT timing line, captured as the two raw timestamps
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})$").unwrap()
});

// @const: One or more blank (or whitespace-only) lines between blocks
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").unwrap());

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Ordinal exactly as written in the source
    pub index: String,

    // @field: Start timestamp (HH:MM:SS,mmm)
    pub start_time: String,

    // @field: End timestamp (HH:MM:SS,mmm)
    pub end_time: String,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(
        index: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        SubtitleEntry {
            index: index.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
        }
    }

    /// Parse an SRT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        // Parse HH:MM:SS,mmm format
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Start time in milliseconds
    pub fn start_time_ms(&self) -> Result<u64> {
        Self::parse_timestamp(&self.start_time)
    }

    /// End time in milliseconds
    pub fn end_time_ms(&self) -> Result<u64> {
        Self::parse_timestamp(&self.end_time)
    }

    /// Write this entry's header with a replacement text, in SRT block form
    pub fn write_block(&self, out: &mut String, text: &str) {
        out.push_str(&self.index);
        out.push('\n');
        out.push_str(&self.start_time);
        out.push_str(" --> ");
        out.push_str(&self.end_time);
        out.push('\n');
        out.push_str(text);
        out.push_str("\n\n");
    }

    /// Parse a single block, or `None` when it is malformed or partial
    fn from_block(block: &str) -> Option<Self> {
        let mut lines = block.lines();

        let index = lines.next()?.trim();
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let caps = TIMESTAMP_REGEX.captures(lines.next()?.trim())?;

        let text = lines.collect::<Vec<_>>().join("\n");
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(SubtitleEntry::new(index, &caps[1], &caps[2], text))
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle entries parsed from one file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries, in source order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new, empty subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Read and parse a subtitle file. An empty collection is not an error here.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_subtitle_file(path)?;

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries: Self::parse_srt_string(&content),
        })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All subtitle texts joined with newlines, as fed to content analysis
    pub fn joined_text(entries: &[SubtitleEntry]) -> String {
        entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// Line endings are normalized first. Blocks that do not consist of an
    /// ordinal line, a timing line and at least one text line are dropped.
    /// Entries keep their source ordinals and order; nothing is renumbered.
    pub fn parse_srt_string(content: &str) -> Vec<SubtitleEntry> {
        let normalized = content
            .trim_start_matches('\u{feff}')
            .replace("\r\n", "\n")
            .replace('\r', "\n");

        let mut entries = Vec::new();
        let mut dropped = 0usize;

        for block in BLOCK_SEPARATOR.split(&normalized) {
            let block = block.trim_matches('\n');
            if block.trim().is_empty() {
                continue;
            }

            match SubtitleEntry::from_block(block) {
                Some(entry) => entries.push(entry),
                None => {
                    dropped += 1;
                    debug!("Dropping malformed subtitle block: {:?}", block.lines().next());
                }
            }
        }

        if dropped > 0 {
            debug!("Dropped {} malformed subtitle block(s)", dropped);
        }

        Self::report_timing_anomalies(&entries);

        entries
    }

    /// Log inverted and overlapping time ranges. Purely informational.
    fn report_timing_anomalies(entries: &[SubtitleEntry]) {
        let ranges: Vec<Option<(u64, u64)>> = entries
            .iter()
            .map(|e| match (e.start_time_ms(), e.end_time_ms()) {
                (Ok(start), Ok(end)) => Some((start, end)),
                _ => None,
            })
            .collect();

        let inverted = ranges
            .iter()
            .flatten()
            .filter(|(start, end)| end < start)
            .count();

        let overlapping = ranges
            .windows(2)
            .filter(|pair| matches!(pair, [Some((_, end)), Some((next_start, _))] if end > next_start))
            .count();

        if inverted > 0 {
            warn!("Found {} subtitle entries ending before they start", inverted);
        }
        if overlapping > 0 {
            warn!("Found {} overlapping subtitle entries", overlapping);
        }
    }

    /// Re-serialize translated texts into SRT blocks.
    ///
    /// Indices and timings always come from `entries`. A length mismatch is a
    /// scheduler bug and is reported rather than truncated or padded.
    pub fn rebuild<S: AsRef<str>>(
        entries: &[SubtitleEntry],
        texts: &[S],
    ) -> std::result::Result<String, TranslationError> {
        if entries.len() != texts.len() {
            return Err(TranslationError::ReconstructionMismatch {
                expected: entries.len(),
                actual: texts.len(),
            });
        }

        let mut out = String::new();
        for (entry, text) in entries.iter().zip(texts) {
            entry.write_block(&mut out, text.as_ref());
        }

        Ok(out)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
