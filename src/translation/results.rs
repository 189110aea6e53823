/*!
 * Per-line translation results and the fixed-position arena they are written to.
 *
 * Each position is written at most once, by the task that owns it. Any task may
 * read any position at any time; an unwritten slot simply reads as `None`.
 */

use log::warn;
use once_cell::sync::OnceCell;
use std::fmt;

/// Text prepended to the source line when every attempt returned nothing
pub const FAILED_TAG: &str = "[translation failed]";

/// Outcome of translating one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Ok,
    /// Every attempt produced an empty response
    FailedEmpty,
    /// The last attempt failed with an error, timeout or cancellation
    FailedError,
}

/// Translation of one subtitle line
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    /// Position of the subtitle in the parsed sequence
    pub position: usize,
    /// Final text: the translation, or the source line with a failure tag
    pub text: String,
    pub status: LineStatus,
    /// Error message of the last failed attempt
    pub detail: Option<String>,
    /// Number of port calls made
    pub attempts: u32,
}

impl TranslationResult {
    pub fn success(position: usize, text: impl Into<String>, attempts: u32) -> Self {
        Self {
            position,
            text: text.into(),
            status: LineStatus::Ok,
            detail: None,
            attempts,
        }
    }

    /// Source text tagged as an empty-response failure
    pub fn failed_empty(position: usize, original: &str, attempts: u32) -> Self {
        Self {
            position,
            text: format!("{} {}", FAILED_TAG, original),
            status: LineStatus::FailedEmpty,
            detail: None,
            attempts,
        }
    }

    /// Source text tagged with the last error message
    pub fn failed_error(position: usize, original: &str, message: impl Into<String>, attempts: u32) -> Self {
        let message = message.into();
        Self {
            position,
            text: format!("[translation error: {}] {}", message, original),
            status: LineStatus::FailedError,
            detail: Some(message),
            attempts,
        }
    }

    /// Whether the line carries a failure tag instead of a translation
    pub fn is_degraded(&self) -> bool {
        self.status != LineStatus::Ok
    }
}

impl fmt::Display for TranslationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{:?}] {}", self.position, self.status, self.text)
    }
}

/// Pre-sized, write-once result arena indexed by position
#[derive(Debug)]
pub struct ResultSlots {
    slots: Vec<OnceCell<TranslationResult>>,
}

impl ResultSlots {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| OnceCell::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store a result at its own position. Returns false if the position is
    /// out of range or was already written.
    pub fn set(&self, result: TranslationResult) -> bool {
        let position = result.position;
        match self.slots.get(position) {
            Some(slot) => {
                if slot.set(result).is_err() {
                    warn!("Result slot {} was already written; keeping the first value", position);
                    return false;
                }
                true
            }
            None => {
                warn!("Result position {} is outside the arena of {}", position, self.slots.len());
                false
            }
        }
    }

    pub fn get(&self, position: usize) -> Option<&TranslationResult> {
        self.slots.get(position).and_then(OnceCell::get)
    }

    /// Translated text at a position, if already written
    pub fn get_text(&self, position: usize) -> Option<&str> {
        self.get(position).map(|r| r.text.as_str())
    }

    /// Number of written slots
    pub fn completed(&self) -> usize {
        self.slots.iter().filter(|s| s.get().is_some()).count()
    }

    /// Consume the arena in position order, filling any unwritten slot with `missing(position)`
    pub fn into_results<F>(self, mut missing: F) -> Vec<TranslationResult>
    where
        F: FnMut(usize) -> TranslationResult,
    {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| slot.into_inner().unwrap_or_else(|| missing(position)))
            .collect()
    }
}
