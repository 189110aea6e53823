/*!
 * Sliding context window around the line being translated.
 *
 * The window holds:
 * - Preceding: up to ten earlier lines, translated if their slot is already written
 * - Following: up to ten later lines, always in the source language
 *
 * Under relaxed scheduling a preceding slot may still be empty while its task
 * runs; the source text is used instead. This is expected, not an error.
 */

use crate::subtitle_processor::SubtitleEntry;
use crate::translation::results::ResultSlots;

/// Number of lines taken on each side of the target
pub const CONTEXT_WINDOW_SIZE: usize = 10;

/// Context around one target line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextWindow {
    /// Position of the target line
    pub position: usize,
    /// Lines before the target, oldest first
    pub preceding: Vec<String>,
    /// Lines after the target, source text
    pub following: Vec<String>,
}

impl ContextWindow {
    /// Build the window for `position`
    pub fn build(entries: &[SubtitleEntry], slots: &ResultSlots, position: usize) -> Self {
        let n = entries.len();
        if position >= n {
            return Self {
                position,
                ..Default::default()
            };
        }

        let start = position.saturating_sub(CONTEXT_WINDOW_SIZE);
        let preceding = (start..position)
            .map(|j| {
                slots
                    .get_text(j)
                    .map(str::to_string)
                    .unwrap_or_else(|| entries[j].text.clone())
            })
            .collect();

        let end = n.min(position + CONTEXT_WINDOW_SIZE + 1);
        let following = entries[position + 1..end].iter().map(|e| e.text.clone()).collect();

        Self {
            position,
            preceding,
            following,
        }
    }
}
