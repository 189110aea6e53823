/*!
 * Whole-document content analysis.
 *
 * Runs once per file, before any line is translated, and produces a summary
 * (genre, characters, fixed name translations, tone) that is injected into
 * every per-line prompt.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::translation::cancel::CancellationToken;
use crate::translation::port::{TranslationPort, translate_with_timeout};
use crate::translation::prompts;

/// Excerpts shorter than this (after trimming) are not analyzed
pub const MIN_ANALYSIS_CHARS: usize = 50;

/// Excerpts are truncated to this many characters before sending
pub const MAX_EXCERPT_CHARS: usize = 2500;

/// Produces the context summary for a subtitle document
pub struct ContentAnalyzer {
    port: Arc<dyn TranslationPort>,
    target_language: String,
    temperature: f32,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl ContentAnalyzer {
    pub fn new(port: Arc<dyn TranslationPort>, target_language: impl Into<String>, temperature: f32) -> Self {
        Self {
            port,
            target_language: target_language.into(),
            temperature,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Bound the analysis call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Skip or abandon the analysis call once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Analyze the excerpt; `None` means "use the default summary"
    ///
    /// Short excerpts skip the call entirely. Empty responses and call
    /// failures are logged and reported as `None`.
    pub async fn analyze(&self, excerpt: &str, vocabulary: &[String]) -> Option<String> {
        let trimmed_len = excerpt.trim().chars().count();
        if trimmed_len < MIN_ANALYSIS_CHARS {
            info!(
                "Text too short for content analysis ({} < {} characters)",
                trimmed_len, MIN_ANALYSIS_CHARS
            );
            return None;
        }

        if self.cancel.is_cancelled() {
            info!("Content analysis skipped: cancelled");
            return None;
        }

        let excerpt = truncate_chars(excerpt, MAX_EXCERPT_CHARS);
        let system_prompt = prompts::analysis_prompt(excerpt, &self.target_language, vocabulary, MAX_EXCERPT_CHARS);
        debug!("Analyzing {} characters of content", excerpt.chars().count());

        let outcome = tokio::select! {
            result = translate_with_timeout(
                self.port.as_ref(),
                excerpt,
                &system_prompt,
                self.temperature,
                self.timeout,
            ) => result,
            _ = self.cancel.cancelled() => Err(ProviderError::Cancelled),
        };

        match outcome {
            Ok(summary) if !summary.trim().is_empty() => Some(summary.trim().to_string()),
            Ok(_) => {
                warn!("Content analysis returned an empty response");
                None
            }
            Err(e) => {
                warn!("Content analysis failed: {}", e);
                None
            }
        }
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
