/*!
 * Bounded retry with exponential backoff for a single line.
 */

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::translation::cancel::CancellationToken;
use crate::translation::results::TranslationResult;

/// Why the most recent attempt did not produce a translation
#[derive(Debug, Clone)]
enum AttemptFailure {
    Empty,
    Error(String),
}

/// Retry policy applied around every port call for one line
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay_base: Duration,
    cancel: CancellationToken,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay_base: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay_base,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a shared cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay slept after the attempt with index `attempt_index` (0-based) fails
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        self.retry_delay_base.saturating_mul(factor)
    }

    /// Run `work` until it yields a non-blank response or attempts run out
    ///
    /// Never fails: exhaustion produces the source text with a failure tag,
    /// decided by the last attempt's outcome.
    pub async fn attempt<F, Fut>(&self, position: usize, original: &str, mut work: F) -> TranslationResult
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, ProviderError>>,
    {
        let mut last_failure = AttemptFailure::Empty;
        let mut attempts = 0;

        for attempt_index in 0..self.max_retries {
            if self.cancel.is_cancelled() {
                last_failure = AttemptFailure::Error(ProviderError::Cancelled.to_string());
                break;
            }

            attempts += 1;
            let outcome = tokio::select! {
                result = work() => result,
                _ = self.cancel.cancelled() => Err(ProviderError::Cancelled),
            };

            match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    if attempt_index > 0 {
                        debug!("Line {} translated on attempt {}", position + 1, attempts);
                    }
                    return TranslationResult::success(position, text.trim(), attempts);
                }
                Ok(_) => {
                    warn!(
                        "Line {} attempt {}/{} returned an empty translation",
                        position + 1,
                        attempts,
                        self.max_retries
                    );
                    last_failure = AttemptFailure::Empty;
                }
                Err(ProviderError::Cancelled) => {
                    last_failure = AttemptFailure::Error(ProviderError::Cancelled.to_string());
                    break;
                }
                Err(e) => {
                    warn!("Line {} attempt {}/{} failed: {}", position + 1, attempts, self.max_retries, e);
                    last_failure = AttemptFailure::Error(e.to_string());
                }
            }

            if attempt_index + 1 < self.max_retries {
                let delay = self.backoff_delay(attempt_index);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.cancel.cancelled() => {
                        last_failure = AttemptFailure::Error(ProviderError::Cancelled.to_string());
                        break;
                    }
                }
            }
        }

        match last_failure {
            AttemptFailure::Empty => TranslationResult::failed_empty(position, original, attempts),
            AttemptFailure::Error(message) => TranslationResult::failed_error(position, original, message, attempts),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
