/*!
 * Concurrent per-line translation.
 *
 * Every subtitle becomes one task: build its context window, render the line
 * prompt, and run the port call under the retry policy. Tasks run on a bounded
 * pool and write only their own result slot, so output order is fixed by
 * position regardless of completion order.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::app_config::ContextMode;
use crate::subtitle_processor::SubtitleEntry;
use crate::translation::cancel::CancellationToken;
use crate::translation::port::{TranslationPort, translate_with_timeout};
use crate::translation::prompts;
use crate::translation::results::{ResultSlots, TranslationResult};
use crate::translation::retry::RetryPolicy;
use crate::translation::window::ContextWindow;

/// Translates every line of a document on a bounded worker pool
pub struct ConcurrentScheduler {
    port: Arc<dyn TranslationPort>,
    retry: RetryPolicy,
    concurrent_requests: usize,
    context_mode: ContextMode,
    temperature: f32,
    target_language: String,
    timeout: Option<Duration>,
}

impl ConcurrentScheduler {
    pub fn new(port: Arc<dyn TranslationPort>, target_language: impl Into<String>) -> Self {
        Self {
            port,
            retry: RetryPolicy::default(),
            concurrent_requests: 5,
            context_mode: ContextMode::Relaxed,
            temperature: 0.7,
            target_language: target_language.into(),
            timeout: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pool size; values below 1 are treated as 1
    pub fn with_concurrency(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests.max(1);
        self
    }

    pub fn with_context_mode(mut self, context_mode: ContextMode) -> Self {
        self.context_mode = context_mode;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Per-call timeout; an expired call counts as a failed attempt
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.retry = self.retry.with_cancellation(cancel);
        self
    }

    /// Translate all entries; the result has the same length and order as `entries`
    pub async fn translate_all(
        &self,
        entries: &[SubtitleEntry],
        context_summary: &str,
        vocabulary: &[String],
    ) -> Vec<TranslationResult> {
        self.translate_all_with_progress(entries, context_summary, vocabulary, |_, _| {})
            .await
    }

    /// Same as `translate_all`, calling `progress(done, total)` after each line
    pub async fn translate_all_with_progress<P>(
        &self,
        entries: &[SubtitleEntry],
        context_summary: &str,
        vocabulary: &[String],
        progress: P,
    ) -> Vec<TranslationResult>
    where
        P: Fn(usize, usize) + Send + Sync,
    {
        let total = entries.len();
        let slots = ResultSlots::new(total);
        let completed = AtomicUsize::new(0);
        let start_time = Instant::now();

        let record = |result: TranslationResult| {
            if result.is_degraded() {
                warn!("Line {} kept its source text: {}", result.position + 1, result.text);
            }
            slots.set(result);
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(done, total);
        };

        match self.context_mode {
            ContextMode::Strict => {
                for position in 0..total {
                    let result = self.translate_line(entries, &slots, position, context_summary, vocabulary).await;
                    record(result);
                }
            }
            ContextMode::Relaxed => {
                let semaphore = Semaphore::new(self.concurrent_requests);
                let slots_ref = &slots;
                let semaphore = &semaphore;
                let record = &record;

                stream::iter(0..total)
                    .map(|position| async move {
                        // Never closed; a missing permit only loosens the bound
                        let _permit = semaphore.acquire().await.ok();
                        let result = self
                            .translate_line(entries, slots_ref, position, context_summary, vocabulary)
                            .await;
                        record(result);
                    })
                    .buffer_unordered(self.concurrent_requests)
                    .collect::<Vec<()>>()
                    .await;
            }
        }

        debug!(
            "Translated {} lines in {:?} ({:?} context)",
            total,
            start_time.elapsed(),
            self.context_mode
        );

        slots.into_results(|position| {
            TranslationResult::failed_error(position, &entries[position].text, "task did not complete", 0)
        })
    }

    async fn translate_line(
        &self,
        entries: &[SubtitleEntry],
        slots: &ResultSlots,
        position: usize,
        context_summary: &str,
        vocabulary: &[String],
    ) -> TranslationResult {
        let text = entries[position].text.as_str();
        let window = ContextWindow::build(entries, slots, position);
        let prompt = prompts::line_prompt(text, &window, context_summary, &self.target_language, vocabulary);

        let port = self.port.as_ref();
        let prompt = prompt.as_str();
        let temperature = self.temperature;
        let timeout = self.timeout;

        self.retry
            .attempt(position, text, move || async move {
                translate_with_timeout(port, text, prompt, temperature, timeout)
                    .await
                    .map(|response| first_line(&response))
            })
            .await
    }
}

/// First line of the trimmed response, guarding against replies that echo context
pub fn first_line(response: &str) -> String {
    response.trim().lines().next().unwrap_or_default().trim().to_string()
}
