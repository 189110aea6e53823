/*!
 * File-level translation service.
 *
 * Wires the two phases together for one subtitle file: a single content
 * analysis over the joined text, then the concurrent per-line pass, then
 * reconstruction and output.
 */

use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, ContextMode, TranslationConfig};
use crate::errors::{SubtitleError, TranslationError};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::translation::analyzer::ContentAnalyzer;
use crate::translation::cancel::CancellationToken;
use crate::translation::port::TranslationPort;
use crate::translation::prompts::DEFAULT_CONTEXT_SUMMARY;
use crate::translation::results::TranslationResult;
use crate::translation::retry::RetryPolicy;
use crate::translation::scheduler::ConcurrentScheduler;

/// Tuning knobs for a translation run
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Worker pool size
    pub concurrent_requests: usize,
    /// Attempts per line
    pub max_retries: u32,
    /// Backoff base; attempt `k` waits `base * 2^k`
    pub retry_delay_base: Duration,
    pub analysis_temperature: f32,
    pub translation_temperature: f32,
    pub context_mode: ContextMode,
    /// Per-call timeout applied on top of the provider's own
    pub request_timeout: Option<Duration>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            concurrent_requests: 5,
            max_retries: 3,
            retry_delay_base: Duration::from_secs(1),
            analysis_temperature: 0.3,
            translation_temperature: 0.7,
            context_mode: ContextMode::Relaxed,
            request_timeout: None,
        }
    }
}

impl TranslationOptions {
    pub fn from_config(config: &TranslationConfig) -> Self {
        let common = &config.common;
        Self {
            concurrent_requests: common.concurrent_requests,
            max_retries: common.max_retries,
            retry_delay_base: common.retry_delay_base(),
            analysis_temperature: common.analysis_temperature,
            translation_temperature: common.translation_temperature,
            context_mode: common.context_mode,
            request_timeout: Some(config.get_timeout()),
        }
    }
}

/// Summary and per-line results for an in-memory document
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    pub context_summary: String,
    /// True when analysis was skipped or failed
    pub used_default_summary: bool,
    pub results: Vec<TranslationResult>,
}

impl TranslatedDocument {
    pub fn degraded_lines(&self) -> usize {
        self.results.iter().filter(|r| r.is_degraded()).count()
    }
}

/// What `process_file` produced
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub output_path: PathBuf,
    pub analysis_path: PathBuf,
    pub total_lines: usize,
    /// Lines written with a failure tag instead of a translation
    pub degraded_lines: usize,
    pub used_default_summary: bool,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    /// Whether every line was translated
    pub fn is_complete(&self) -> bool {
        self.degraded_lines == 0
    }
}

/// Translates subtitle files through a `TranslationPort`
#[derive(Clone)]
pub struct TranslationService {
    port: Arc<dyn TranslationPort>,
    pub options: TranslationOptions,
    vocabulary: Vec<String>,
    cancel: CancellationToken,
}

impl TranslationService {
    pub fn new(port: Arc<dyn TranslationPort>, options: TranslationOptions) -> Self {
        Self {
            port,
            options,
            vocabulary: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Build a service from the application config, including its vocabulary
    pub fn from_config(port: Arc<dyn TranslationPort>, config: &Config) -> Self {
        Self::new(port, TranslationOptions::from_config(&config.translation))
            .with_vocabulary(config.normalized_vocabulary())
    }

    pub fn with_vocabulary(mut self, vocabulary: Vec<String>) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Token that stops in-flight and pending line work when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn analyzer(&self, language_name: &str) -> ContentAnalyzer {
        let analyzer = ContentAnalyzer::new(self.port.clone(), language_name, self.options.analysis_temperature)
            .with_cancellation(self.cancel.clone());
        match self.options.request_timeout {
            Some(timeout) => analyzer.with_timeout(timeout),
            None => analyzer,
        }
    }

    fn scheduler(&self, language_name: &str) -> ConcurrentScheduler {
        let retry = RetryPolicy::new(self.options.max_retries, self.options.retry_delay_base)
            .with_cancellation(self.cancel.clone());

        let scheduler = ConcurrentScheduler::new(self.port.clone(), language_name)
            .with_retry_policy(retry)
            .with_concurrency(self.options.concurrent_requests)
            .with_context_mode(self.options.context_mode)
            .with_temperature(self.options.translation_temperature);

        match self.options.request_timeout {
            Some(timeout) => scheduler.with_timeout(timeout),
            None => scheduler,
        }
    }

    /// Analyze then translate already-parsed entries
    ///
    /// Analysis completes before any line is submitted.
    pub async fn translate_entries<P>(
        &self,
        entries: &[SubtitleEntry],
        target_language: &str,
        progress: P,
    ) -> TranslatedDocument
    where
        P: Fn(usize, usize) + Send + Sync,
    {
        let language_name = language_utils::display_language(target_language);
        let joined = SubtitleCollection::joined_text(entries);

        let (context_summary, used_default_summary) =
            match self.analyzer(&language_name).analyze(&joined, &self.vocabulary).await {
                Some(summary) => (summary, false),
                None => {
                    info!("Using the default context summary");
                    (DEFAULT_CONTEXT_SUMMARY.to_string(), true)
                }
            };

        let results = self
            .scheduler(&language_name)
            .translate_all_with_progress(entries, &context_summary, &self.vocabulary, progress)
            .await;

        TranslatedDocument {
            context_summary,
            used_default_summary,
            results,
        }
    }

    /// Translate one subtitle file and write the translated file and analysis report next to it
    ///
    /// A cancelled run fails with `TranslationError::Cancelled` and writes nothing, so
    /// a later run does not mistake a partial file for a finished translation.
    pub async fn process_file<P: AsRef<Path>>(&self, path: P, target_language: &str) -> Result<ProcessOutcome> {
        self.process_file_with_progress(path, target_language, |_, _| {}).await
    }

    /// Same as `process_file`, reporting per-line progress
    pub async fn process_file_with_progress<P, F>(
        &self,
        path: P,
        target_language: &str,
        progress: F,
    ) -> Result<ProcessOutcome>
    where
        P: AsRef<Path>,
        F: Fn(usize, usize) + Send + Sync,
    {
        let path = path.as_ref();
        let start_time = Instant::now();

        if self.cancel.is_cancelled() {
            return Err(TranslationError::Cancelled.into());
        }

        let collection = SubtitleCollection::from_file(path)?;
        if collection.is_empty() {
            return Err(SubtitleError::NoTranslatableContent(path.display().to_string()).into());
        }
        info!("Parsed {} subtitles from {}", collection.len(), path.display());

        let document = self
            .translate_entries(&collection.entries, target_language, progress)
            .await;

        if self.cancel.is_cancelled() {
            warn!("Cancelled; not writing partial output for {}", path.display());
            return Err(TranslationError::Cancelled.into());
        }

        let texts: Vec<&str> = document.results.iter().map(|r| r.text.as_str()).collect();
        let rebuilt = SubtitleCollection::rebuild(&collection.entries, &texts)?;

        let output_path = FileManager::translated_output_path(path, target_language);
        FileManager::write_to_file(&output_path, &rebuilt)?;

        let analysis_path = FileManager::analysis_output_path(path, target_language);
        FileManager::write_to_file(&analysis_path, &analysis_report(&document.context_summary))?;

        let degraded_lines = document.degraded_lines();
        if degraded_lines > 0 {
            warn!(
                "{} of {} lines could not be translated and kept their source text",
                degraded_lines,
                collection.len()
            );
        }

        let elapsed = start_time.elapsed();
        info!(
            "Translated {} in {:.1}s -> {}",
            path.display(),
            elapsed.as_secs_f64(),
            output_path.display()
        );

        Ok(ProcessOutcome {
            output_path,
            analysis_path,
            total_lines: collection.len(),
            degraded_lines,
            used_default_summary: document.used_default_summary,
            elapsed,
        })
    }
}

/// Contents of the analysis report file
pub fn analysis_report(context_summary: &str) -> String {
    format!("Content analysis report:\n{}", context_summary)
}
