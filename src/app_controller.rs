use anyhow::{Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, TranslationConfig};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::providers::openai::OpenAI;
use crate::translation::{CancellationToken, ProcessOutcome, TranslationPort, TranslationService};

// @module: Application controller for subtitle processing

/// Outcome of handling one input file
#[derive(Debug)]
pub enum RunStatus {
    /// The file was translated
    Translated(ProcessOutcome),
    /// A translation already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Totals for a folder run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Lines across all processed files that kept their source text
    pub degraded_lines: usize,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation service bound to the configured provider
    service: TranslationService,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(|e| AppError::Config(e.to_string()))?;
        let port = Self::build_port(&config.translation)?;
        Ok(Self::with_port(config, port))
    }

    /// Create a controller around an explicit port (tests, alternative backends)
    pub fn with_port(config: Config, port: Arc<dyn TranslationPort>) -> Self {
        let service = TranslationService::from_config(port, &config);
        Self { config, service }
    }

    /// Build the HTTP client for the active provider
    ///
    /// OpenAI, LM Studio and Ollama all speak the chat-completions protocol;
    /// they differ only in endpoint, model and authentication.
    pub fn build_port(translation: &TranslationConfig) -> Result<Arc<dyn TranslationPort>> {
        let client = OpenAI::new(
            translation.get_api_key(),
            translation.get_endpoint(),
            translation.get_model(),
            translation.get_timeout(),
        )?;
        Ok(Arc::new(client))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that aborts pending line work (wired to Ctrl-C by the binary)
    pub fn cancellation_token(&self) -> CancellationToken {
        self.service.cancellation_token()
    }

    /// Translate a file, or every subtitle file under a directory
    pub async fn run(&self, input_path: PathBuf, force_overwrite: bool) -> Result<()> {
        if input_path.is_dir() {
            let summary = self.run_folder(input_path, force_overwrite).await?;
            if summary.failed > 0 {
                return Err(anyhow!("{} file(s) failed to translate", summary.failed));
            }
            return Ok(());
        }

        match self.run_file(input_path, force_overwrite).await? {
            RunStatus::Translated(outcome) => self.report_outcome(&outcome),
            RunStatus::Skipped(path) => {
                warn!(
                    "Skipping file, translation already exists: {} (use -f to force overwrite)",
                    path.display()
                );
            }
        }
        Ok(())
    }

    /// Translate one file with its own progress bar
    pub async fn run_file(&self, input_file: PathBuf, force_overwrite: bool) -> Result<RunStatus> {
        let multi_progress = MultiProgress::new();
        self.run_file_with_progress(&input_file, &multi_progress, force_overwrite)
            .await
    }

    async fn run_file_with_progress(
        &self,
        input_file: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<RunStatus> {
        if !FileManager::file_exists(input_file) {
            return Err(AppError::File(format!("Input file does not exist: {:?}", input_file)).into());
        }

        let target_language = &self.config.target_language;
        let output_path = FileManager::translated_output_path(input_file, target_language);
        if output_path.exists() && !force_overwrite {
            return Ok(RunStatus::Skipped(output_path));
        }

        info!(
            "SmartSub: {} - {} -> {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            target_language
        );

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        progress_bar.set_style(Self::bar_style("lines"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let result = self
            .service
            .process_file_with_progress(input_file, target_language, move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await;

        progress_bar.finish_and_clear();
        Ok(RunStatus::Translated(result?))
    }

    /// Run the workflow in folder mode, processing all subtitle files in a directory
    /// Files that already have a translation are skipped unless `force_overwrite` is set
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(AppError::File(format!("Input directory does not exist: {:?}", input_dir)).into());
        }

        let subtitle_files: Vec<PathBuf> = FileManager::find_files(&input_dir, "srt")?
            .into_iter()
            .filter(|path| !FileManager::is_generated_output(path))
            .collect();

        if subtitle_files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(subtitle_files.len() as u64));
        folder_pb.set_style(Self::bar_style("files"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for subtitle_file in &subtitle_files {
            if self.cancellation_token().is_cancelled() {
                warn!("Cancelled; {} file(s) left unprocessed", subtitle_files.len() - folder_pb.position() as usize);
                break;
            }

            let file_name = subtitle_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self
                .run_file_with_progress(subtitle_file, &multi_progress, force_overwrite)
                .await
            {
                Ok(RunStatus::Translated(outcome)) => {
                    summary.processed += 1;
                    summary.degraded_lines += outcome.degraded_lines;
                    self.report_outcome(&outcome);
                }
                Ok(RunStatus::Skipped(_)) => {
                    warn!("Skipping {}, translation already exists (use -f to force overwrite)", file_name);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors in {}",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );
        if summary.degraded_lines > 0 {
            warn!("{} line(s) kept their source text across all files", summary.degraded_lines);
        }

        Ok(summary)
    }

    fn report_outcome(&self, outcome: &ProcessOutcome) {
        info!(
            "Wrote {} ({} lines) in {}",
            outcome.output_path.display(),
            outcome.total_lines,
            Self::format_duration(outcome.elapsed)
        );
        info!("Analysis report: {}", outcome.analysis_path.display());
        if outcome.used_default_summary {
            info!("Content analysis was skipped or failed; the default summary was used");
        }
        if !outcome.is_complete() {
            warn!(
                "{} of {} lines are marked as failed in the output",
                outcome.degraded_lines, outcome.total_lines
            );
        }
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
