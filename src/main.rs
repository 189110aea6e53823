// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use smartsub::app_config::{self, Config, ContextMode, TranslationProvider};
use smartsub::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "lmstudio")]
    LMStudio,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate subtitle files (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for smartsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language code or name (e.g., 'zh', 'fr', 'Brazilian Portuguese')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of lines translated concurrently
    #[arg(short = 'j', long)]
    concurrent_requests: Option<usize>,

    /// Translate lines one at a time so every line sees the translations before it
    #[arg(long)]
    strict_context: bool,

    /// Term to keep consistent across the translation (repeatable)
    #[arg(short, long = "vocab", value_name = "TERM")]
    vocabulary: Vec<String>,

    /// API key for the provider
    #[arg(long, env = "SMARTSUB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the chat-completions endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// SmartSub - context-aware subtitle translation
///
/// Analyzes a subtitle file as a whole, then translates it line by line with
/// the surrounding lines as context, using an OpenAI-compatible model.
#[derive(Parser, Debug)]
#[command(name = "smartsub")]
#[command(version)]
#[command(about = "Context-aware AI subtitle translation")]
#[command(long_about = "SmartSub translates .srt subtitles with an OpenAI-compatible model.
A first pass summarizes the whole file; each line is then translated with that
summary and its ten neighbours on each side as context.

EXAMPLES:
    smartsub movie.srt                            # Translate using default config
    smartsub -f movie.srt                         # Force overwrite existing files
    smartsub -p ollama -m qwen2.5:7b movie.srt    # Use specific provider and model
    smartsub -t fr -v Winterfell -v Stark got.srt # French, with fixed terms
    smartsub -j 8 /subs/                          # Process a directory, 8 lines at a time
    smartsub --strict-context movie.srt           # Sequential, fully ordered context
    smartsub completions bash > smartsub.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

OUTPUT:
    <name>_translated_<lang>.srt   translated subtitles
    <name>_<lang>_analysis.txt     content analysis report

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    lmstudio  - LM Studio local server (http://localhost:1234/v1)
    ollama    - Ollama OpenAI-compatible endpoint (http://localhost:11434/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language code or name (e.g., 'zh', 'fr', 'Brazilian Portuguese')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of lines translated concurrently
    #[arg(short = 'j', long)]
    concurrent_requests: Option<usize>,

    /// Translate lines one at a time so every line sees the translations before it
    #[arg(long)]
    strict_context: bool,

    /// Term to keep consistent across the translation (repeatable)
    #[arg(short, long = "vocab", value_name = "TERM")]
    vocabulary: Vec<String>,

    /// API key for the provider
    #[arg(long, env = "SMARTSUB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the chat-completions endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself accepts everything; filtering happens through max_level
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Prefix symbol for log level
    fn get_symbol_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✖",
            Level::Warn => "⚠",
            Level::Info => "•",
            Level::Debug => "…",
            Level::Trace => "·",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_symbol_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the configured level is applied once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "smartsub", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - top-level args act as the translate command
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                target_language: cli.target_language,
                concurrent_requests: cli.concurrent_requests,
                strict_context: cli.strict_context,
                vocabulary: cli.vocabulary,
                api_key: cli.api_key,
                endpoint: cli.endpoint,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

/// Load the config file, or write a default one when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();

    let config_json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;

    Ok(config)
}

/// Apply command-line overrides on top of the loaded config
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(api_key) = &options.api_key {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }

    if let Some(endpoint) = &options.endpoint {
        config.translation.active_provider_config_mut().endpoint = endpoint.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(concurrent_requests) = options.concurrent_requests {
        config.translation.common.concurrent_requests = concurrent_requests;
    }

    if options.strict_context {
        config.translation.common.context_mode = ContextMode::Strict;
    }

    config.vocabulary.extend(options.vocabulary.iter().cloned());

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // A command-line level applies before the config is even read
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    if !options.input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    let controller = Controller::with_config(config)?;

    let cancel = controller.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending translations");
            cancel.cancel();
        }
    });

    controller.run(options.input_path.clone(), options.force_overwrite).await?;
    info!("Done");
    Ok(())
}
