/*!
 * # SmartSub - context-aware subtitle translation
 *
 * A Rust library for translating SRT subtitles with an LLM, one line at a
 * time, while keeping the narrative consistent between neighbouring lines.
 *
 * ## Features
 *
 * - Whole-document content analysis injected into every line prompt
 * - Ten lines of context on each side of the line being translated
 * - Bounded concurrent translation with per-line retry and backoff
 * - Failed lines keep their source text with a visible failure tag
 * - Exact preservation of subtitle indices and timings
 * - Custom vocabulary for names and terms that must stay fixed
 * - Any OpenAI-compatible backend (OpenAI, LM Studio, Ollama)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and reconstruction
 * - `translation`: The translation pipeline:
 *   - `translation::analyzer`: Content analysis pass
 *   - `translation::window`: Context windows
 *   - `translation::retry`: Retry policy
 *   - `translation::scheduler`: Concurrent per-line translation
 *   - `translation::service`: File-level orchestration
 * - `file_utils`: File system operations and encoding detection
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Text-generation backends:
 *   - `providers::openai`: OpenAI-compatible chat-completions client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use language_utils::{display_language, get_language_name, normalize_to_part2t};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::{TranslationPort, TranslationService};
