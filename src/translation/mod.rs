/*!
 * Context-aware subtitle translation.
 *
 * This module contains the two-phase translation pipeline. It is split into
 * several submodules:
 *
 * - `port`: The text-generation seam every provider implements
 * - `analyzer`: One-off whole-document content analysis
 * - `window`: Preceding/following context around each line
 * - `retry`: Bounded retry with exponential backoff
 * - `scheduler`: Bounded concurrent per-line translation
 * - `results`: Per-line results and the write-once result arena
 * - `prompts`: Prompt templates
 * - `cancel`: Cooperative cancellation
 * - `service`: File-level orchestration
 */

// Re-export main types for easier usage
pub use self::analyzer::ContentAnalyzer;
pub use self::cancel::CancellationToken;
pub use self::port::TranslationPort;
pub use self::results::{LineStatus, ResultSlots, TranslationResult};
pub use self::retry::RetryPolicy;
pub use self::scheduler::ConcurrentScheduler;
pub use self::service::{ProcessOutcome, TranslatedDocument, TranslationOptions, TranslationService};
pub use self::window::ContextWindow;

// Submodules
pub mod analyzer;
pub mod cancel;
pub mod port;
pub mod prompts;
pub mod results;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod window;
