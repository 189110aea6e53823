/*!
 * Error types for the smartsub application.
 *
 * Only two conditions may abort the processing of a file: a file without any
 * subtitle block, and a result set whose length does not match its source.
 * Provider failures are absorbed per line by the retry policy and analysis
 * failures fall back to a default summary, so neither ever reaches the caller.
 */

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to a text-generation provider
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The operation was cancelled before the call was made
    #[error("cancelled")]
    Cancelled,
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The input parsed into zero subtitle blocks
    #[error("No translatable subtitles found in {0}")]
    NoTranslatableContent(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The run was cancelled; partial results are not written
    #[error("Translation cancelled")]
    Cancelled,

    /// The scheduler produced a result set that does not match its input
    #[error("Result count mismatch: expected {expected} results, got {actual}")]
    ReconstructionMismatch {
        /// Number of parsed subtitles
        expected: usize,
        /// Number of results handed to the reconstructor
        actual: usize,
    },
}

/// Errors surfaced by the application controller
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing input, unreadable directory or failed write
    #[error("File error: {0}")]
    File(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
