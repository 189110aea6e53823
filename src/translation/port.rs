/*!
 * The text-generation seam the translation pipeline talks to.
 */

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::ProviderError;

/// A service that turns (text, system prompt, temperature) into a completion
///
/// Implementations may fail with transport, decode or API errors; callers
/// retry through `RetryPolicy` and never see these errors surface.
#[async_trait]
pub trait TranslationPort: Send + Sync {
    /// Send one prompt and return the raw completion text
    async fn translate(&self, text: &str, system_prompt: &str, temperature: f32) -> Result<String, ProviderError>;
}

/// Call the port with an optional per-call timeout
///
/// Empty input text returns an empty string without calling the port.
pub async fn translate_with_timeout(
    port: &dyn TranslationPort,
    text: &str,
    system_prompt: &str,
    temperature: f32,
    timeout: Option<Duration>,
) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }

    match timeout {
        Some(limit) => tokio::time::timeout(limit, port.translate(text, system_prompt, temperature))
            .await
            .map_err(|_| ProviderError::Timeout(limit))?,
        None => port.translate(text, system_prompt, temperature).await,
    }
}
