/*!
 * Provider implementations for text-generation services.
 *
 * This module contains the clients that back the translation port:
 * - OpenAI: any OpenAI-compatible chat-completions server (OpenAI, LM Studio, Ollama)
 * - Mock: scripted in-process provider for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for HTTP-backed LLM providers
///
/// The translation pipeline does not use this trait directly; it talks to
/// `translation::TranslationPort`, which each provider implements on top of
/// its own request and response types.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

pub mod mock;
pub mod openai;
