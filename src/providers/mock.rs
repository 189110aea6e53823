/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scripted translation port that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged echo of the input
 * - `MockProvider::uppercase()` - Always succeeds with the input uppercased
 * - `MockProvider::empty()` - Always returns an empty response
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::fail_then_succeed(n)` - Fails `n` times, then works
 * - `MockProvider::random_latency(max_ms, empty_rate)` - Jittered, sometimes empty
 * - `MockProvider::slow(ms)` - Works after a fixed delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::translation::TranslationPort;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[TRANSLATED] <text>`
    Working,
    /// Always succeeds with the input uppercased
    Uppercase,
    /// Returns an empty response
    Empty,
    /// Always fails with an API error
    Failing,
    /// Fails for the first `failures` calls, then works
    FailThenSucceed { failures: usize },
    /// Sleeps a random delay up to `max_delay_ms`; returns empty with probability `empty_rate`
    RandomLatency { max_delay_ms: u64, empty_rate: f64 },
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// A recorded call to the mock
#[derive(Debug, Clone)]
pub struct MockCall {
    pub text: String,
    pub system_prompt: String,
    pub temperature: f32,
}

/// Mock provider for testing translation behavior
///
/// Clones share counters and the call log.
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Calls currently inside `translate`
    in_flight: Arc<AtomicUsize>,
    /// Highest observed value of `in_flight`
    max_in_flight: Arc<AtomicUsize>,
    /// Every call received, in arrival order
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

/// Decrements the in-flight counter when a call finishes, including on cancellation
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that uppercases its input
    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails `failures` times before succeeding
    pub fn fail_then_succeed(failures: usize) -> Self {
        Self::new(MockBehavior::FailThenSucceed { failures })
    }

    /// Create a mock with random latency and a forced empty-response rate
    pub fn random_latency(max_delay_ms: u64, empty_rate: f64) -> Self {
        Self::new(MockBehavior::RandomLatency {
            max_delay_ms,
            empty_rate,
        })
    }

    /// Create a mock that answers after a fixed delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator used by the succeeding behaviors
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of the recorded calls
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    fn success_text(&self, text: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text),
            None if self.behavior == MockBehavior::Uppercase => text.to_uppercase(),
            None => format!("[TRANSLATED] {}", text),
        }
    }

    fn mock_error(count: usize) -> ProviderError {
        ProviderError::ApiError {
            status_code: 500,
            message: format!("Simulated failure on request {}", count + 1),
        }
    }
}

#[async_trait]
impl TranslationPort for MockProvider {
    async fn translate(&self, text: &str, system_prompt: &str, temperature: f32) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(MockCall {
            text: text.to_string(),
            system_prompt: system_prompt.to_string(),
            temperature,
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        match self.behavior {
            MockBehavior::Working | MockBehavior::Uppercase => Ok(self.success_text(text)),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Failing => Err(Self::mock_error(count)),

            MockBehavior::FailThenSucceed { failures } => {
                if count < failures {
                    Err(Self::mock_error(count))
                } else {
                    Ok(self.success_text(text))
                }
            }

            MockBehavior::RandomLatency {
                max_delay_ms,
                empty_rate,
            } => {
                let (delay, empty) = {
                    let mut rng = rand::rng();
                    (rng.random_range(0..=max_delay_ms), rng.random_bool(empty_rate))
                };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                if empty {
                    Ok(String::new())
                } else {
                    Ok(self.success_text(text))
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.success_text(text))
            }
        }
    }
}
