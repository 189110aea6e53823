/*!
 * Tests for the per-line retry policy
 */

use smartsub::errors::ProviderError;
use smartsub::providers::mock::MockProvider;
use smartsub::translation::port::translate_with_timeout;
use smartsub::translation::{CancellationToken, LineStatus, RetryPolicy, TranslationPort};
use std::time::Duration;

use crate::common::mock_providers::{ScriptedPort, TimedPort};

/// The paused clock lands on timer ticks, so allow one millisecond of rounding
fn assert_within_tick(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(1),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

/// Fail, fail, succeed: two sleeps of b and 2b, then the translation
#[tokio::test(start_paused = true)]
async fn test_attempt_withTwoFailures_shouldBackOffThenSucceed() {
    let base = Duration::from_millis(100);
    let port = TimedPort::new(MockProvider::fail_then_succeed(2));
    let policy = RetryPolicy::new(3, base);

    let result = policy
        .attempt(0, "Hello", || port.translate("Hello", "prompt", 0.7))
        .await;

    assert_eq!(result.status, LineStatus::Ok);
    assert_eq!(result.text, "[TRANSLATED] Hello");
    assert_eq!(result.attempts, 3);

    let times = port.call_times();
    assert_eq!(times.len(), 3);
    assert_within_tick(times[1] - times[0], base);
    assert_within_tick(times[2] - times[1], base * 2);
}

/// Every attempt empty: tagged source text after exactly max_retries calls
#[tokio::test(start_paused = true)]
async fn test_attempt_withEmptyPort_shouldExhaustAndTag() {
    let mock = MockProvider::empty();
    let policy = RetryPolicy::new(3, Duration::from_millis(10));

    let start = tokio::time::Instant::now();
    let result = policy
        .attempt(5, "Goodbye", || mock.translate("Goodbye", "prompt", 0.7))
        .await;

    assert_eq!(result.status, LineStatus::FailedEmpty);
    assert_eq!(result.text, "[translation failed] Goodbye");
    assert_eq!(result.position, 5);
    assert_eq!(mock.request_count(), 3);
    // Sleeps after attempts 1 and 2 only: 10ms + 20ms
    assert_within_tick(start.elapsed(), Duration::from_millis(30));
}

/// Errors on every attempt carry the last message in the tag
#[tokio::test(start_paused = true)]
async fn test_attempt_withFailingPort_shouldTagWithError() {
    let mock = MockProvider::failing();
    let policy = RetryPolicy::new(2, Duration::from_millis(1));

    let result = policy
        .attempt(0, "Hi", || mock.translate("Hi", "prompt", 0.7))
        .await;

    assert_eq!(result.status, LineStatus::FailedError);
    assert_eq!(
        result.text,
        "[translation error: API responded with error: 500 - Simulated failure on request 2] Hi"
    );
    assert!(result.is_degraded());
}

/// Whitespace-only responses count as empty, not as translations
#[tokio::test(start_paused = true)]
async fn test_attempt_withWhitespaceThenText_shouldRetry() {
    let port = ScriptedPort::new(vec![Ok("   \n".to_string()), Ok("Bonjour".to_string())]);
    let policy = RetryPolicy::new(3, Duration::from_millis(1));

    let result = policy
        .attempt(0, "Hello", || port.translate("Hello", "prompt", 0.7))
        .await;

    assert_eq!(result.text, "Bonjour");
    assert_eq!(result.attempts, 2);
    assert_eq!(port.remaining(), 0);
}

/// Timeouts are ordinary failed attempts
#[tokio::test(start_paused = true)]
async fn test_attempt_withTimeouts_shouldReportTimeout() {
    let mock = MockProvider::slow(10_000);
    let policy = RetryPolicy::new(2, Duration::from_millis(1));

    let result = policy
        .attempt(0, "Hi", || {
            translate_with_timeout(&mock, "Hi", "prompt", 0.7, Some(Duration::from_secs(1)))
        })
        .await;

    assert_eq!(result.status, LineStatus::FailedError);
    assert_eq!(result.detail, Some(ProviderError::Timeout(Duration::from_secs(1)).to_string()));
    assert_eq!(mock.request_count(), 2);
}

/// Cancelling during a backoff sleep ends the line immediately
#[tokio::test(start_paused = true)]
async fn test_attempt_cancelledDuringBackoff_shouldStop() {
    let cancel = CancellationToken::new();
    let mock = MockProvider::failing();
    let policy = RetryPolicy::new(3, Duration::from_secs(60)).with_cancellation(cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    });

    let start = tokio::time::Instant::now();
    let result = policy
        .attempt(0, "Hi", || mock.translate("Hi", "prompt", 0.7))
        .await;
    canceller.await.unwrap();

    assert_eq!(result.text, "[translation error: cancelled] Hi");
    assert_eq!(mock.request_count(), 1);
    assert!(start.elapsed() < Duration::from_secs(60));
}
