/*!
 * Tests for concurrent per-line translation
 */

use smartsub::app_config::ContextMode;
use smartsub::providers::mock::MockProvider;
use smartsub::translation::{ConcurrentScheduler, LineStatus, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;

use crate::common;

fn scheduler_for(mock: &MockProvider, pool: usize) -> ConcurrentScheduler {
    ConcurrentScheduler::new(Arc::new(mock.clone()), "French")
        .with_concurrency(pool)
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
}

/// Completion order is random; result order is not
#[tokio::test(start_paused = true)]
async fn test_translateAll_withRandomLatency_shouldKeepInputOrder() {
    common::init_test_logger();
    let entries = common::numbered_entries(40);
    let mock = MockProvider::random_latency(50, 0.0);

    let results = scheduler_for(&mock, 5).translate_all(&entries, "summary", &[]).await;

    assert_eq!(results.len(), entries.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.position, i);
        assert_eq!(result.status, LineStatus::Ok);
        assert_eq!(result.text, format!("[TRANSLATED] line {}", i));
    }
    assert_eq!(mock.request_count(), 40);
}

/// 200 lines, pool of 5, 10% forced empties: every slot filled, bound respected
#[tokio::test(start_paused = true)]
async fn test_translateAll_stress_shouldFillEverySlotWithinPoolBound() {
    let entries = common::numbered_entries(200);
    let mock = MockProvider::random_latency(20, 0.1);

    let results = scheduler_for(&mock, 5).translate_all(&entries, "summary", &[]).await;

    assert_eq!(results.len(), 200);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.position, i);
        match result.status {
            LineStatus::Ok => assert_eq!(result.text, format!("[TRANSLATED] line {}", i)),
            LineStatus::FailedEmpty => assert_eq!(result.text, format!("[translation failed] line {}", i)),
            LineStatus::FailedError => panic!("unexpected error on line {}: {:?}", i, result.detail),
        }
        assert!((1..=3).contains(&result.attempts));
    }

    assert!(mock.max_in_flight() <= 5, "pool bound exceeded: {}", mock.max_in_flight());
    // At least one call per line; empties add retries
    assert!(mock.request_count() >= 200);
}

/// Failed lines never abort the rest of the document
#[tokio::test(start_paused = true)]
async fn test_translateAll_withFailingPort_shouldDegradeEveryLine() {
    let entries = common::numbered_entries(6);
    let mock = MockProvider::failing();

    let results = scheduler_for(&mock, 3).translate_all(&entries, "summary", &[]).await;

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.status == LineStatus::FailedError));
    assert!(results[2].text.ends_with("] line 2"));
    assert_eq!(mock.request_count(), 18);
}

/// Every line prompt carries the summary, the vocabulary and the following lines
#[tokio::test]
async fn test_translateAll_shouldBuildContextualPrompts() {
    let entries = common::numbered_entries(3);
    let mock = MockProvider::working();
    let vocabulary = vec!["Winterfell".to_string()];

    scheduler_for(&mock, 1)
        .translate_all(&entries, "A fantasy drama.", &vocabulary)
        .await;

    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    let first = calls.iter().find(|c| c.text == "line 0").unwrap();
    assert!(first.system_prompt.contains("A fantasy drama."));
    assert!(first.system_prompt.contains("Winterfell"));
    assert!(first.system_prompt.contains("Text to translate: line 0"));
    assert!(first.system_prompt.contains("untranslated):\nline 1\nline 2"));
    assert!(calls.iter().all(|c| (c.temperature - 0.7).abs() < f32::EPSILON));
}

/// Strict mode runs one line at a time
#[tokio::test(start_paused = true)]
async fn test_translateAll_withStrictMode_shouldNeverOverlapCalls() {
    let entries = common::numbered_entries(12);
    let mock = MockProvider::random_latency(10, 0.0);

    let results = scheduler_for(&mock, 5)
        .with_context_mode(ContextMode::Strict)
        .translate_all(&entries, "summary", &[])
        .await;

    assert_eq!(results.len(), 12);
    assert_eq!(mock.max_in_flight(), 1);

    // The last line's prompt sees the ten translated lines before it
    let calls = mock.calls();
    let last = &calls[11].system_prompt;
    assert!(last.contains("[TRANSLATED] line 1\n"));
    assert!(last.contains("[TRANSLATED] line 10\n"));
    assert!(!last.contains("[TRANSLATED] line 0\n"));
}
