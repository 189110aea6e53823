/*!
 * Tests for the content analysis pass
 */

use smartsub::providers::mock::MockProvider;
use smartsub::translation::ContentAnalyzer;
use smartsub::translation::analyzer::MIN_ANALYSIS_CHARS;
use std::sync::Arc;

use crate::common;

const LONG_EXCERPT: &str = "Jon walks north to the Wall.\nThe Night's Watch greets him coldly.\nWinter is coming.";

/// Short documents never reach the port
#[tokio::test]
async fn test_analyze_withShortExcerpt_shouldSkipPort() {
    common::init_test_logger();
    let mock = MockProvider::working();
    let analyzer = ContentAnalyzer::new(Arc::new(mock.clone()), "French", 0.3);

    let excerpt = "x".repeat(MIN_ANALYSIS_CHARS - 1);
    assert!(analyzer.analyze(&excerpt, &[]).await.is_none());
    // Padding whitespace does not count towards the threshold
    assert!(analyzer.analyze(&format!("   {}   ", excerpt), &[]).await.is_none());
    assert_eq!(mock.request_count(), 0);
}

/// Exactly the threshold is long enough
#[tokio::test]
async fn test_analyze_atThreshold_shouldCallPortOnce() {
    let mock = MockProvider::uppercase();
    let analyzer = ContentAnalyzer::new(Arc::new(mock.clone()), "French", 0.3);

    let excerpt = "y".repeat(MIN_ANALYSIS_CHARS);
    let summary = analyzer.analyze(&excerpt, &[]).await;
    assert_eq!(summary, Some("Y".repeat(MIN_ANALYSIS_CHARS)));
    assert_eq!(mock.request_count(), 1);
}

/// Vocabulary and target language reach the analysis prompt
#[tokio::test]
async fn test_analyze_withVocabulary_shouldIncludeTermsInPrompt() {
    let mock = MockProvider::working();
    let analyzer = ContentAnalyzer::new(Arc::new(mock.clone()), "Spanish", 0.3);
    let vocabulary = vec!["Night's Watch".to_string(), "Jon Snow".to_string()];

    let summary = analyzer.analyze(LONG_EXCERPT, &vocabulary).await;
    assert!(summary.is_some());

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, LONG_EXCERPT);
    assert!(calls[0].system_prompt.contains("Night's Watch\nJon Snow"));
    assert!(calls[0].system_prompt.contains("Spanish"));
    assert!(calls[0].system_prompt.contains(LONG_EXCERPT));
}

/// An empty reply means "no summary"
#[tokio::test]
async fn test_analyze_withEmptyPort_shouldReturnNone() {
    let analyzer = ContentAnalyzer::new(Arc::new(MockProvider::empty()), "French", 0.3);
    assert!(analyzer.analyze(LONG_EXCERPT, &[]).await.is_none());
}

/// A hung analysis call is bounded by the timeout
#[tokio::test(start_paused = true)]
async fn test_analyze_withSlowPort_shouldTimeOutToNone() {
    let analyzer = ContentAnalyzer::new(Arc::new(MockProvider::slow(120_000)), "French", 0.3)
        .with_timeout(std::time::Duration::from_secs(30));
    assert!(analyzer.analyze(LONG_EXCERPT, &[]).await.is_none());
}
