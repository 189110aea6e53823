/*!
 * Integration tests for the application controller
 */

use anyhow::Result;
use std::sync::Arc;

use smartsub::app_config::Config;
use smartsub::app_controller::{Controller, FolderSummary, RunStatus};
use smartsub::errors::AppError;
use smartsub::providers::mock::MockProvider;

use crate::common;

fn test_config(target_language: &str) -> Config {
    let mut config = Config::default();
    config.target_language = target_language.to_string();
    config.translation.common.retry_backoff_ms = 1;
    config
}

/// Existing translations are skipped unless overwriting is forced
#[tokio::test]
async fn test_runFile_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let mock = MockProvider::working();
    let controller = Controller::with_port(test_config("fr"), Arc::new(mock.clone()));

    let first = controller.run_file(input.clone(), false).await?;
    assert!(matches!(first, RunStatus::Translated(_)));
    let calls_after_first = mock.request_count();

    let second = controller.run_file(input.clone(), false).await?;
    match second {
        RunStatus::Skipped(path) => assert_eq!(path, temp_dir.path().join("movie_translated_fr.srt")),
        other => panic!("expected skip, got {:?}", other),
    }
    assert_eq!(mock.request_count(), calls_after_first);

    let forced = controller.run_file(input, true).await?;
    assert!(matches!(forced, RunStatus::Translated(_)));
    assert!(mock.request_count() > calls_after_first);
    Ok(())
}

/// Folder mode translates sources, ignores generated files and counts failures
#[tokio::test]
async fn test_runFolder_shouldProcessSourcesAndIgnoreOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "a.srt")?;
    common::create_test_subtitle(temp_dir.path(), "b.srt")?;
    common::create_test_file(temp_dir.path(), "broken.srt", "no blocks here")?;
    // Looks like a previous run's output; must not be re-translated
    common::create_test_subtitle(temp_dir.path(), "old_translated_de.srt")?;

    let controller = Controller::with_port(test_config("fr"), Arc::new(MockProvider::working()));
    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;

    assert_eq!(
        summary,
        FolderSummary {
            processed: 2,
            skipped: 0,
            failed: 1,
            degraded_lines: 0,
        }
    );
    assert!(temp_dir.path().join("a_translated_fr.srt").exists());
    assert!(temp_dir.path().join("b_fr_analysis.txt").exists());
    assert!(!temp_dir.path().join("old_translated_de_translated_fr.srt").exists());
    Ok(())
}

/// A folder without subtitles is an error
#[tokio::test]
async fn test_runFolder_withNoSubtitles_shouldError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.txt", "hi")?;

    let controller = Controller::with_port(test_config("fr"), Arc::new(MockProvider::working()));
    assert!(controller.run_folder(temp_dir.path().to_path_buf(), false).await.is_err());
    Ok(())
}

/// A missing input file is reported, not silently skipped
#[test]
fn test_run_withMissingInput_shouldError() {
    let controller = Controller::with_port(test_config("fr"), Arc::new(MockProvider::working()));
    let result = tokio_test::block_on(async { controller.run("/no/such/file.srt".into(), false).await });

    let err = match result {
        Ok(()) => panic!("missing input must fail"),
        Err(e) => e,
    };
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::File(_))));
}

/// An interrupted run fails and does not block the next one
#[tokio::test]
async fn test_runFile_afterCancellation_shouldNotLeaveSkippableOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let interrupted = Controller::with_port(test_config("fr"), Arc::new(MockProvider::working()));
    interrupted.cancellation_token().cancel();
    assert!(interrupted.run_file(input.clone(), false).await.is_err());
    assert!(!temp_dir.path().join("movie_translated_fr.srt").exists());

    let rerun = Controller::with_port(test_config("fr"), Arc::new(MockProvider::working()));
    let status = rerun.run_file(input, false).await?;
    assert!(matches!(status, RunStatus::Translated(_)));
    Ok(())
}
