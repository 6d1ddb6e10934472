/*!
 * End-to-end correction through the controller with a mock provider
 */

use anyhow::Result;
use std::fs;
use notemend::app_config::Config;
use notemend::providers::mock::MockProvider;
use notemend::{BatchSummary, Controller, FileOutcome};
use crate::common;

#[tokio::test]
async fn test_correctFile_shouldWriteModifiedCopy() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let note = common::sample_note(6);
    let input = common::create_test_file(temp_dir.path(), "周记.md", &note)?;

    let provider = MockProvider::echo();
    let controller = common::mock_controller(common::test_config(), &provider);

    let outcome = controller.correct_file(&input, None, false, false).await?;

    let expected_output = temp_dir.path().join("周记_modified.md");
    assert_eq!(outcome, FileOutcome::Written { output: expected_output.clone(), segments: 1 });
    assert_eq!(fs::read_to_string(&expected_output)?, note);
    assert_eq!(fs::read_to_string(&input)?, note);
    Ok(())
}

#[tokio::test]
async fn test_correctFile_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "a.md", "新内容。")?;
    let output = common::create_test_file(temp_dir.path(), "a_modified.md", "旧结果")?;

    let provider = MockProvider::echo();
    let controller = common::mock_controller(common::test_config(), &provider);

    let skipped = controller.correct_file(&input, None, false, false).await?;
    assert!(matches!(skipped, FileOutcome::Skipped { .. }));
    assert_eq!(provider.request_count(), 0);

    controller.correct_file(&input, Some(output.clone()), false, true).await?;
    assert_eq!(fs::read_to_string(&output)?, "新内容。");
    Ok(())
}

#[tokio::test]
async fn test_correctFile_withFailure_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "long.md", &"A。B。C。D。E。".repeat(3))?;

    let mut config = common::test_config();
    config.correction.max_length = 10;
    let controller = common::mock_controller(config, &MockProvider::fail_on(2));

    assert!(controller.correct_file(&input, None, false, false).await.is_err());
    assert!(!temp_dir.path().join("long_modified.md").exists());
    Ok(())
}

#[tokio::test]
async fn test_correctText_byHeading_shouldCorrectSectionsSeparately() -> Result<()> {
    let provider = MockProvider::echo();
    let controller = common::mock_controller(common::test_config(), &provider);

    let document = "## 一\n第一节内容。\n## 二\n第二节内容。\n";
    let outcome = controller.correct_text(document, true).await?;

    assert_eq!(outcome.text, "## 一\n第一节内容。\n\n## 二\n第二节内容。");
    assert_eq!(outcome.segments, 2);
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_runFolder_shouldCorrectInPlaceWithBackups() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let first = common::create_test_file(root, "one.md", "第一篇。")?;
    let second = common::create_test_file(root, "nested/two.md", "第二篇。")?;
    common::create_test_file(root, "done.md", "已处理。")?;
    common::create_test_file(root, "done.md.bak", "原稿。")?;
    common::create_test_file(root, "all_combined.md", "合集。")?;

    let provider = MockProvider::echo().with_custom_response(|request| {
        request.user.replace("篇", "章").split_once("：").map(|(_, rest)| rest.to_string()).unwrap_or_default()
    });
    let controller = common::mock_controller(common::test_config(), &provider);

    let summary = controller.run_folder(root).await?;

    assert_eq!(summary, BatchSummary { processed: 2, skipped: 1, failed: 0 });
    assert_eq!(fs::read_to_string(&first)?, "第一章。");
    assert_eq!(fs::read_to_string(root.join("one.md.bak"))?, "第一篇。");
    assert_eq!(fs::read_to_string(&second)?, "第二章。");
    assert_eq!(fs::read_to_string(root.join("done.md"))?, "已处理。");
    assert_eq!(fs::read_to_string(root.join("all_combined.md"))?, "合集。");
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_runFolder_twiceWithoutSkipping_shouldPreserveFirstBackup() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let note = common::create_test_file(root, "a.md", "原稿。")?;

    let provider = MockProvider::echo().with_custom_response(|request| {
        let inner = request.user
            .split_once("<note>")
            .map(|(_, rest)| rest.trim_end_matches("</note>").to_string())
            .unwrap_or_default();
        format!("{}改", inner)
    });
    let mut config = common::test_config();
    config.batch.skip_existing = false;
    let controller = common::mock_controller(config, &provider);

    let first = controller.run_folder(root).await?;
    let second = controller.run_folder(root).await?;

    assert_eq!(first, BatchSummary { processed: 1, skipped: 0, failed: 0 });
    assert_eq!(second, BatchSummary { processed: 1, skipped: 0, failed: 0 });
    assert_eq!(fs::read_to_string(&note)?, "原稿。改改");
    assert_eq!(fs::read_to_string(root.join("a.md.bak"))?, "原稿。");
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withFailingProvider_shouldCountFailuresAndKeepOriginals() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "x.md", "内容。")?;

    let controller = common::mock_controller(common::test_config(), &MockProvider::failing());
    let summary = controller.run_folder(temp_dir.path()).await?;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.to_string(), "Folder processing completed: 1 files, 0 processed, 0 skipped, 1 errors");
    assert_eq!(fs::read_to_string(&file)?, "内容。");
    assert!(!temp_dir.path().join("x.md.bak").exists());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withMissingDirectory_shouldFail() {
    let controller = common::mock_controller(common::test_config(), &MockProvider::echo());
    assert!(controller.run_folder(std::path::Path::new("/definitely/not/here")).await.is_err());
}

#[test]
fn test_previewSplit_shouldUseConfiguredLength() {
    let mut config = Config::default();
    config.correction.max_length = 10;
    let controller = common::mock_controller(config, &MockProvider::echo());

    let document = "A。B。C。D。E。".repeat(2);
    let segments = controller.preview_split(&document);
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| s.char_len() == 10));
}

#[test]
fn test_buildProvider_shouldFollowConfiguredBackend() -> Result<()> {
    let mut config = common::test_config();
    assert_eq!(Controller::build_provider(&config)?.name(), "Volcengine ARK");

    config.service.provider = notemend::app_config::CompletionProvider::Ollama;
    assert_eq!(Controller::build_provider(&config)?.name(), "Ollama");
    Ok(())
}
