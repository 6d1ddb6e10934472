/*!
 * Note classification through the controller
 */

use anyhow::Result;
use std::fs;
use notemend::notes::{split_notes, DEFAULT_NOTE_DELIMITER};
use notemend::providers::mock::MockProvider;
use crate::common;

fn category_for(request: &notemend::providers::CompletionRequest) -> String {
    if request.user.contains("github.com") {
        "Github项目".to_string()
    } else if request.user.contains("《") {
        "书籍推荐".to_string()
    } else {
        "其他".to_string()
    }
}

#[tokio::test]
async fn test_classifyFile_shouldWriteGroupedReport() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let dump = "https://github.com/foo/bar 一个好用的工具\n%%%\n推荐阅读《人类简史》\n%%%\n今天天气不错\n%%%\nhttps://github.com/baz/qux\n%%%\n";
    let input = common::create_test_file(temp_dir.path(), "dump.md", dump)?;

    let provider = MockProvider::echo().with_custom_response(category_for);
    let controller = common::mock_controller(common::test_config(), &provider);

    let output = controller.classify_file(&input).await?;

    assert_eq!(output.parent(), Some(temp_dir.path()));
    let name = output.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("organized_notes_") && name.ends_with(".md"), "{}", name);

    let report = fs::read_to_string(&output)?;
    assert!(report.contains("- 总笔记数量：4"));
    assert!(report.contains("- Github项目: 2 条 (50.0%)"));
    assert!(report.contains("## 书籍推荐\n推荐阅读《人类简史》"));
    assert_eq!(provider.request_count(), 4);

    let first = &provider.requests()[0];
    assert_eq!(first.system, common::test_config().classification.system_prompt);
    Ok(())
}

#[tokio::test]
async fn test_classifyFile_withNoNotes_shouldFailWithoutRequests() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "empty.md", "%%%\n \n%%%")?;

    let provider = MockProvider::echo();
    let controller = common::mock_controller(common::test_config(), &provider);

    assert!(controller.classify_file(&input).await.is_err());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[test]
fn test_splitNotes_withCustomDelimiter_shouldMatchConfig() {
    let mut config = common::test_config();
    config.classification.note_delimiter = "@@".to_string();

    let notes = split_notes("甲@@乙", &config.classification.note_delimiter);
    assert_eq!(notes, vec!["甲", "乙"]);
    assert_eq!(split_notes("甲@@乙", DEFAULT_NOTE_DELIMITER).len(), 1);
}
