/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use chrono::{Local, TimeZone};
use std::fs;
use std::path::Path;
use notemend::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "note.md", "内容。")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

#[test]
fn test_modifiedOutputPath_shouldAppendSuffixToStem() {
    let output = FileManager::modified_output_path(Path::new("/notes/周报.md"));
    assert_eq!(output, Path::new("/notes/周报_modified.md"));
}

#[test]
fn test_backupPath_shouldAppendBakToFullName() {
    let backup = FileManager::backup_path(Path::new("/notes/a.md"));
    assert_eq!(backup, Path::new("/notes/a.md.bak"));
}

#[test]
fn test_organizedNotesPath_shouldUseTimestampInInputDirectory() {
    let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
    let path = FileManager::organized_notes_path(Path::new("/notes/dump.md"), now);
    assert_eq!(path, Path::new("/notes/organized_notes_2024-03-05_14-07-09.md"));
}

#[test]
fn test_findMarkdownFiles_shouldRecurseAndApplyExclusions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "b.md", "b")?;
    common::create_test_file(root, "sub/a.md", "a")?;
    common::create_test_file(root, "sub/a.md.bak", "old")?;
    common::create_test_file(root, "all_combined.md", "skip")?;
    common::create_test_file(root, "readme.txt", "skip")?;

    let files = FileManager::find_markdown_files(root, "_combined")?;

    assert_eq!(files, vec![root.join("b.md"), root.join("sub/a.md")]);
    Ok(())
}

#[test]
fn test_replaceWithBackup_shouldKeepOriginal() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "note.md", "原文。")?;

    let backup = FileManager::replace_with_backup(&file, "修改后。")?;

    assert_eq!(fs::read_to_string(&backup)?, "原文。");
    assert_eq!(fs::read_to_string(&file)?, "修改后。");
    Ok(())
}

#[test]
fn test_writeToFile_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("x/y/out.md");

    FileManager::write_to_file(&nested, "ok")?;
    assert_eq!(FileManager::read_to_string(&nested)?, "ok");
    Ok(())
}

#[test]
fn test_readToString_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("does/not/exist.md").is_err());
}

#[test]
fn test_replaceWithBackup_withExistingBackup_shouldKeepOriginal() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let note = common::create_test_file(temp_dir.path(), "note.md", "第一版。")?;
    common::create_test_file(temp_dir.path(), "note.md.bak", "原稿。")?;

    let backup = FileManager::replace_with_backup(&note, "第二版。")?;

    assert_eq!(backup, FileManager::backup_path(&note));
    assert_eq!(fs::read_to_string(&note)?, "第二版。");
    assert_eq!(fs::read_to_string(&backup)?, "原稿。");
    Ok(())
}
