/*!
 * Tests for file utility functions
 */

use std::fs;
use anyhow::Result;
use storychunk::file_utils::{FileManager, OutputBatch};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(&temp_dir.path().to_path_buf(), "book.txt", "content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that find_files returns only matching files, sorted by name
#[test]
fn test_find_files_withMixedDirectory_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    common::create_test_file(&dir, "b.ks", "")?;
    common::create_test_file(&dir, "a.KS", "")?;
    common::create_test_file(&dir, "c.txt", "")?;
    fs::create_dir(dir.join("nested"))?;
    common::create_test_file(&dir.join("nested"), "d.ks", "")?;

    let files = FileManager::find_files(&dir, ".ks")?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.KS", "b.ks"]);
    Ok(())
}

/// Test that read_utf16 decodes script files
#[test]
fn test_read_utf16_withBom_shouldDecode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_utf16_file(&temp_dir.path().to_path_buf(), "s.ks", "@nm t=\"ロミオ\"\r\n")?;
    assert_eq!(FileManager::read_utf16(&path)?, "@nm t=\"ロミオ\"\r\n");
    Ok(())
}

/// Test that read_utf16 rejects files that are not UTF-16
#[test]
fn test_read_utf16_withOddByteCount_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(&temp_dir.path().to_path_buf(), "s.ks", "abc")?;
    assert!(FileManager::read_utf16(&path).is_err());
    Ok(())
}

/// Test that read_lossy replaces invalid bytes rather than failing
#[test]
fn test_read_lossy_withInvalidUtf8_shouldReplace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("book.txt");
    fs::write(&path, [b'O', b'k', 0xFF, b'.'])?;
    assert_eq!(FileManager::read_lossy(&path)?, "Ok\u{FFFD}.");
    Ok(())
}

/// Test that write_atomic creates parent directories and replaces content
#[test]
fn test_write_atomic_shouldCreateParentsAndOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("out.txt");

    FileManager::write_atomic(&path, "first")?;
    FileManager::write_atomic(&path, "second")?;
    assert_eq!(fs::read_to_string(&path)?, "second");
    Ok(())
}

/// Test that write_dir_atomic replaces the whole directory
#[test]
fn test_write_dir_atomic_shouldReplaceOldFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().join("Book");

    let first = vec![
        ("chunk_1.txt".to_string(), "one".to_string()),
        ("chunk_2.txt".to_string(), "two".to_string()),
    ];
    FileManager::write_dir_atomic(&dir, &first)?;
    FileManager::write_dir_atomic(&dir, &[("chunk_1.txt".to_string(), "only".to_string())])?;

    assert_eq!(fs::read_to_string(dir.join("chunk_1.txt"))?, "only");
    assert!(!dir.join("chunk_2.txt").exists());

    // Neither the staging directory nor the previous output is left behind
    let leftovers: Vec<_> = fs::read_dir(temp_dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name != "Book")
        .collect();
    assert!(leftovers.is_empty(), "unexpected entries: {:?}", leftovers);
    Ok(())
}

/// Test that a failed rewrite keeps the previous directory intact
#[test]
fn test_write_dir_atomic_withFailingWrite_shouldKeepPreviousOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().join("Book");
    FileManager::write_dir_atomic(&dir, &[("chunk_1.txt".to_string(), "kept".to_string())])?;

    let broken = vec![
        ("chunk_1.txt".to_string(), "new".to_string()),
        ("missing/chunk_2.txt".to_string(), "unwritable".to_string()),
    ];
    assert!(FileManager::write_dir_atomic(&dir, &broken).is_err());

    assert_eq!(fs::read_to_string(dir.join("chunk_1.txt"))?, "kept");
    let entries: Vec<_> = fs::read_dir(temp_dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries, vec!["Book".to_string()]);
    Ok(())
}

/// Test that a failing batch leaves no files behind
#[test]
fn test_output_batch_withFailingWrite_shouldRollBack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let blocker = common::create_test_file(&temp_dir.path().to_path_buf(), "blocker", "a file, not a dir")?;

    let mut batch = OutputBatch::new();
    batch.add(temp_dir.path().join("s_chunk_0.txt"), "ok".to_string());
    batch.add(blocker.join("s_chunk_1.txt"), "fails".to_string());
    assert_eq!(batch.len(), 2);

    assert!(batch.commit().is_err());
    assert!(!temp_dir.path().join("s_chunk_0.txt").exists());
    Ok(())
}

/// Test that a successful batch reports every path it wrote
#[test]
fn test_output_batch_commit_shouldReturnWrittenPaths() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut batch = OutputBatch::new();
    let first = temp_dir.path().join("s_chunk_0.txt");
    let second = temp_dir.path().join("roleplay").join("s_chunk_1.txt");
    batch.add(first.clone(), "a".to_string());
    batch.add(second.clone(), "b".to_string());
    assert_eq!(batch.paths().count(), 2);

    let written = batch.commit()?;
    assert_eq!(written, vec![first, second.clone()]);
    assert_eq!(fs::read_to_string(second)?, "b");
    Ok(())
}
