/*!
 * End-to-end tests for converting books into chunk files
 */

use std::fs;
use anyhow::Result;
use storychunk::prose::{BookConverter, OversizePolicy};
use storychunk::tokenizer::{TextTokenizer, WordTokenizer};
use crate::common;

fn read_chunks(dir: &std::path::Path) -> Result<Vec<String>> {
    let mut chunks = Vec::new();
    let mut index = 1;
    loop {
        let path = dir.join(format!("chunk_{}.txt", index));
        if !path.exists() {
            break;
        }
        chunks.push(fs::read_to_string(path)?);
        index += 1;
    }
    Ok(chunks)
}

/// Test converting a small book end to end
#[test]
fn test_convertFile_withSampleBook_shouldWriteOneIndexedChunks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let book = common::create_test_book(&dir, "April.txt")?;
    let output_root = dir.join("out");

    let converter = BookConverter::new(&WordTokenizer, 200, OversizePolicy::Split);
    let report = converter.convert_file(&book, &output_root)?;

    assert_eq!(report.document, "April");
    assert_eq!(report.paragraphs, 4);
    assert_eq!(report.chunks, 1);
    assert_eq!(report.output_dir, output_root.join("April"));

    let chunks = read_chunks(&report.output_dir)?;
    assert_eq!(chunks.len(), 1);
    let text = &chunks[0];
    assert!(text.contains("It was a bright cold day in April, and the clocks were striking thirteen."));
    assert!(text.contains("He met Mr. Smith at the corner."));
    assert!(text.contains("'Are you coming?' she asked."));
    assert!(text.ends_with("The rain fell all night and nobody in the village slept until the bells rang at dawn."));
    assert!(!text.contains('\u{2018}'));
    Ok(())
}

/// Test that running twice over the same input produces identical output
#[test]
fn test_convertFile_twice_shouldBeByteIdentical() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let content: String = (0..80)
        .map(|i| format!("Paragraph {} begins with a capital and\nends with a stop.\n", i))
        .collect();
    let book = common::create_test_file(&dir, "Long.txt", &content)?;

    let converter = BookConverter::new(&WordTokenizer, 60, OversizePolicy::Split);
    let first = converter.convert_file(&book, &dir.join("a"))?;
    let second = converter.convert_file(&book, &dir.join("b"))?;

    let first_chunks = read_chunks(&first.output_dir)?;
    let second_chunks = read_chunks(&second.output_dir)?;
    assert!(first_chunks.len() > 1);
    assert_eq!(first_chunks, second_chunks);
    assert!(first_chunks.last().unwrap().ends_with("Paragraph 79 begins with a capital and ends with a stop."));
    Ok(())
}

/// Test the drop policy against the split policy on an oversized paragraph
#[test]
fn test_convertFile_withOversizedParagraph_shouldHonourPolicy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let long_line = (0..50).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
    let content = format!("Short start.\n{}.\nShort end.\n", long_line.replacen('w', "W", 1));
    let book = common::create_test_file(&dir, "Mixed.txt", &content)?;

    let dropping = BookConverter::new(&WordTokenizer, 20, OversizePolicy::Drop);
    let report = dropping.convert_file(&book, &dir.join("dropped"))?;
    assert_eq!(report.dropped, 1);
    let joined = read_chunks(&report.output_dir)?.join("\n");
    assert_eq!(joined, "Short start.\nShort end.");

    let splitting = BookConverter::new(&WordTokenizer, 20, OversizePolicy::Split);
    let report = splitting.convert_file(&book, &dir.join("split"))?;
    assert_eq!(report.split, 1);
    let chunks = read_chunks(&report.output_dir)?;
    for chunk in &chunks {
        for item in chunk.split('\n') {
            assert!(WordTokenizer.count(item)? <= 19);
        }
    }
    assert!(chunks.concat().contains("w49."));
    Ok(())
}

/// Test that reconverting replaces stale chunk files
#[test]
fn test_convertFile_withPreviousOutput_shouldReplaceDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let output_root = dir.join("out");
    let stale_dir = output_root.join("Tiny");
    fs::create_dir_all(&stale_dir)?;
    common::create_test_file(&stale_dir, "chunk_7.txt", "stale")?;

    let book = common::create_test_file(&dir, "Tiny.txt", "Just one line.\n")?;
    let converter = BookConverter::new(&WordTokenizer, 50, OversizePolicy::Split);
    converter.convert_file(&book, &output_root)?;

    assert!(!stale_dir.join("chunk_7.txt").exists());
    assert_eq!(fs::read_to_string(stale_dir.join("chunk_1.txt"))?, "Just one line.");
    Ok(())
}
