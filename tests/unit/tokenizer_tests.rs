/*!
 * Tests for the tokenizer adapters
 */

use anyhow::Result;
use storychunk::app_config::{TokenizerConfig, TokenizerKind};
use storychunk::tokenizer::{load_tokenizer, HuggingFaceTokenizer, TextTokenizer, WordTokenizer};
use crate::common;

// Minimal word-level model in the tokenizer.json format
const WORD_LEVEL_MODEL: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [],
  "normalizer": null,
  "pre_tokenizer": {"type": "Whitespace"},
  "post_processor": null,
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": {"[UNK]": 0, "hello": 1, "world": 2, ".": 3},
    "unk_token": "[UNK]"
  }
}"#;

#[test]
fn test_loadTokenizer_withWordKind_shouldNeedNoModel() -> Result<()> {
    let config = TokenizerConfig {
        kind: TokenizerKind::Word,
        path: "ignored.json".to_string(),
    };
    let tokenizer = load_tokenizer(&config)?;
    assert_eq!(tokenizer.count("Romeo, Romeo.")?, 4);
    Ok(())
}

#[test]
fn test_huggingFace_withWordLevelModel_shouldCountAndDecode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(&temp_dir.path().to_path_buf(), "tokenizer.json", WORD_LEVEL_MODEL)?;

    let tokenizer = HuggingFaceTokenizer::from_file(&path)?;
    assert_eq!(tokenizer.count("")?, 0);
    assert_eq!(tokenizer.count("hello world.")?, 3);

    let tokens = tokenizer.tokenize("hello world")?;
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].piece(), "world");
    assert_eq!(tokenizer.decode(&tokens)?, "hello world");
    Ok(())
}

#[test]
fn test_huggingFace_withGarbageModel_shouldFailToLoad() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(&temp_dir.path().to_path_buf(), "tokenizer.json", "{}")?;
    assert!(HuggingFaceTokenizer::from_file(&path).is_err());
    Ok(())
}

#[test]
fn test_wordTokenizer_asTraitObject_shouldAgreeWithConcreteType() -> Result<()> {
    let boxed: Box<dyn TextTokenizer> = Box::new(WordTokenizer::new());
    let text = "Wherefore art thou Romeo?";
    assert_eq!(boxed.count(text)?, WordTokenizer.count(text)?);
    assert_eq!(boxed.decode(&boxed.tokenize(text)?)?, text);
    Ok(())
}

#[test]
fn test_wordTokenizer_withNonAscii_shouldKeepRunsTogether() -> Result<()> {
    let tokens = WordTokenizer.tokenize("空／昼")?;
    let pieces: Vec<&str> = tokens.iter().map(|t| t.piece()).collect();
    assert_eq!(pieces, vec!["▁空", "／", "昼"]);
    Ok(())
}
