/*!
 * Tests for error types and conversions
 */

use storychunk::errors::{AppError, ChunkError, ScriptError, TokenizerError};

#[test]
fn test_tokenizerError_loadFailed_shouldDisplayPathAndMessage() {
    let error = TokenizerError::LoadFailed {
        path: "models/tokenizer.json".to_string(),
        message: "No such file".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("models/tokenizer.json"));
    assert!(display.contains("No such file"));
}

#[test]
fn test_scriptError_unterminatedName_shouldDisplayLine() {
    let error = ScriptError::UnterminatedName {
        line_number: 12,
        line: "@nm t=\"Juliet".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("line 12"));
    assert!(display.contains("@nm t=\"Juliet"));
}

#[test]
fn test_scriptError_orphanDialogue_shouldDisplayLineNumber() {
    let display = format!("{}", ScriptError::OrphanDialogue { line_number: 3 });
    assert!(display.contains("line 3"));
}

#[test]
fn test_chunkError_fromTokenizerError_shouldWrap() {
    let error: ChunkError = TokenizerError::EncodeFailed("bad input".to_string()).into();
    assert!(matches!(error, ChunkError::Tokenizer(_)));
    assert!(format!("{}", error).contains("bad input"));
}

#[test]
fn test_appError_fromScriptError_shouldWrap() {
    let error: AppError = ScriptError::InvalidEncoding("odd byte count 3".to_string()).into();
    assert!(matches!(error, AppError::Script(_)));
    assert!(format!("{}", error).contains("odd byte count 3"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldKeepMessage() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    match error {
        AppError::Unknown(message) => assert_eq!(message, "something odd"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_chunkError_budgetTooSmall_shouldDisplayBudget() {
    assert!(format!("{}", ChunkError::BudgetTooSmall(1)).contains('1'));
}
