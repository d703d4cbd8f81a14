/*!
 * Error types for the storychunk application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the tokenizer adapter
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The tokenizer model could not be loaded
    #[error("Failed to load tokenizer from {path}: {message}")]
    LoadFailed {
        /// Path of the model file
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Encoding text into tokens failed
    #[error("Tokenization failed: {0}")]
    EncodeFailed(String),

    /// Decoding tokens back into text failed
    #[error("Token decoding failed: {0}")]
    DecodeFailed(String),
}

/// Errors that can occur while reading or parsing a script file
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The file is not valid UTF-16
    #[error("Invalid UTF-16 script file: {0}")]
    InvalidEncoding(String),

    /// A name tag whose quoted name never closes
    #[error("Unterminated name tag on line {line_number}: {line}")]
    UnterminatedName {
        /// 1-based line number
        line_number: usize,
        /// The offending line
        line: String,
    },

    /// A dialogue line with no entry before it to attach to
    #[error("Dialogue on line {line_number} has no preceding entry")]
    OrphanDialogue {
        /// 1-based line number
        line_number: usize,
    },
}

/// Errors related to chunk budgets
#[derive(Error, Debug)]
pub enum ChunkError {
    /// The token budget leaves no room for content
    #[error("Token budget {0} is too small, must be at least 2")]
    BudgetTooSmall(usize),

    /// Tokenizer failure while measuring chunks
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the tokenizer
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// Error from script parsing
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Error from chunking
    #[error("Chunk error: {0}")]
    Chunk(#[from] ChunkError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
