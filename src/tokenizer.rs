/*!
 * Tokenizer adapter.
 *
 * All chunk budgets are measured in subword tokens produced by a [`TextTokenizer`].
 * Two implementations exist:
 * - [`HuggingFaceTokenizer`]: wraps a `tokenizer.json` model (e.g. the Llama
 *   SentencePiece tokenizer) through the `tokenizers` crate
 * - [`WordTokenizer`]: a deterministic, model-free tokenizer following the same
 *   `▁` word-marker conventions, used for tests and offline runs
 *
 * `count` and `tokenize` of one implementation always agree.
 */

use std::path::Path;

use log::debug;
use tokenizers::Tokenizer;

use crate::app_config::{TokenizerConfig, TokenizerKind};
use crate::errors::TokenizerError;

/// SentencePiece marker for a preceding space
pub const WORD_MARKER: char = '\u{2581}';

// @struct: Opaque subword unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    // @field: Vocabulary id, when the tokenizer has a vocabulary
    id: Option<u32>,

    // @field: Surface piece including word markers
    piece: String,
}

impl Token {
    fn new(id: Option<u32>, piece: String) -> Self {
        Self { id, piece }
    }

    /// The raw piece text, markers included
    pub fn piece(&self) -> &str {
        &self.piece
    }

    /// True for a full stop token
    pub fn is_sentence_terminator(&self) -> bool {
        self.piece.trim_start_matches(WORD_MARKER) == "."
    }

    /// True if the token opens a new word
    pub fn is_word_start(&self) -> bool {
        self.piece.starts_with(WORD_MARKER)
    }

    /// True if the token closes a word
    pub fn is_word_end(&self) -> bool {
        self.piece.ends_with(WORD_MARKER)
    }
}

/// Subword tokenizer used for every budget measurement.
///
/// Implementations are stateless from the caller's point of view and may be shared
/// across threads.
pub trait TextTokenizer: Send + Sync {
    /// Split text into its ordered token sequence
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError>;

    /// Turn a token subsequence back into text
    fn decode(&self, tokens: &[Token]) -> Result<String, TokenizerError>;

    /// Number of tokens in `text`; empty text counts as zero
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.tokenize(text)?.len())
    }
}

/// Tokenizer backed by a HuggingFace `tokenizer.json`
pub struct HuggingFaceTokenizer {
    inner: Tokenizer,
}

impl HuggingFaceTokenizer {
    /// Load a tokenizer model from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TokenizerError> {
        let path = path.as_ref();
        let inner = Tokenizer::from_file(path).map_err(|e| TokenizerError::LoadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Loaded tokenizer model from {}", path.display());
        Ok(Self { inner })
    }
}

impl TextTokenizer for HuggingFaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizerError::EncodeFailed(e.to_string()))?;
        Ok(encoding
            .get_ids()
            .iter()
            .zip(encoding.get_tokens())
            .map(|(id, piece)| Token::new(Some(*id), piece.clone()))
            .collect())
    }

    fn decode(&self, tokens: &[Token]) -> Result<String, TokenizerError> {
        let ids = tokens
            .iter()
            .map(|t| {
                t.id.ok_or_else(|| {
                    TokenizerError::DecodeFailed(format!("token '{}' has no vocabulary id", t.piece))
                })
            })
            .collect::<Result<Vec<u32>, _>>()?;
        self.inner
            .decode(&ids, false)
            .map_err(|e| TokenizerError::DecodeFailed(e.to_string()))
    }

    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        if text.is_empty() {
            return Ok(0);
        }
        self.inner
            .encode(text, false)
            .map(|encoding| encoding.len())
            .map_err(|e| TokenizerError::EncodeFailed(e.to_string()))
    }
}

/// Model-free tokenizer.
///
/// A token is an optional leading [`WORD_MARKER`] followed by either a run of
/// alphanumeric characters or a single other character. Spaces become markers, the
/// text gets a dummy leading marker the way SentencePiece does, and a space that
/// cannot attach to a following piece becomes a bare marker token.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl TextTokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        if text.is_empty() {
            return Ok(tokens);
        }

        let mut pending_marker = true;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == ' ' {
                if pending_marker {
                    tokens.push(Token::new(None, WORD_MARKER.to_string()));
                }
                pending_marker = true;
                continue;
            }

            let mut piece = String::new();
            if pending_marker {
                piece.push(WORD_MARKER);
                pending_marker = false;
            }
            piece.push(c);
            if c.is_alphanumeric() {
                while let Some(&next) = chars.peek() {
                    if !next.is_alphanumeric() {
                        break;
                    }
                    piece.push(next);
                    chars.next();
                }
            }
            tokens.push(Token::new(None, piece));
        }

        if pending_marker && text.ends_with(' ') {
            tokens.push(Token::new(None, WORD_MARKER.to_string()));
        }
        Ok(tokens)
    }

    fn decode(&self, tokens: &[Token]) -> Result<String, TokenizerError> {
        let joined: String = tokens
            .iter()
            .flat_map(|t| t.piece.chars())
            .map(|c| if c == WORD_MARKER { ' ' } else { c })
            .collect();
        Ok(match joined.strip_prefix(' ') {
            Some(rest) => rest.to_string(),
            None => joined,
        })
    }
}

/// Build the tokenizer selected by the configuration
pub fn load_tokenizer(config: &TokenizerConfig) -> Result<Box<dyn TextTokenizer>, TokenizerError> {
    match config.kind {
        TokenizerKind::HuggingFace => Ok(Box::new(HuggingFaceTokenizer::from_file(&config.path)?)),
        TokenizerKind::Word => Ok(Box::new(WordTokenizer::new())),
    }
}
