/*!
 * Oversized paragraph handling.
 *
 * A paragraph that does not fit in one chunk is either dropped or carved into
 * fragments at the last sentence or word boundary before the limit.
 */

use log::{debug, warn};

use crate::errors::ChunkError;
use crate::tokenizer::{TextTokenizer, Token};

/// What to do with a paragraph that exceeds the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OversizePolicy {
    /// Discard the paragraph
    Drop,
    /// Break it into fragments that fit
    Split,
}

impl OversizePolicy {
    pub fn from_exclude_flag(exclude_if_too_long: bool) -> Self {
        if exclude_if_too_long {
            Self::Drop
        } else {
            Self::Split
        }
    }
}

/// Result of applying the token cap to a document's paragraphs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CappedParagraphs {
    /// Paragraphs and fragments, in document order, each within the limit
    pub items: Vec<String>,
    /// Paragraphs discarded under [`OversizePolicy::Drop`]
    pub dropped: usize,
    /// Paragraphs that had to be split
    pub split: usize,
    /// Fragments produced by splitting
    pub fragments: usize,
}

// @struct: Where one carve ends
struct Cut {
    // @field: Tokens kept in the emitted fragment
    keep: usize,
    // @field: Index the next fragment starts from
    resume: usize,
}

/// Find the cut for a token sequence longer than `limit`.
///
/// Scans backward from the last index that fits. A full stop stays with the left
/// fragment; a word-start token moves to the right fragment; a word-end token stays
/// left. Without any boundary above index 0 the sequence is cut hard at `limit`.
fn find_cut(tokens: &[Token], limit: usize) -> Cut {
    let mut index = limit - 1;
    while index > 0 {
        let token = &tokens[index];
        if token.is_sentence_terminator() {
            return Cut { keep: index + 1, resume: index + 1 };
        }
        if token.is_word_start() {
            return Cut { keep: index, resume: index };
        }
        if token.is_word_end() {
            return Cut { keep: index + 1, resume: index + 1 };
        }
        index -= 1;
    }
    Cut { keep: limit, resume: limit }
}

/// Split a token sequence into consecutive pieces of at most `limit` tokens.
///
/// The pieces concatenate back to `tokens` exactly. Every iteration consumes at
/// least one token, so this always terminates.
pub fn split_tokens(tokens: &[Token], limit: usize) -> Vec<&[Token]> {
    let limit = limit.max(1);
    let mut pieces = Vec::new();
    let mut remaining = tokens;

    while !remaining.is_empty() {
        if remaining.len() <= limit {
            pieces.push(remaining);
            break;
        }
        let cut = find_cut(remaining, limit);
        pieces.push(&remaining[..cut.keep]);
        remaining = &remaining[cut.resume..];
    }

    pieces
}

/// Decode the pieces of `tokens`, re-splitting any piece whose decoded text
/// counts more than `limit` tokens.
///
/// Decoding is not always the inverse of tokenizing, so a piece is re-cut with a
/// limit tightened by its excess. Pieces only shrink, and a single token is kept
/// whatever it counts.
fn decode_within(tokens: &[Token], tokenizer: &dyn TextTokenizer, limit: usize) -> Result<Vec<String>, ChunkError> {
    let mut fragments = Vec::new();
    let mut pending: Vec<&[Token]> = split_tokens(tokens, limit).into_iter().rev().collect();

    while let Some(piece) = pending.pop() {
        let text = tokenizer.decode(piece)?;
        let count = tokenizer.count(&text)?;
        if count <= limit || piece.len() == 1 {
            if count > limit {
                warn!("Fragment '{}' counts {} tokens after decoding (limit {})", text, count, limit);
            }
            fragments.push(text);
            continue;
        }
        let tighter = piece.len().saturating_sub(count - limit).clamp(1, piece.len() - 1);
        pending.extend(split_tokens(piece, tighter).into_iter().rev());
    }

    Ok(fragments)
}

/// Split one paragraph into decoded fragments of at most `limit` tokens
pub fn split_paragraph(
    paragraph: &str,
    tokenizer: &dyn TextTokenizer,
    limit: usize,
) -> Result<Vec<String>, ChunkError> {
    let tokens = tokenizer.tokenize(paragraph)?;
    decode_within(&tokens, tokenizer, limit.max(1))
}

/// Bring every paragraph within `budget - 1` tokens.
///
/// Paragraphs that already fit pass through untouched. Oversized ones are dropped
/// or split according to `policy`.
pub fn apply_token_cap(
    paragraphs: Vec<String>,
    tokenizer: &dyn TextTokenizer,
    budget: usize,
    policy: OversizePolicy,
) -> Result<CappedParagraphs, ChunkError> {
    if budget < 2 {
        return Err(ChunkError::BudgetTooSmall(budget));
    }
    let limit = budget - 1;
    let mut capped = CappedParagraphs::default();

    for paragraph in paragraphs {
        let tokens = tokenizer.tokenize(&paragraph)?;
        if tokens.len() <= limit {
            capped.items.push(paragraph);
            continue;
        }

        match policy {
            OversizePolicy::Drop => {
                warn!("Dropping paragraph of {} tokens (limit {})", tokens.len(), limit);
                capped.dropped += 1;
            }
            OversizePolicy::Split => {
                let fragments = decode_within(&tokens, tokenizer, limit)?;
                debug!("Split paragraph of {} tokens into {} fragments", tokens.len(), fragments.len());
                capped.split += 1;
                capped.fragments += fragments.len();
                capped.items.extend(fragments);
            }
        }
    }

    Ok(capped)
}
