/*!
 * Chunk accumulation for screenplays.
 *
 * Unlike the prose packer, which decides before extending a window, this
 * accumulator appends an entry first and measures afterwards: when the result is
 * over budget (or the entry is the file's last), the accumulator as it stood
 * before the entry is flushed and the entry opens the next one. Chunks open
 * with the most recent scene heading, when there is one.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use log::{debug, warn};

use crate::errors::ChunkError;
use crate::tokenizer::TextTokenizer;

use super::screenplay::ScreenplayEntry;

// @const: Asterisk-delimited roleplay action, e.g. *smiles*
static ROLEPLAY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*.*?\*").unwrap());

/// Output stream a chunk is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    /// Plain screenplay text
    Primary,
    /// Text containing roleplay actions
    Roleplay,
}

impl OutputStream {
    /// Route text by the presence of a roleplay action
    pub fn for_text(text: &str) -> Self {
        if ROLEPLAY_PATTERN.is_match(text) {
            Self::Roleplay
        } else {
            Self::Primary
        }
    }
}

/// One finished screenplay chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptChunk {
    /// Position in the file's chunk sequence, from 0, shared by both streams
    pub index: usize,
    pub text: String,
    pub stream: OutputStream,
}

// @struct: Chunk being accumulated
#[derive(Debug, Default)]
struct Accumulator {
    text: String,
    entries: usize,
}

impl Accumulator {
    // @creates: Accumulator seeded with the scene heading when one applies
    fn opened_with(entry: &ScreenplayEntry, rendered: &str, location: Option<&str>) -> Self {
        let mut text = String::new();
        if let (false, Some(location)) = (entry.is_location(), location) {
            text.push_str(location);
            text.push('\n');
        }
        text.push_str(rendered);
        Self { text, entries: 1 }
    }
}

/// Accumulate entries into chunks of about `budget` tokens and route each one
pub fn chunk_screenplay(
    entries: &[ScreenplayEntry],
    tokenizer: &dyn TextTokenizer,
    budget: usize,
) -> Result<Vec<ScriptChunk>, ChunkError> {
    let mut chunks = Vec::new();
    let mut last_location: Option<String> = None;
    let mut current = Accumulator::default();

    for (i, entry) in entries.iter().enumerate() {
        let rendered = entry.render();
        let is_final = i + 1 == entries.len();

        if entry.is_location() {
            last_location = Some(entry.label().to_string());
        } else if current.entries == 0 {
            if let Some(location) = &last_location {
                current.text.push_str(location);
                current.text.push('\n');
            }
        }

        let previous_len = current.text.len();
        current.text.push_str(&rendered);
        current.entries += 1;
        let token_count = tokenizer.count(&current.text)?;

        if token_count > budget || is_final {
            if current.entries > 1 {
                current.text.truncate(previous_len);
                push_chunk(&mut chunks, current.text);
                current = Accumulator::opened_with(entry, &rendered, last_location.as_deref());
            }
            if current.entries == 1 && tokenizer.count(&current.text)? > budget {
                warn!("Screenplay entry {} alone exceeds the budget of {} tokens", i, budget);
            }
        }
    }

    if current.entries > 0 {
        push_chunk(&mut chunks, current.text);
    }

    debug!("Accumulated {} entries into {} chunks", entries.len(), chunks.len());
    Ok(chunks)
}

fn push_chunk(chunks: &mut Vec<ScriptChunk>, text: String) {
    let stream = OutputStream::for_text(&text);
    chunks.push(ScriptChunk { index: chunks.len(), text, stream });
}
