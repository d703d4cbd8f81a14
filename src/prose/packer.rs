/*!
 * Greedy token-budget packing.
 *
 * Consecutive paragraphs are gathered into chunks whose token total, counting one
 * token per separator, stays strictly below the budget. Order is preserved and
 * every input item lands in exactly one chunk.
 */

use log::{debug, warn};

use crate::errors::ChunkError;
use crate::tokenizer::TextTokenizer;

/// Joins the items of one chunk
pub const PARAGRAPH_SEPARATOR: &str = "\n";

// @struct: Window over the items of the chunk being built
#[derive(Debug, Default)]
struct Window {
    start: usize,
    end: usize,
    tokens: usize,
    open: bool,
}

/// Pack items into chunks below `budget` tokens.
///
/// Items are expected to be at most `budget - 1` tokens each, which the token cap
/// guarantees by re-counting every decoded fragment. An item that is still over,
/// such as a single token that decodes long, gets a chunk of its own rather than
/// being lost.
pub fn pack_paragraphs<S: AsRef<str>>(
    items: &[S],
    tokenizer: &dyn TextTokenizer,
    budget: usize,
) -> Result<Vec<String>, ChunkError> {
    if budget < 2 {
        return Err(ChunkError::BudgetTooSmall(budget));
    }

    let mut chunks = Vec::new();
    let mut window = Window::default();

    for (index, item) in items.iter().enumerate() {
        let length = tokenizer.count(item.as_ref())?;
        if length >= budget {
            warn!("Item {} has {} tokens, over the budget of {}", index, length, budget);
        }

        if !window.open {
            window = Window { start: index, end: index, tokens: length + 1, open: true };
        } else if window.tokens + length + 1 < budget {
            window.end = index;
            window.tokens += length + 1;
        } else {
            chunks.push(join_window(items, &window));
            window = Window { start: index, end: index, tokens: length, open: true };
        }
    }

    if window.open {
        chunks.push(join_window(items, &window));
    }

    debug!("Packed {} items into {} chunks", items.len(), chunks.len());
    Ok(chunks)
}

fn join_window<S: AsRef<str>>(items: &[S], window: &Window) -> String {
    items[window.start..=window.end]
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}
