/*!
 * Prose book conversion.
 *
 * Turns a plain-text book into token-bounded chunk files:
 *
 * - `paragraphs`: undo hard wrapping and drop trivial lines
 * - `splitter`: drop or split paragraphs that exceed the budget
 * - `packer`: greedily pack paragraphs into chunks below the budget
 *
 * Output for `Book.txt` goes to `<output>/Book/chunk_<n>.txt`, numbered from 1.
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::file_utils::FileManager;
use crate::tokenizer::TextTokenizer;

pub use self::packer::{pack_paragraphs, PARAGRAPH_SEPARATOR};
pub use self::paragraphs::{normalize_source, reconstruct_paragraphs, ABBREVIATED_TITLES};
pub use self::splitter::{apply_token_cap, split_paragraph, split_tokens, CappedParagraphs, OversizePolicy};

pub mod packer;
pub mod paragraphs;
pub mod splitter;

/// Summary of one converted book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReport {
    /// Document name (input file stem)
    pub document: String,
    /// Reconstructed paragraphs before the token cap
    pub paragraphs: usize,
    /// Chunk files written
    pub chunks: usize,
    /// Paragraphs dropped for being too long
    pub dropped: usize,
    /// Paragraphs split into fragments
    pub split: usize,
    /// Directory holding the chunk files
    pub output_dir: PathBuf,
}

/// Chunks of one book plus the bookkeeping behind them
#[derive(Debug, Clone)]
pub struct BookChunks {
    pub chunks: Vec<String>,
    pub paragraphs: usize,
    pub capped: CappedParagraphs,
}

/// Converts books with one tokenizer and budget
pub struct BookConverter<'a> {
    tokenizer: &'a dyn TextTokenizer,
    budget: usize,
    policy: OversizePolicy,
}

impl<'a> BookConverter<'a> {
    pub fn new(tokenizer: &'a dyn TextTokenizer, budget: usize, policy: OversizePolicy) -> Self {
        Self { tokenizer, budget, policy }
    }

    /// Run the whole prose pipeline over raw book text
    pub fn chunk_text(&self, raw: &str) -> Result<BookChunks> {
        let paragraphs = reconstruct_paragraphs(&normalize_source(raw));
        let paragraph_count = paragraphs.len();

        let mut capped = apply_token_cap(paragraphs, self.tokenizer, self.budget, self.policy)?;
        let items = std::mem::take(&mut capped.items);
        let chunks = pack_paragraphs(&items, self.tokenizer, self.budget)?;

        Ok(BookChunks {
            chunks,
            paragraphs: paragraph_count,
            capped,
        })
    }

    /// Directory a book's chunks are written to
    pub fn output_dir_for(input_file: &Path, output_root: &Path) -> PathBuf {
        output_root.join(document_name(input_file))
    }

    /// Convert one book file, replacing its output directory as a whole
    pub fn convert_file(&self, input_file: &Path, output_root: &Path) -> Result<BookReport> {
        info!("Processing book: {}", input_file.display());
        let document = document_name(input_file);

        let raw = FileManager::read_lossy(input_file)?;
        let result = self
            .chunk_text(&raw)
            .with_context(|| format!("Failed to chunk book: {}", input_file.display()))?;

        let files: Vec<(String, String)> = result
            .chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| (chunk_file_name(index), chunk.clone()))
            .collect();

        let output_dir = Self::output_dir_for(input_file, output_root);
        FileManager::write_dir_atomic(&output_dir, &files)?;
        debug!("Wrote {} chunks to {}", files.len(), output_dir.display());

        Ok(BookReport {
            document,
            paragraphs: result.paragraphs,
            chunks: result.chunks.len(),
            dropped: result.capped.dropped,
            split: result.capped.split,
            output_dir,
        })
    }
}

/// Name of the `index`-th (0-based) chunk file
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{}.txt", index + 1)
}

/// Document name derived from the input file stem
pub fn document_name(input_file: &Path) -> String {
    input_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string())
}
