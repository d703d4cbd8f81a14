/*!
 * Interactive-fiction script conversion.
 *
 * Converts UTF-16 scripts in the bracketed markup format into screenplay-style
 * chunks. It is split into several submodules:
 *
 * - `classify`: one tagged value per script line
 * - `screenplay`: the speaker/narration entry accumulator
 * - `store`: persisted location and character name maps
 * - `chunker`: flush-before-append chunking and roleplay routing
 *
 * Output for `scene01.ks` goes to `<output>/scene01_chunk_<n>.txt`, numbered from
 * 0, or to `<output>/roleplay/` for chunks containing roleplay actions.
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::errors::ScriptError;
use crate::file_utils::{FileManager, OutputBatch};
use crate::prose::document_name;
use crate::tokenizer::TextTokenizer;

pub use self::chunker::{chunk_screenplay, OutputStream, ScriptChunk};
pub use self::classify::{classify_line, is_branch_command, strip_escapes, ScriptLine};
pub use self::screenplay::{EntryKind, Screenplay, ScreenplayEntry, DEFAULT_NARRATOR};
pub use self::store::{DisplayMap, ScriptStateStore, StoreCheckpoint};

pub mod chunker;
pub mod classify;
pub mod screenplay;
pub mod store;

/// Subdirectory for roleplay chunks
pub const ROLEPLAY_DIR: &str = "roleplay";

/// Summary of one converted script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    /// Document name (input file stem)
    pub document: String,
    /// Screenplay entries after merging
    pub entries: usize,
    /// Chunks written to the primary directory
    pub chunks: usize,
    /// Chunks written to the roleplay directory
    pub roleplay_chunks: usize,
}

/// Result of converting one script file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    Converted(ScriptReport),
    /// The file links to other scripts and was left alone
    SkippedBranch,
}

/// True if any line of the script is a branch command
pub fn contains_branch(text: &str) -> bool {
    text.lines().any(is_branch_command)
}

/// Parse script text into a screenplay, resolving markers through `store`
pub fn parse_script(text: &str, store: &mut ScriptStateStore) -> Result<Screenplay, ScriptError> {
    let mut screenplay = Screenplay::new();

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        match classify_line(raw, line_number)? {
            ScriptLine::Location(marker) => {
                let display = store.resolve_location(&marker);
                screenplay.add_location(display);
            }
            ScriptLine::NameTag(name) => {
                let display = store.resolve_name(&name);
                screenplay.add_speaker(display.to_uppercase());
            }
            ScriptLine::Dialogue(line) => {
                if !screenplay.add_dialogue(line) {
                    return Err(ScriptError::OrphanDialogue { line_number });
                }
            }
            ScriptLine::Narration(line) => screenplay.add_narration(&line),
            ScriptLine::Blank
            | ScriptLine::Comment
            | ScriptLine::Command
            | ScriptLine::Annotation
            | ScriptLine::Unknown => {}
        }
    }

    Ok(screenplay)
}

/// Path of a script chunk file
pub fn chunk_output_path(output_root: &Path, document: &str, index: usize, stream: OutputStream) -> PathBuf {
    let name = format!("{}_chunk_{}.txt", document, index);
    match stream {
        OutputStream::Primary => output_root.join(name),
        OutputStream::Roleplay => output_root.join(ROLEPLAY_DIR).join(name),
    }
}

/// Chunk files a previous run left for `document`, in either stream
pub fn existing_outputs(output_root: &Path, document: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}_chunk_", document);
    let mut found = Vec::new();
    for dir in [output_root.to_path_buf(), output_root.join(ROLEPLAY_DIR)] {
        if !FileManager::dir_exists(&dir) {
            continue;
        }
        for path in FileManager::find_files(&dir, "txt")? {
            let matches = path
                .file_name()
                .map(|name| name.to_string_lossy())
                .and_then(|name| name.strip_prefix(&prefix).map(|rest| rest.trim_end_matches(".txt").to_string()))
                .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()));
            if matches {
                found.push(path);
            }
        }
    }
    Ok(found)
}

/// Converts scripts with one tokenizer and budget
pub struct ScriptConverter<'a> {
    tokenizer: &'a dyn TextTokenizer,
    budget: usize,
}

impl<'a> ScriptConverter<'a> {
    pub fn new(tokenizer: &'a dyn TextTokenizer, budget: usize) -> Self {
        Self { tokenizer, budget }
    }

    /// Parse and chunk script text; `None` when the script contains a branch
    pub fn chunk_text(&self, text: &str, store: &mut ScriptStateStore) -> Result<Option<(Screenplay, Vec<ScriptChunk>)>> {
        if contains_branch(text) {
            return Ok(None);
        }

        let checkpoint = store.checkpoint();
        let chunked = parse_script(text, store)
            .map_err(anyhow::Error::from)
            .and_then(|screenplay| {
                let chunks = chunk_screenplay(screenplay.entries(), self.tokenizer, self.budget)?;
                Ok((screenplay, chunks))
            });
        match chunked {
            Ok(chunked) => Ok(Some(chunked)),
            Err(e) => {
                store.rollback(checkpoint);
                Err(e)
            }
        }
    }

    /// Convert one script file.
    ///
    /// All chunk files of the script are committed together; stale chunk files
    /// from an earlier run of the same document are removed afterwards. On any
    /// failure the store is restored to its state before this file.
    pub fn convert_file(&self, input_file: &Path, output_root: &Path, store: &mut ScriptStateStore) -> Result<ScriptOutcome> {
        info!("Processing script: {}", input_file.display());
        let text = FileManager::read_utf16(input_file)?;

        let checkpoint = store.checkpoint();
        let result = self.convert_text(&text, input_file, output_root, store);
        if result.is_err() {
            store.rollback(checkpoint);
        }
        result
    }

    fn convert_text(
        &self,
        text: &str,
        input_file: &Path,
        output_root: &Path,
        store: &mut ScriptStateStore,
    ) -> Result<ScriptOutcome> {
        let document = document_name(input_file);
        let Some((screenplay, chunks)) = self
            .chunk_text(text, store)
            .with_context(|| format!("Failed to convert script: {}", input_file.display()))?
        else {
            warn!("Discovered a branch in {}, skipping", input_file.display());
            return Ok(ScriptOutcome::SkippedBranch);
        };

        let mut batch = OutputBatch::new();
        let mut roleplay_chunks = 0;
        for chunk in &chunks {
            if chunk.stream == OutputStream::Roleplay {
                roleplay_chunks += 1;
            }
            batch.add(
                chunk_output_path(output_root, &document, chunk.index, chunk.stream),
                chunk.text.clone(),
            );
        }

        let stale = existing_outputs(output_root, &document)?;
        let written = batch.commit()?;
        for path in stale.iter().filter(|p| !written.contains(p)) {
            fs::remove_file(path).with_context(|| format!("Failed to remove stale chunk: {}", path.display()))?;
        }
        debug!("Wrote {} chunks for {}", written.len(), document);

        Ok(ScriptOutcome::Converted(ScriptReport {
            document,
            entries: screenplay.len(),
            chunks: chunks.len() - roleplay_chunks,
            roleplay_chunks,
        }))
    }
}
