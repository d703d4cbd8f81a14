use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::prose::{BookConverter, OversizePolicy};
use crate::script::{self, ScriptConverter, ScriptOutcome, ScriptStateStore};
use crate::tokenizer::{load_tokenizer, TextTokenizer};

// @module: Application controller for batch conversion

/// Counts reported at the end of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    // @field: Files converted
    pub processed: usize,
    // @field: Files left alone (existing output or branch scripts)
    pub skipped: usize,
    // @field: Files that failed to convert
    pub failed: usize,
    // @field: Chunk files written over the batch
    pub chunks: usize,
    pub duration: Duration,
}

/// Main application controller for book and script conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Tokenizer shared by every file of a batch
    tokenizer: Box<dyn TextTokenizer>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let tokenizer = load_tokenizer(&config.tokenizer)
            .with_context(|| format!("Failed to load tokenizer: {}", config.tokenizer.path))?;
        Ok(Self::with_tokenizer(config, tokenizer))
    }

    /// Create a controller around an already built tokenizer
    pub fn with_tokenizer(config: Config, tokenizer: Box<dyn TextTokenizer>) -> Self {
        Self { config, tokenizer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert every book in `input_dir` into `<output_dir>/<book>/chunk_<n>.txt`.
    /// Books whose output directory already exists are skipped unless `force` is set.
    pub fn run_books(&self, input_dir: &Path, output_dir: &Path, force: bool) -> Result<BatchSummary> {
        let start_time = Instant::now();
        let files = self.input_files(input_dir, FileType::Book)?;
        let mut summary = BatchSummary::default();
        if files.is_empty() {
            warn!("No book files found in directory: {}", input_dir.display());
            return Ok(summary);
        }

        let policy = OversizePolicy::from_exclude_flag(self.config.chunking.exclude_if_too_long);
        let converter = BookConverter::new(self.tokenizer.as_ref(), self.config.chunking.max_tokens, policy);
        let progress = Self::progress_bar(files.len());

        for file in &files {
            let file_name = Self::display_name(file);
            progress.set_message(format!("Processing: {}", file_name));

            if !force && Self::has_output(FileType::Book, file, output_dir)? {
                warn!("Skipping {}, output already exists (use --force to overwrite)", file_name);
                summary.skipped += 1;
                progress.inc(1);
                continue;
            }

            match converter.convert_file(file, output_dir) {
                Ok(report) => {
                    debug!(
                        "{}: {} paragraphs, {} dropped, {} split",
                        report.document, report.paragraphs, report.dropped, report.split
                    );
                    info!("Success: {} ({} chunks)", report.output_dir.display(), report.chunks);
                    summary.processed += 1;
                    summary.chunks += report.chunks;
                }
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            progress.inc(1);
        }

        progress.finish_with_message("Books complete");
        summary.duration = start_time.elapsed();
        Self::log_summary("Book", &summary);
        Ok(summary)
    }

    /// Convert every script in `input_dir` into `<output_dir>/<script>_chunk_<n>.txt`
    /// and `<output_dir>/roleplay/`. The location and name maps are loaded before the
    /// first file and saved after the last.
    pub fn run_scripts(&self, input_dir: &Path, output_dir: &Path, force: bool) -> Result<BatchSummary> {
        let start_time = Instant::now();
        let files = self.input_files(input_dir, FileType::Script)?;
        let mut summary = BatchSummary::default();
        if files.is_empty() {
            warn!("No script files found in directory: {}", input_dir.display());
            return Ok(summary);
        }

        let mut store = ScriptStateStore::load(&self.config.scripts.locations_path, &self.config.scripts.names_path)?;
        let converter = ScriptConverter::new(self.tokenizer.as_ref(), self.config.chunking.max_tokens);
        let progress = Self::progress_bar(files.len());

        for file in &files {
            let file_name = Self::display_name(file);
            progress.set_message(format!("Processing: {}", file_name));

            if !force && Self::has_output(FileType::Script, file, output_dir)? {
                warn!("Skipping {}, output already exists (use --force to overwrite)", file_name);
                summary.skipped += 1;
                progress.inc(1);
                continue;
            }

            match converter.convert_file(file, output_dir, &mut store) {
                Ok(ScriptOutcome::Converted(report)) => {
                    info!(
                        "Success: {} ({} chunks, {} roleplay)",
                        report.document, report.chunks, report.roleplay_chunks
                    );
                    summary.processed += 1;
                    summary.chunks += report.chunks + report.roleplay_chunks;
                }
                Ok(ScriptOutcome::SkippedBranch) => {
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            progress.inc(1);
        }

        progress.finish_with_message("Scripts complete");
        store.save().context("Failed to save location and name maps")?;
        summary.duration = start_time.elapsed();
        Self::log_summary("Script", &summary);
        Ok(summary)
    }

    // Sorted input files of one kind
    fn input_files(&self, input_dir: &Path, file_type: FileType) -> Result<Vec<PathBuf>> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }
        let extension = match file_type {
            FileType::Book => &self.config.books.extension,
            FileType::Script => &self.config.scripts.extension,
        };
        FileManager::find_files(input_dir, extension)
    }

    /// True if a previous run already produced output for `input_file`
    pub fn has_output(file_type: FileType, input_file: &Path, output_dir: &Path) -> Result<bool> {
        match file_type {
            FileType::Book => Ok(FileManager::dir_exists(BookConverter::output_dir_for(input_file, output_dir))),
            FileType::Script => {
                let document = crate::prose::document_name(input_file);
                Ok(!script::existing_outputs(output_dir, &document)?.is_empty())
            }
        }
    }

    fn progress_bar(len: usize) -> ProgressBar {
        let progress = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("█▓▒░"));
        progress
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn log_summary(kind: &str, summary: &BatchSummary) {
        info!(
            "{} processing completed: {} processed, {} skipped, {} errors, {} chunks - Duration: {}",
            kind,
            summary.processed,
            summary.skipped,
            summary.failed,
            summary.chunks,
            Self::format_duration(summary.duration)
        );
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
