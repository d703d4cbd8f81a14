use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use walkdir::WalkDir;

use crate::errors::ScriptError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension directly inside a directory.
    ///
    /// Results are sorted by file name so chunk numbering never depends on the
    /// order the filesystem happens to list entries in.
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref())
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a file as UTF-8, replacing invalid sequences
    pub fn read_lossy<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read a UTF-16 file; invalid encoding is an error
    pub fn read_utf16<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        let text = decode_utf16(&bytes)
            .with_context(|| format!("Failed to decode file: {:?}", path.as_ref()))?;
        Ok(text)
    }

    /// Write a string to a file through a temporary sibling that is renamed into place
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in: {:?}", parent))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        tmp.persist(path)
            .with_context(|| format!("Failed to move file into place: {:?}", path))?;
        Ok(())
    }

    /// Populate a directory with `(file name, content)` pairs all at once.
    ///
    /// Files are written to a hidden staging directory next to `dir`. An existing
    /// `dir` is renamed aside before the staging directory takes its place, and is
    /// restored if that fails. On failure `dir` is left as it was.
    pub fn write_dir_atomic<P: AsRef<Path>>(dir: P, files: &[(String, String)]) -> Result<()> {
        let dir = dir.as_ref();
        let parent = match dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let staging = Builder::new()
            .prefix(".staging-")
            .tempdir_in(&parent)
            .with_context(|| format!("Failed to create staging directory in: {:?}", parent))?;
        for (name, content) in files {
            let path = staging.path().join(name);
            fs::write(&path, content)
                .with_context(|| format!("Failed to write to file: {:?}", path))?;
        }

        if !dir.exists() {
            fs::rename(staging.path(), dir)
                .with_context(|| format!("Failed to move staged output into place: {:?}", dir))?;
            return Ok(());
        }

        let aside_root = Builder::new()
            .prefix(".previous-")
            .tempdir_in(&parent)
            .with_context(|| format!("Failed to create directory in: {:?}", parent))?;
        let aside = aside_root.path().join("previous");
        fs::rename(dir, &aside)
            .with_context(|| format!("Failed to move previous output aside: {:?}", dir))?;

        if let Err(e) = fs::rename(staging.path(), dir) {
            if let Err(restore) = fs::rename(&aside, dir) {
                warn!("Failed to restore previous output {:?}: {}", dir, restore);
            }
            return Err(e).with_context(|| format!("Failed to move staged output into place: {:?}", dir));
        }

        if let Err(e) = aside_root.close() {
            warn!("Failed to remove previous output of {:?}: {}", dir, e);
        }
        Ok(())
    }
}

/// Decode UTF-16 bytes, honouring a byte order mark and defaulting to little-endian
pub fn decode_utf16(bytes: &[u8]) -> Result<String, ScriptError> {
    let (body, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };
    if body.len() % 2 != 0 {
        return Err(ScriptError::InvalidEncoding(format!(
            "odd byte count {}",
            bytes.len()
        )));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|e| ScriptError::InvalidEncoding(e.to_string()))
}

/// A set of output files committed all-or-nothing.
///
/// Each file is written atomically; if any write fails the files already
/// committed by this batch are removed again.
#[derive(Debug, Default)]
pub struct OutputBatch {
    files: Vec<(PathBuf, String)>,
}

impl OutputBatch {
    pub fn new() -> Self {
        Self::default()
    }

    // @adds: File to the pending set
    pub fn add(&mut self, path: PathBuf, content: String) {
        self.files.push((path, content));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths this batch will write
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|(path, _)| path.as_path())
    }

    /// Write every file, rolling back on the first failure
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(self.files.len());
        for (path, content) in &self.files {
            if let Err(e) = FileManager::write_atomic(path, content) {
                for done in &written {
                    if let Err(remove) = fs::remove_file(done) {
                        warn!("Failed to roll back {:?}: {}", done, remove);
                    }
                }
                return Err(e);
            }
            written.push(path.clone());
        }
        Ok(written)
    }
}

/// Enum representing the input file types the converter handles
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    /// Prose book (UTF-8 text)
    Book,
    /// Interactive-fiction script (UTF-16 markup)
    Script,
}
