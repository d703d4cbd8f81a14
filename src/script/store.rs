/*!
 * Persistent location and character name maps.
 *
 * Both maps translate raw script markers into display strings and are meant to be
 * hand-edited between runs. A batch loads them once, mutates them in memory while
 * parsing, and writes them back once at the end.
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::file_utils::FileManager;

/// Marker-to-display map, sorted for stable output
pub type DisplayMap = BTreeMap<String, String>;

/// Copy of the maps taken before a file is parsed
#[derive(Debug, Clone)]
pub struct StoreCheckpoint {
    locations: DisplayMap,
    names: DisplayMap,
}

/// The location and name maps of a batch
#[derive(Debug, Clone)]
pub struct ScriptStateStore {
    locations: DisplayMap,
    names: DisplayMap,
    locations_path: PathBuf,
    names_path: PathBuf,
}

impl ScriptStateStore {
    /// Empty store persisting to the given paths
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(locations_path: P1, names_path: P2) -> Self {
        Self {
            locations: DisplayMap::new(),
            names: DisplayMap::new(),
            locations_path: locations_path.as_ref().to_path_buf(),
            names_path: names_path.as_ref().to_path_buf(),
        }
    }

    /// Store seeded from whatever is already persisted at the given paths
    pub fn load<P1: AsRef<Path>, P2: AsRef<Path>>(locations_path: P1, names_path: P2) -> Result<Self> {
        let mut store = Self::new(locations_path, names_path);
        store.merge_from_disk()?;
        Ok(store)
    }

    /// Merge the persisted maps in; entries already in memory win
    pub fn merge_from_disk(&mut self) -> Result<()> {
        let locations = read_map(&self.locations_path)?;
        let names = read_map(&self.names_path)?;
        debug!(
            "Loaded {} locations and {} names from disk",
            locations.len(),
            names.len()
        );
        for (key, value) in locations {
            self.locations.entry(key).or_insert(value);
        }
        for (key, value) in names {
            self.names.entry(key).or_insert(value);
        }
        Ok(())
    }

    /// Display string for a location marker, registering unknown markers as themselves
    pub fn resolve_location(&mut self, marker: &str) -> String {
        self.locations
            .entry(marker.to_string())
            .or_insert_with(|| marker.to_string())
            .clone()
    }

    /// Display string for a character name, registering unknown names as themselves
    pub fn resolve_name(&mut self, name: &str) -> String {
        self.names
            .entry(name.to_string())
            .or_insert_with(|| name.to_string())
            .clone()
    }

    pub fn locations(&self) -> &DisplayMap {
        &self.locations
    }

    pub fn names(&self) -> &DisplayMap {
        &self.names
    }

    pub fn checkpoint(&self) -> StoreCheckpoint {
        StoreCheckpoint {
            locations: self.locations.clone(),
            names: self.names.clone(),
        }
    }

    /// Forget everything recorded since `checkpoint`
    pub fn rollback(&mut self, checkpoint: StoreCheckpoint) {
        self.locations = checkpoint.locations;
        self.names = checkpoint.names;
    }

    /// Write both maps as pretty JSON
    pub fn save(&self) -> Result<()> {
        write_map(&self.locations_path, &self.locations)?;
        write_map(&self.names_path, &self.names)?;
        info!(
            "Saved {} locations to {} and {} names to {}",
            self.locations.len(),
            self.locations_path.display(),
            self.names.len(),
            self.names_path.display()
        );
        Ok(())
    }
}

fn read_map(path: &Path) -> Result<DisplayMap> {
    if !FileManager::file_exists(path) {
        return Ok(DisplayMap::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse map file: {}", path.display()))
}

fn write_map(path: &Path, map: &DisplayMap) -> Result<()> {
    let json = serde_json::to_string_pretty(map).context("Failed to serialize map to JSON")?;
    FileManager::write_atomic(path, &json)
}
