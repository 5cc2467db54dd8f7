//! JSON persistence for the dataset, favorites and recents
//!
//! Reads are best-effort: a missing or broken auxiliary file degrades to an
//! empty collection. Writes go through a temporary file and a rename so a
//! failed write never leaves a truncated store behind.

use crate::error::{CoreError, Result};
use crate::record::EmojiRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read and parse a JSON file, `None` when it does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::unreadable(path, e))?;
    let value = serde_json::from_str(&content).map_err(|e| CoreError::unreadable(path, e))?;
    Ok(Some(value))
}

/// Write `value` as indented JSON, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::write_failed(path, e))?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, content).map_err(|e| CoreError::write_failed(path, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        CoreError::write_failed(path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load the canonical dataset
///
/// Elements that cannot be read as a record are skipped individually.
pub fn load_dataset(path: &Path) -> Vec<EmojiRecord> {
    let items = match read_json::<Value>(path) {
        Ok(Some(Value::Array(items))) => items,
        Ok(Some(_)) => {
            warn!("{} is not a JSON array, ignoring it", path.display());
            return Vec::new();
        }
        Ok(None) => {
            warn!("No emoji dataset at {}, run an import first", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("{}", e);
            return Vec::new();
        }
    };

    let total = items.len();
    let records: Vec<EmojiRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping dataset entry {}: {}", i, e);
                None
            }
        })
        .collect();

    debug!("Loaded {}/{} records from {}", records.len(), total, path.display());
    records
}

/// Write the canonical dataset
pub fn save_dataset(path: &Path, records: &[EmojiRecord]) -> Result<()> {
    write_json(path, records)
}

/// Favorite glyphs, stored as a sorted JSON array
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The stored set, or `None` when there is no usable store
    pub fn load(&self) -> Option<BTreeSet<String>> {
        match read_json::<Vec<String>>(&self.path) {
            Ok(Some(glyphs)) => Some(glyphs.into_iter().collect()),
            Ok(None) => None,
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    pub fn save(&self, favorites: &BTreeSet<String>) -> Result<()> {
        write_json(&self.path, favorites)
    }
}

/// Recently used glyphs, most recent first
#[derive(Debug, Clone)]
pub struct RecentStore {
    path: PathBuf,
}

impl RecentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Vec<String> {
        match read_json::<Vec<String>>(&self.path) {
            Ok(Some(glyphs)) => glyphs,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, recent: &[String]) -> Result<()> {
        write_json(&self.path, recent)
    }
}
