//! Inventory persistence.
//!
//! One pretty-printed JSON file per source in a single directory, named
//! after the source (`apt.json`, `snap.json`, ...). Files are independent
//! so a failed capture for one source never corrupts another's snapshot.

use crate::error::{Error, Result};
use reconcile::{Inventory, Source};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-backed store of per-source inventory snapshots.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    dir: PathBuf,
}

impl InventoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one source's snapshot file.
    pub fn path_for(&self, source: Source) -> PathBuf {
        self.dir.join(format!("{}.json", source.as_str()))
    }

    /// Whether a snapshot exists for this source.
    pub fn exists(&self, source: Source) -> bool {
        self.path_for(source).exists()
    }

    /// Write one source's snapshot, creating the directory if needed.
    pub fn save(&self, inventory: &Inventory) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(inventory.source);
        let json = serde_json::to_string_pretty(inventory)?;
        fs::write(&path, json)?;
        log::info!("saved {} entries to {}", inventory.len(), path.display());
        Ok(path)
    }

    /// Load one source's snapshot.
    pub fn load(&self, source: Source) -> Result<Inventory> {
        let path = self.path_for(source);
        if !path.exists() {
            return Err(Error::InventoryNotFound(path));
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
