//! Chunk persistence: the record schema and key-value stores.
//!
//! A chunk persists as `{ size, scale, iso_level, density }`. The schema is
//! what matters; the [`ChunkStore`] trait keeps the encoding and the
//! backing medium swappable. [`DirectoryStore`] writes one JSON file per
//! key, [`MemoryStore`] backs tests and headless runs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::types::ChunkCoord;

/// Persisted form of one chunk's density volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
  /// Samples per axis.
  pub size: u32,

  /// World distance between adjacent samples.
  pub scale: f32,

  /// Density threshold defining the surface.
  pub iso_level: f32,

  /// `size³` density samples in linear layout.
  pub density: Vec<f32>,
}

impl ChunkRecord {
  /// Reject any record whose density array does not match the declared
  /// size. Loads must fail whole: no partially trusted record.
  pub fn validate(&self) -> Result<(), TerrainError> {
    let size = self.size as usize;
    let expected = size * size * size;
    if self.density.len() != expected {
      return Err(TerrainError::InconsistentDensity {
        size,
        actual: self.density.len(),
        expected,
      });
    }
    Ok(())
  }
}

/// Storage key for a chunk coordinate, e.g. `chunk_2_0_-1`.
pub fn chunk_key(coords: ChunkCoord) -> String {
  format!("chunk_{}_{}_{}", coords.x, coords.y, coords.z)
}

/// Key-value persistence backend for chunk records.
///
/// A missing record is data absence (`Ok(None)`), not an error; the world
/// falls back to procedural generation.
pub trait ChunkStore {
  /// Prepare the backing storage (directory creation for file stores).
  fn ensure_ready(&mut self) -> Result<(), TerrainError>;

  /// Cheap existence probe.
  fn contains(&self, key: &str) -> bool;

  /// Load and validate a record. `Ok(None)` when no record exists.
  fn load(&self, key: &str) -> Result<Option<ChunkRecord>, TerrainError>;

  fn save(&mut self, key: &str, record: &ChunkRecord) -> Result<(), TerrainError>;

  fn remove(&mut self, key: &str) -> Result<(), TerrainError>;
}

/// File-backed store: one `<key>.json` per record under a root directory.
pub struct DirectoryStore {
  root: PathBuf,
}

impl DirectoryStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.root.join(format!("{key}.json"))
  }
}

impl ChunkStore for DirectoryStore {
  fn ensure_ready(&mut self) -> Result<(), TerrainError> {
    fs::create_dir_all(&self.root)?;
    Ok(())
  }

  fn contains(&self, key: &str) -> bool {
    self.path_for(key).exists()
  }

  fn load(&self, key: &str) -> Result<Option<ChunkRecord>, TerrainError> {
    let path = self.path_for(key);
    if !path.exists() {
      return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let record: ChunkRecord = serde_json::from_str(&contents)?;
    record.validate()?;
    Ok(Some(record))
  }

  fn save(&mut self, key: &str, record: &ChunkRecord) -> Result<(), TerrainError> {
    let encoded = serde_json::to_string(record)?;
    fs::write(self.path_for(key), encoded)?;
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), TerrainError> {
    let path = self.path_for(key);
    if path.exists() {
      fs::remove_file(path)?;
    }
    Ok(())
  }
}

/// In-memory store for tests and headless runs.
#[derive(Default)]
pub struct MemoryStore {
  records: HashMap<String, ChunkRecord>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

impl ChunkStore for MemoryStore {
  fn ensure_ready(&mut self) -> Result<(), TerrainError> {
    Ok(())
  }

  fn contains(&self, key: &str) -> bool {
    self.records.contains_key(key)
  }

  fn load(&self, key: &str) -> Result<Option<ChunkRecord>, TerrainError> {
    match self.records.get(key) {
      Some(record) => {
        record.validate()?;
        Ok(Some(record.clone()))
      }
      None => Ok(None),
    }
  }

  fn save(&mut self, key: &str, record: &ChunkRecord) -> Result<(), TerrainError> {
    self.records.insert(key.to_owned(), record.clone());
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), TerrainError> {
    self.records.remove(key);
    Ok(())
  }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;
