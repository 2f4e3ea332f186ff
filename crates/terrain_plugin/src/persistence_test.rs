use glam::IVec3;

use super::*;

fn sample_record(size: u32) -> ChunkRecord {
  let count = (size as usize).pow(3);
  ChunkRecord {
    size,
    scale: 2.0,
    iso_level: 0.0,
    density: (0..count).map(|i| i as f32 * 0.25 - 4.0).collect(),
  }
}

#[test]
fn chunk_keys_encode_signed_coordinates() {
  assert_eq!(chunk_key(IVec3::new(0, 0, 0)), "chunk_0_0_0");
  assert_eq!(chunk_key(IVec3::new(1, -2, 3)), "chunk_1_-2_3");
}

#[test]
fn record_validation_checks_the_cube() {
  assert!(sample_record(4).validate().is_ok());

  let mut bad = sample_record(4);
  bad.density.pop();
  assert!(matches!(
    bad.validate(),
    Err(TerrainError::InconsistentDensity {
      size: 4,
      actual: 63,
      expected: 64,
    })
  ));
}

#[test]
fn memory_store_round_trip() {
  let mut store = MemoryStore::new();
  store.ensure_ready().unwrap();
  assert!(store.is_empty());

  let record = sample_record(4);
  store.save("chunk_0_0_0", &record).unwrap();

  assert!(store.contains("chunk_0_0_0"));
  assert!(!store.contains("chunk_1_0_0"));
  assert_eq!(store.len(), 1);
  assert_eq!(store.load("chunk_0_0_0").unwrap(), Some(record));
  assert_eq!(store.load("chunk_1_0_0").unwrap(), None);

  store.remove("chunk_0_0_0").unwrap();
  assert!(!store.contains("chunk_0_0_0"));
}

#[test]
fn memory_store_rejects_corrupt_records_on_load() {
  let mut store = MemoryStore::new();
  let mut bad = sample_record(4);
  bad.density.truncate(10);
  store.save("chunk_0_0_0", &bad).unwrap();

  assert!(store.load("chunk_0_0_0").is_err());
}

#[test]
fn directory_store_round_trip() {
  let root = std::env::temp_dir().join(format!(
    "terrain_plugin_store_{}_{}",
    std::process::id(),
    "round_trip"
  ));
  let _ = std::fs::remove_dir_all(&root);

  let mut store = DirectoryStore::new(&root);
  store.ensure_ready().unwrap();

  let record = sample_record(3);
  let key = chunk_key(IVec3::new(2, -1, 0));
  store.save(&key, &record).unwrap();

  assert!(store.contains(&key));
  assert_eq!(store.load(&key).unwrap(), Some(record));

  // Missing keys are absence, not failure.
  assert!(!store.contains("chunk_9_9_9"));
  assert_eq!(store.load("chunk_9_9_9").unwrap(), None);

  store.remove(&key).unwrap();
  assert!(!store.contains(&key));
  // Removing again stays quiet.
  store.remove(&key).unwrap();

  let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn directory_store_fails_corrupt_files_whole() {
  let root = std::env::temp_dir().join(format!(
    "terrain_plugin_store_{}_{}",
    std::process::id(),
    "corrupt"
  ));
  let _ = std::fs::remove_dir_all(&root);

  let mut store = DirectoryStore::new(&root);
  store.ensure_ready().unwrap();

  // Not JSON at all.
  std::fs::write(store.root().join("chunk_0_0_0.json"), b"not json").unwrap();
  assert!(store.load("chunk_0_0_0").is_err());

  // Valid JSON, inconsistent payload.
  let mut truncated = sample_record(4);
  truncated.density.truncate(5);
  std::fs::write(
    store.root().join("chunk_1_0_0.json"),
    serde_json::to_string(&truncated).unwrap(),
  )
  .unwrap();
  assert!(store.load("chunk_1_0_0").is_err());

  let _ = std::fs::remove_dir_all(&root);
}
