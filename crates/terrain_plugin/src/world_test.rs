use std::time::Duration;

use super::*;
use crate::noise::PerlinNoise;
use crate::persistence::MemoryStore;
use crate::types::Mesh;

/// Sink that records every hand-off so tests can observe world → host
/// traffic.
#[derive(Default)]
struct CountingSink {
  submitted: Vec<ChunkCoord>,
  removed: Vec<ChunkCoord>,
}

impl MeshSink for CountingSink {
  fn submit(&mut self, coords: ChunkCoord, _mesh: &Mesh) {
    self.submitted.push(coords);
  }

  fn remove(&mut self, coords: ChunkCoord) {
    self.removed.push(coords);
  }
}

fn test_config() -> WorldConfig {
  WorldConfig::default()
    .with_chunk_size(8)
    .with_scale(1.0)
    .with_stream_radius(1)
    .with_terrain(
      TerrainParams::default()
        .with_noise_frequency(0.1)
        .with_height_bias(3.0)
        .with_noise_strength(1.5),
    )
}

fn test_world() -> ChunkWorld<PerlinNoise, MemoryStore> {
  ChunkWorld::new(test_config(), PerlinNoise::new(77), MemoryStore::new())
}

fn pump_until_idle(world: &mut ChunkWorld<PerlinNoise, MemoryStore>, sink: &mut dyn MeshSink) {
  for _ in 0..5000 {
    world.pump_completions(sink);
    if !world.is_generating() {
      return;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  panic!("generation did not finish");
}

#[test]
fn generation_state_transitions() {
  let mut state = GenerationState::default();
  assert!(!state.is_generating());

  assert!(state.begin(2));
  assert!(state.is_generating());
  assert_eq!(state.progress(), (0, 2));

  // Reentry is rejected without disturbing the running pass.
  assert!(!state.begin(5));
  assert_eq!(state.progress(), (0, 2));

  assert!(!state.on_chunk_complete());
  assert!(state.on_chunk_complete());
  assert!(!state.is_generating());

  // Back to idle, a new pass may start.
  assert!(state.begin(1));
}

#[test]
fn build_grid_generates_all_chunks_asynchronously() {
  let mut world = test_world();
  let mut sink = CountingSink::default();

  world.build_grid(2, 1, 1, &mut sink).unwrap();
  assert_eq!(world.chunk_count(), 2);
  assert!(world.is_generating());

  pump_until_idle(&mut world, &mut sink);
  assert_eq!(world.generation_progress(), (2, 2));

  for x in 0..2 {
    let chunk = world.chunk(IVec3::new(x, 0, 0)).unwrap();
    assert!(chunk.field().is_meshable());
    assert!(!chunk.mesh().is_empty());
    assert!(world.is_persistent(IVec3::new(x, 0, 0)));
  }
  assert_eq!(sink.submitted.len(), 2);
}

#[test]
fn duplicate_generation_requests_are_rejected() {
  let mut world = test_world();
  let mut sink = CountingSink::default();

  world.build_grid(2, 1, 1, &mut sink).unwrap();
  assert!(world.is_generating());

  // Second async request: logged no-op, pass untouched.
  world.generate_all_chunks_async();
  assert_eq!(world.generation_progress().1, 2);

  // Grid rebuild while generating: also rejected.
  world.build_grid(3, 3, 1, &mut sink).unwrap();
  assert_eq!(world.chunk_count(), 2);

  pump_until_idle(&mut world, &mut sink);
}

#[test]
fn adjacent_chunks_share_their_boundary_samples() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(2, 1, 1, &mut sink).unwrap();
  pump_until_idle(&mut world, &mut sink);

  // Chunk (1,0,0) starts at world x = 7, exactly where chunk (0,0,0)'s
  // last sample column sits: the seam row must agree sample for sample.
  let left = world.chunk(IVec3::new(0, 0, 0)).unwrap();
  let right = world.chunk(IVec3::new(1, 0, 0)).unwrap();
  for z in 0..8 {
    for y in 0..8 {
      assert_eq!(left.field().sample(7, y, z), right.field().sample(0, y, z));
    }
  }
}

#[test]
fn dig_on_the_chunk_boundary_remeshes_both_chunks() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(2, 1, 1, &mut sink).unwrap();
  pump_until_idle(&mut world, &mut sink);

  let submitted_before = sink.submitted.len();

  // x = 7 is the shared boundary plane of the two chunks.
  let affected = world.dig_at(Vec3::new(7.0, 3.5, 3.0), 2.0, 25.0, &mut sink);
  assert_eq!(affected, 2);
  assert_eq!(sink.submitted.len(), submitted_before + 2);
}

#[test]
fn dig_missing_all_chunks_touches_nothing() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(1, 1, 1, &mut sink).unwrap();
  pump_until_idle(&mut world, &mut sink);

  let affected = world.dig_at(Vec3::new(100.0, 100.0, 0.0), 1.0, 5.0, &mut sink);
  assert_eq!(affected, 0);
}

#[test]
fn streaming_holds_still_under_small_observer_movement() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(1, 1, 1, &mut sink).unwrap();
  pump_until_idle(&mut world, &mut sink);

  // First update populates the 3x3 window around the observer.
  world.update_streaming(Vec3::new(3.0, 3.0, 0.0), &mut sink);
  assert_eq!(world.chunk_count(), 9);

  let chunk_count = world.chunk_count();
  let submitted = sink.submitted.len();
  let removed = sink.removed.len();

  // Under half a chunk width of movement: hysteresis keeps everything.
  world.update_streaming(Vec3::new(3.4, 3.1, 0.0), &mut sink);
  assert_eq!(world.chunk_count(), chunk_count);
  assert_eq!(sink.submitted.len(), submitted);
  assert_eq!(sink.removed.len(), removed);
}

#[test]
fn streaming_evicts_transient_chunks_but_keeps_persistent_ones() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(1, 1, 1, &mut sink).unwrap();
  pump_until_idle(&mut world, &mut sink);

  world.update_streaming(Vec3::new(3.0, 3.0, 0.0), &mut sink);
  assert!(world.chunk(IVec3::new(-1, -1, 0)).is_some());

  // Observer jumps ten chunks away: the old window is dropped, except the
  // persistent grid chunk.
  let world_size = world.chunk_world_size();
  world.update_streaming(Vec3::new(10.0 * world_size + 1.0, 3.0, 0.0), &mut sink);

  assert!(world.chunk(IVec3::new(-1, -1, 0)).is_none());
  assert!(world.chunk(IVec3::new(0, 0, 0)).is_some());
  assert!(world.chunk(IVec3::new(10, 0, 0)).is_some());
  assert_eq!(world.chunk_count(), 10);
}

#[test]
fn streaming_is_deferred_while_generation_runs() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(1, 1, 1, &mut sink).unwrap();
  assert!(world.is_generating());

  world.update_streaming(Vec3::new(3.0, 3.0, 0.0), &mut sink);
  assert_eq!(world.chunk_count(), 1);

  pump_until_idle(&mut world, &mut sink);
}

#[test]
fn build_grid_loads_persisted_chunks_instead_of_regenerating() {
  // Seed the store with a chunk built from a different noise seed, so a
  // load and a regeneration are distinguishable.
  let mut store = MemoryStore::new();
  let mut donor = TerrainChunk::new(IVec3::ZERO, Vec3::ZERO);
  donor
    .build(8, 1.0, 0.0, &test_config().terrain, &PerlinNoise::new(123))
    .unwrap();
  let record = donor.to_record().unwrap();
  store.save(&chunk_key(IVec3::ZERO), &record).unwrap();

  let mut world = ChunkWorld::new(test_config(), PerlinNoise::new(77), store);
  let mut sink = CountingSink::default();
  world.build_grid(1, 1, 1, &mut sink).unwrap();

  // Everything came from the store: no generation pass started.
  assert!(!world.is_generating());
  assert_eq!(sink.submitted.len(), 1);
  assert_eq!(
    world.chunk(IVec3::ZERO).unwrap().field().samples(),
    record.density.as_slice()
  );
}

#[test]
fn save_persistent_then_refresh_restores_edits() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(2, 1, 1, &mut sink).unwrap();
  pump_until_idle(&mut world, &mut sink);

  let saved = world.save_persistent().unwrap();
  assert_eq!(saved, 2);
  assert!(world.store().contains("chunk_0_0_0"));
  assert!(world.store().contains("chunk_1_0_0"));

  // Mutate, then roll back to the persisted state.
  let pristine = world.chunk(IVec3::ZERO).unwrap().field().clone();
  world.dig_at(Vec3::new(3.0, 3.0, 3.0), 2.0, 30.0, &mut sink);
  assert_ne!(world.chunk(IVec3::ZERO).unwrap().field(), &pristine);

  world.refresh_from_store(&mut sink);
  assert_eq!(world.chunk(IVec3::ZERO).unwrap().field(), &pristine);
}

#[test]
fn rebuilding_the_grid_replaces_existing_chunks() {
  let mut world = test_world();
  let mut sink = CountingSink::default();
  world.build_grid(2, 1, 1, &mut sink).unwrap();
  pump_until_idle(&mut world, &mut sink);

  world.build_grid(1, 1, 1, &mut sink).unwrap();
  assert_eq!(sink.removed.len(), 2);
  assert_eq!(world.chunk_count(), 1);

  pump_until_idle(&mut world, &mut sink);
  assert!(world.chunk(IVec3::ZERO).unwrap().field().is_meshable());
}
