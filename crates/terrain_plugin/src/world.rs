//! Multi-chunk world management.
//!
//! `ChunkWorld` owns every live [`TerrainChunk`], keyed by its grid
//! coordinate, and coordinates the four things that happen to them: bulk
//! grid builds with concurrent density generation, radial edits routed to
//! every overlapping chunk, a streamed window of transient chunks around a
//! moving observer, and persistence of the chunks marked as permanent.
//!
//! # Threading
//!
//! Everything on `ChunkWorld` runs on the single owning context. The only
//! concurrency is density population, fanned out through
//! [`GenerationQueue`](crate::generation::GenerationQueue) onto the rayon
//! pool; results come back over a channel and are installed and meshed by
//! [`pump_completions`](ChunkWorld::pump_completions) on the owning
//! context. That keeps the completion counter free of any lock, because
//! every increment is serialized here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use glam::{IVec3, Vec3};
use tracing::{debug, info, warn};

use crate::chunk::TerrainChunk;
use crate::error::TerrainError;
use crate::generation::{DensityJob, GenerationQueue};
use crate::noise::NoiseSource;
use crate::persistence::{chunk_key, ChunkStore};
use crate::presentation::MeshSink;
use crate::types::{ChunkCoord, TerrainParams};

/// Generation and streaming configuration for a chunk world.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
  /// Samples per chunk axis.
  pub chunk_size: usize,

  /// World distance between adjacent samples.
  pub scale: f32,

  /// Density threshold defining the surface.
  pub iso_level: f32,

  /// Noise parameters for procedural population.
  pub terrain: TerrainParams,

  /// Streamed window half-width, in chunks.
  pub stream_radius: i32,
}

impl Default for WorldConfig {
  fn default() -> Self {
    Self {
      chunk_size: 32,
      scale: 50.0,
      iso_level: 0.0,
      terrain: TerrainParams::default(),
      stream_radius: 2,
    }
  }
}

impl WorldConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
    self.chunk_size = chunk_size;
    self
  }

  pub fn with_scale(mut self, scale: f32) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_iso_level(mut self, iso_level: f32) -> Self {
    self.iso_level = iso_level;
    self
  }

  pub fn with_terrain(mut self, terrain: TerrainParams) -> Self {
    self.terrain = terrain;
    self
  }

  pub fn with_stream_radius(mut self, stream_radius: i32) -> Self {
    self.stream_radius = stream_radius;
    self
  }
}

/// Progress of the single allowed full-grid generation pass.
///
/// All transitions happen on the owning context; entering and leaving the
/// generating state goes through [`begin`](Self::begin) and
/// [`on_chunk_complete`](Self::on_chunk_complete) only, which is what
/// enforces the no-reentrant-generation invariant.
#[derive(Debug, Default)]
pub struct GenerationState {
  generating: bool,
  completed: usize,
  total: usize,
}

impl GenerationState {
  /// Try to enter the generating state for a pass of `total` chunks.
  /// Returns false — and changes nothing — when a pass is already active.
  pub(crate) fn begin(&mut self, total: usize) -> bool {
    if self.generating {
      return false;
    }

    self.generating = true;
    self.completed = 0;
    self.total = total;
    true
  }

  /// Record one finished chunk. Returns true when this completion ended
  /// the pass.
  pub(crate) fn on_chunk_complete(&mut self) -> bool {
    if !self.generating {
      return false;
    }

    self.completed += 1;
    if self.completed >= self.total {
      self.generating = false;
      return true;
    }
    false
  }

  pub fn is_generating(&self) -> bool {
    self.generating
  }

  /// `(completed, total)` of the current pass; `(0, 0)` when idle and no
  /// pass has run.
  pub fn progress(&self) -> (usize, usize) {
    (self.completed, self.total)
  }
}

/// A dynamic collection of terrain chunks on an integer grid.
pub struct ChunkWorld<N: NoiseSource + 'static, S: ChunkStore> {
  config: WorldConfig,
  noise: Arc<N>,
  store: S,
  chunks: HashMap<ChunkCoord, TerrainChunk>,
  persistent: HashSet<ChunkCoord>,
  state: GenerationState,
  queue: GenerationQueue,
  last_stream_center: Option<Vec3>,
}

impl<N: NoiseSource + 'static, S: ChunkStore> ChunkWorld<N, S> {
  pub fn new(config: WorldConfig, noise: N, store: S) -> Self {
    Self {
      config,
      noise: Arc::new(noise),
      store,
      chunks: HashMap::new(),
      persistent: HashSet::new(),
      state: GenerationState::default(),
      queue: GenerationQueue::new(),
      last_stream_center: None,
    }
  }

  pub fn config(&self) -> &WorldConfig {
    &self.config
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn chunk_count(&self) -> usize {
    self.chunks.len()
  }

  pub fn chunk(&self, coords: ChunkCoord) -> Option<&TerrainChunk> {
    self.chunks.get(&coords)
  }

  pub fn is_generating(&self) -> bool {
    self.state.is_generating()
  }

  pub fn generation_progress(&self) -> (usize, usize) {
    self.state.progress()
  }

  pub fn is_persistent(&self, coords: ChunkCoord) -> bool {
    self.persistent.contains(&coords)
  }

  /// Exempt a chunk from streaming eviction.
  pub fn mark_persistent(&mut self, coords: ChunkCoord) {
    self.persistent.insert(coords);
  }

  /// World-space width of one chunk. Adjacent chunks are offset by
  /// `(chunk_size - 1) · scale`, not `chunk_size · scale`, so they share a
  /// boundary row of samples and the surface stays seamless across edges.
  pub fn chunk_world_size(&self) -> f32 {
    self.config.chunk_size.saturating_sub(1) as f32 * self.config.scale
  }

  fn chunk_origin(&self, coords: ChunkCoord) -> Vec3 {
    coords.as_vec3() * self.chunk_world_size()
  }

  /// Probe the store for this chunk's record and load it if present.
  /// Returns true when the chunk now holds loaded, meshed data.
  fn try_load(&self, chunk: &mut TerrainChunk) -> bool {
    let key = chunk_key(chunk.coords());
    match self.store.load(&key) {
      Ok(Some(record)) => match chunk.load_record(record) {
        Ok(()) => {
          debug!(%key, "chunk loaded from store");
          true
        }
        Err(err) => {
          warn!(%key, %err, "persisted chunk rejected, falling back to generation");
          false
        }
      },
      Ok(None) => false,
      Err(err) => {
        warn!(%key, %err, "chunk load failed, falling back to generation");
        false
      }
    }
  }

  /// Replace the world contents with a fresh `nx × ny × nz` grid.
  ///
  /// Every grid chunk is marked persistent. Coordinates with a persisted
  /// record load immediately; the rest are scheduled for asynchronous
  /// generation. Rejected as a logged no-op while a generation pass is
  /// already in flight.
  pub fn build_grid(
    &mut self,
    nx: i32,
    ny: i32,
    nz: i32,
    sink: &mut dyn MeshSink,
  ) -> Result<(), TerrainError> {
    if self.state.is_generating() {
      warn!("generation already in progress, ignoring grid build");
      return Ok(());
    }

    for coords in self.chunks.keys() {
      sink.remove(*coords);
    }
    self.chunks.clear();
    self.persistent.clear();

    self.store.ensure_ready()?;

    let mut loaded = 0;
    for z in 0..nz {
      for y in 0..ny {
        for x in 0..nx {
          let coords = IVec3::new(x, y, z);
          let mut chunk = TerrainChunk::new(coords, self.chunk_origin(coords));

          if self.try_load(&mut chunk) {
            sink.submit(coords, chunk.mesh());
            loaded += 1;
          }

          self.chunks.insert(coords, chunk);
          self.persistent.insert(coords);
        }
      }
    }

    info!(
      chunks = self.chunks.len(),
      loaded, "terrain grid created"
    );
    self.generate_all_chunks_async();
    Ok(())
  }

  /// Schedule density population for every chunk that has no data yet.
  ///
  /// Population runs on the worker pool; meshing happens later in
  /// [`pump_completions`](Self::pump_completions). A second request while a
  /// pass is active is rejected (logged), never queued.
  pub fn generate_all_chunks_async(&mut self) {
    let pending: Vec<ChunkCoord> = self
      .chunks
      .iter()
      .filter(|(_, chunk)| !chunk.field().is_meshable())
      .map(|(coords, _)| *coords)
      .collect();

    if pending.is_empty() {
      debug!("no chunks awaiting generation");
      return;
    }

    if !self.state.begin(pending.len()) {
      warn!("generation already in progress, ignoring request");
      return;
    }

    info!(chunks = pending.len(), "starting asynchronous terrain generation");
    for coords in pending {
      let job = DensityJob {
        coords,
        origin: self.chunk_origin(coords),
        size: self.config.chunk_size,
        scale: self.config.scale,
        iso_level: self.config.iso_level,
        params: self.config.terrain,
      };
      self.queue.spawn(job, Arc::clone(&self.noise));
    }
  }

  /// Drain finished density volumes, mesh them, and hand the meshes to the
  /// host. Must be called from the owning context (typically once per
  /// frame or timer tick). Returns the number of chunks completed.
  pub fn pump_completions(&mut self, sink: &mut dyn MeshSink) -> usize {
    let completions = self.queue.try_drain();
    let mut completed = 0;

    for completion in completions {
      let coords = completion.coords;

      if let Some(chunk) = self.chunks.get_mut(&coords) {
        chunk.install_field(completion.field);
        match chunk.rebuild_mesh() {
          Ok(()) => sink.submit(coords, chunk.mesh()),
          Err(err) => warn!(?coords, %err, "generated chunk failed to mesh"),
        }
        debug!(
          ?coords,
          elapsed_us = completion.elapsed_us,
          "chunk generation completed"
        );
      } else {
        // The chunk vanished while its volume was in flight. Still counts
        // toward the pass, or the state machine would never close.
        debug!(?coords, "dropping completion for a dead chunk");
      }

      completed += 1;
      if self.state.on_chunk_complete() {
        info!("all chunks generated");
      }
    }

    completed
  }

  /// Apply a radial density edit to every chunk whose bounds intersect the
  /// sphere, re-meshing each affected chunk once. Returns the number of
  /// chunks touched.
  ///
  /// Chunks straddling the sphere each update their own copy of the shared
  /// boundary samples; digging near a chunk edge can therefore desync the
  /// duplicated seam row. Known limitation.
  pub fn dig_at(
    &mut self,
    world_pos: Vec3,
    radius: f32,
    strength: f32,
    sink: &mut dyn MeshSink,
  ) -> usize {
    debug!(?world_pos, radius, strength, "dig requested");
    let mut affected = 0;

    for (coords, chunk) in self.chunks.iter_mut() {
      if !chunk.field().is_meshable() || !chunk.contains_point(world_pos, radius) {
        continue;
      }

      let scale = chunk.field().scale();
      // Local voxel space, center snapped to the nearest sample.
      let local_center = ((world_pos - chunk.origin()) / scale).round();
      let radius_voxels = (radius / scale).ceil();

      let modified = chunk
        .field_mut()
        .apply_radial(local_center, radius_voxels, strength);

      match chunk.rebuild_mesh() {
        Ok(()) => {
          sink.submit(*coords, chunk.mesh());
          affected += 1;
          debug!(?coords, modified, "chunk modified by dig");
        }
        Err(err) => warn!(?coords, %err, "dug chunk failed to mesh"),
      }
    }

    if affected == 0 {
      warn!("no chunks were affected by the dig operation");
    }
    affected
  }

  /// Maintain the streamed window of transient chunks around the observer.
  ///
  /// Intended to run on a fixed timer cadence, not every frame. Skipped
  /// while a full-grid generation pass is in flight, and a no-op while the
  /// observer stays within half a chunk width of the last recorded chunk
  /// center (hysteresis against boundary thrashing). Streaming is
  /// horizontal: the window lives at Z = 0.
  pub fn update_streaming(&mut self, observer: Vec3, sink: &mut dyn MeshSink) {
    if self.state.is_generating() {
      debug!("streaming update deferred while generation is in flight");
      return;
    }

    let world_size = self.chunk_world_size();
    if world_size <= f32::EPSILON {
      warn!("degenerate chunk world size, streaming disabled");
      return;
    }

    let observer_coords = IVec3::new(
      (observer.x / world_size).floor() as i32,
      (observer.y / world_size).floor() as i32,
      0,
    );

    let center = observer_coords.as_vec3() * world_size;
    if let Some(last) = self.last_stream_center {
      if center.distance(last) < world_size * 0.5 {
        return;
      }
    }
    self.last_stream_center = Some(center);
    debug!(
      x = observer_coords.x,
      y = observer_coords.y,
      "observer moved to a new chunk"
    );

    let radius = self.config.stream_radius;
    let mut desired = HashSet::new();
    for dx in -radius..=radius {
      for dy in -radius..=radius {
        desired.insert(IVec3::new(
          observer_coords.x + dx,
          observer_coords.y + dy,
          0,
        ));
      }
    }

    // Evict transient chunks that fell out of the window.
    let evicted: Vec<ChunkCoord> = self
      .chunks
      .keys()
      .filter(|coords| !desired.contains(*coords) && !self.persistent.contains(*coords))
      .copied()
      .collect();
    for coords in evicted {
      debug!(?coords, "removing distant chunk");
      self.chunks.remove(&coords);
      sink.remove(coords);
    }

    // Create what the window still lacks: load when persisted, otherwise
    // generate synchronously (density + mesh, right here on the owning
    // context).
    for coords in desired {
      if self.chunks.contains_key(&coords) {
        continue;
      }

      debug!(?coords, "creating streamed chunk");
      let mut chunk = TerrainChunk::new(coords, self.chunk_origin(coords));
      if !self.try_load(&mut chunk) {
        if let Err(err) = chunk.build(
          self.config.chunk_size,
          self.config.scale,
          self.config.iso_level,
          &self.config.terrain,
          self.noise.as_ref(),
        ) {
          warn!(?coords, %err, "streamed chunk generation failed");
        }
      }

      sink.submit(coords, chunk.mesh());
      self.chunks.insert(coords, chunk);
    }
  }

  /// Write every persistent chunk's record to the store. The teardown
  /// path; transient streamed chunks are not saved. Returns how many
  /// records were written.
  pub fn save_persistent(&mut self) -> Result<usize, TerrainError> {
    self.store.ensure_ready()?;

    let mut saved = 0;
    for coords in &self.persistent {
      let Some(chunk) = self.chunks.get(coords) else {
        continue;
      };
      let Some(record) = chunk.to_record() else {
        debug!(?coords, "skipping unpopulated chunk");
        continue;
      };

      self.store.save(&chunk_key(*coords), &record)?;
      saved += 1;
    }

    info!(saved, "persistent chunks saved");
    Ok(saved)
  }

  /// Reload every live chunk that has a persisted record, replacing its
  /// in-memory state. Chunks without a record are left as they are.
  pub fn refresh_from_store(&mut self, sink: &mut dyn MeshSink) {
    for (coords, chunk) in self.chunks.iter_mut() {
      let key = chunk_key(*coords);
      match self.store.load(&key) {
        Ok(Some(record)) => match chunk.load_record(record) {
          Ok(()) => {
            sink.submit(*coords, chunk.mesh());
            debug!(%key, "chunk reloaded from store");
          }
          Err(err) => warn!(%key, %err, "persisted chunk rejected on refresh"),
        },
        Ok(None) => {}
        Err(err) => warn!(%key, %err, "chunk refresh failed"),
      }
    }
  }
}

#[cfg(test)]
#[path = "world_test.rs"]
mod world_test;
