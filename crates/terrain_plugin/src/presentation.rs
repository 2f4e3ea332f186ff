//! Host mesh hand-off.
//!
//! The core never touches scene objects. Whenever a chunk's mesh is built
//! or rebuilt, the world pushes it through a host-provided [`MeshSink`] on
//! the owning context; the host owns upload, attachment and teardown.

use crate::types::{ChunkCoord, Mesh};

/// Host-provided per-chunk mesh consumer.
///
/// `submit` replaces any mesh previously submitted for that chunk
/// wholesale; `remove` retires the chunk's mesh entirely. Both are only
/// ever called from the owning context.
pub trait MeshSink {
  fn submit(&mut self, coords: ChunkCoord, mesh: &Mesh);

  fn remove(&mut self, coords: ChunkCoord);
}

/// No-op sink for headless runs and tests.
pub struct NullSink;

impl MeshSink for NullSink {
  fn submit(&mut self, _coords: ChunkCoord, _mesh: &Mesh) {}

  fn remove(&mut self, _coords: ChunkCoord) {}
}
