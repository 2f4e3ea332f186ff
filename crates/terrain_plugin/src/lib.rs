//! terrain_plugin - engine-independent destructible voxel terrain.
//!
//! This crate turns 3D scalar density volumes into triangle meshes with the
//! marching cubes algorithm and manages many such volumes as a streamed,
//! editable, persistable world. It owns no scene objects and talks to the
//! host through small traits: a [`NoiseSource`] for procedural density, a
//! [`MeshSink`] receiving finished meshes, and a [`ChunkStore`] persisting
//! density volumes.
//!
//! # Pipeline
//!
//! ```text
//! noise ──▶ DensityField ──▶ gradient field ──▶ marching cubes ──▶ Mesh
//!              ▲    │
//!   dig edits ─┘    └─ ChunkRecord (persistence)
//! ```
//!
//! [`ChunkWorld`] ties it together: it builds chunk grids with density
//! population fanned out onto worker threads (meshing stays on the owning
//! context), routes radial dig edits to every overlapping chunk, streams a
//! window of transient chunks around a moving observer, and saves/loads
//! the chunks marked persistent.
//!
//! # Example
//!
//! ```ignore
//! use terrain_plugin::{ChunkWorld, MemoryStore, NullSink, PerlinNoise, WorldConfig};
//!
//! let mut world = ChunkWorld::new(WorldConfig::default(), PerlinNoise::new(42), MemoryStore::new());
//! let mut sink = NullSink;
//!
//! world.build_grid(5, 5, 1, &mut sink)?;
//! // Owning context, once per frame or timer tick:
//! world.pump_completions(&mut sink);
//! // Later, carve a crater:
//! world.dig_at(glam::Vec3::new(120.0, 80.0, 40.0), 25.0, 20.0, &mut sink);
//! ```

pub mod chunk;
pub mod density;
pub mod error;
pub mod generation;
pub mod gradient;
pub mod heightmap;
pub mod marching_cubes;
pub mod noise;
pub mod persistence;
pub mod presentation;
pub mod types;
pub mod world;

pub use chunk::TerrainChunk;
pub use density::DensityField;
pub use error::TerrainError;
pub use noise::{NoiseSource, PerlinNoise};
pub use persistence::{chunk_key, ChunkRecord, ChunkStore, DirectoryStore, MemoryStore};
pub use presentation::{MeshSink, NullSink};
pub use types::{Aabb, ChunkCoord, Mesh, TerrainParams};
pub use world::{ChunkWorld, GenerationState, WorldConfig};
