//! A single terrain chunk: one density volume plus its extracted mesh.

use glam::Vec3;
use tracing::{debug, warn};

use crate::density::DensityField;
use crate::error::TerrainError;
use crate::gradient;
use crate::marching_cubes;
use crate::noise::NoiseSource;
use crate::persistence::ChunkRecord;
use crate::types::{Aabb, ChunkCoord, Mesh, TerrainParams};

/// One independently generated, edited and streamed cube of terrain.
///
/// Lifecycle: created empty, then populated (procedurally or from a
/// persisted record), meshed, optionally dug and re-meshed any number of
/// times, optionally serialized, and finally destroyed when the world
/// evicts it.
#[derive(Clone, Debug)]
pub struct TerrainChunk {
  coords: ChunkCoord,
  origin: Vec3,
  field: DensityField,
  mesh: Mesh,
}

impl TerrainChunk {
  /// Create an empty chunk at the given grid coordinate and world origin.
  pub fn new(coords: ChunkCoord, origin: Vec3) -> Self {
    Self {
      coords,
      origin,
      field: DensityField::empty(),
      mesh: Mesh::new(),
    }
  }

  pub fn coords(&self) -> ChunkCoord {
    self.coords
  }

  pub fn origin(&self) -> Vec3 {
    self.origin
  }

  pub fn field(&self) -> &DensityField {
    &self.field
  }

  pub fn field_mut(&mut self) -> &mut DensityField {
    &mut self.field
  }

  pub fn mesh(&self) -> &Mesh {
    &self.mesh
  }

  /// Populate a fresh `size³` density volume from noise and mesh it.
  pub fn build(
    &mut self,
    size: usize,
    scale: f32,
    iso_level: f32,
    params: &TerrainParams,
    noise: &dyn NoiseSource,
  ) -> Result<(), TerrainError> {
    let mut field = DensityField::new(size, scale, iso_level);
    field.populate(self.origin, params, noise);
    self.field = field;
    self.rebuild_mesh()
  }

  /// Install an externally populated density volume without meshing it.
  /// Used by the async generation path, which meshes on the owning context.
  pub fn install_field(&mut self, field: DensityField) {
    self.field = field;
  }

  /// Re-extract the mesh from the current density volume, replacing the old
  /// mesh wholesale.
  ///
  /// Guarded: an uninitialized or inconsistent volume clears the mesh and
  /// reports the condition instead of meshing garbage.
  pub fn rebuild_mesh(&mut self) -> Result<(), TerrainError> {
    if !self.field.is_meshable() {
      self.mesh.clear();
      let size = self.field.size();
      return Err(TerrainError::InconsistentDensity {
        size,
        actual: self.field.samples().len(),
        expected: size * size * size,
      });
    }

    let gradients = gradient::compute_field(&self.field);
    self.mesh = marching_cubes::generate(&self.field, &gradients, self.field.iso_level());

    debug!(
      coords = ?self.coords,
      vertices = self.mesh.vertex_count(),
      triangles = self.mesh.triangle_count(),
      "chunk mesh rebuilt"
    );
    Ok(())
  }

  /// Apply a radial additive density edit centered at `local_center` (in
  /// voxel units) and synchronously re-mesh.
  ///
  /// Returns the number of samples touched.
  pub fn dig(
    &mut self,
    local_center: Vec3,
    radius_voxels: f32,
    strength: f32,
  ) -> Result<usize, TerrainError> {
    if !self.field.is_meshable() {
      warn!(coords = ?self.coords, "dig on an unpopulated chunk ignored");
      return Ok(0);
    }

    let modified = self.field.apply_radial(local_center, radius_voxels, strength);
    if let Some((min, max)) = self.field.extent() {
      debug!(
        coords = ?self.coords,
        modified,
        density_min = min,
        density_max = max,
        "chunk density edited"
      );
    }

    self.rebuild_mesh()?;
    Ok(modified)
  }

  /// World-space bounds of the sampled volume.
  pub fn world_bounds(&self) -> Aabb {
    let extent = self.field.size().saturating_sub(1) as f32 * self.field.scale();
    Aabb::new(self.origin, self.origin + Vec3::splat(extent))
  }

  /// True when a sphere of `radius` around `world_pos` overlaps this
  /// chunk's bounds. Lets the world route edits without touching density.
  pub fn contains_point(&self, world_pos: Vec3, radius: f32) -> bool {
    self.world_bounds().intersects_sphere(world_pos, radius)
  }

  /// Snapshot the density volume for persistence, or `None` when the chunk
  /// was never populated.
  pub fn to_record(&self) -> Option<ChunkRecord> {
    if self.field.samples().is_empty() {
      return None;
    }

    Some(ChunkRecord {
      size: self.field.size() as u32,
      scale: self.field.scale(),
      iso_level: self.field.iso_level(),
      density: self.field.samples().to_vec(),
    })
  }

  /// Replace the density volume from a persisted record and re-mesh.
  ///
  /// The record is validated before anything is replaced; a bad record
  /// leaves the chunk untouched (no partial load).
  pub fn load_record(&mut self, record: ChunkRecord) -> Result<(), TerrainError> {
    let field = DensityField::from_parts(
      record.size as usize,
      record.scale,
      record.iso_level,
      record.density,
    )?;

    self.field = field;
    self.rebuild_mesh()
  }

  /// Drop the density volume and mesh back to the empty state.
  pub fn clear(&mut self) {
    self.field = DensityField::empty();
    self.mesh.clear();
  }
}

#[cfg(test)]
#[path = "chunk_test.rs"]
mod chunk_test;
