//! Core data types shared across the terrain pipeline.

use glam::{IVec3, Vec3};

/// Integer position of a chunk on the world grid.
pub type ChunkCoord = IVec3;

/// Triangle mesh output.
///
/// `positions` and `normals` run in parallel; `indices` holds three entries
/// per triangle. The marching cubes mesher emits one fresh vertex per
/// triangle corner (no welding), so its vertex count is always a multiple of
/// three; the heightmap mesher shares grid vertices between triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
  /// Vertex positions in chunk-local space.
  pub positions: Vec<[f32; 3]>,

  /// Per-vertex unit normals, parallel to `positions`.
  pub normals: Vec<[f32; 3]>,

  /// Triangle indices (3 per triangle).
  pub indices: Vec<u32>,
}

impl Mesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Drop all geometry, preserving allocated capacity.
  pub fn clear(&mut self) {
    self.positions.clear();
    self.normals.clear();
    self.indices.clear();
  }

  /// True when no geometry has been emitted.
  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  pub min: Vec3,
  pub max: Vec3,
}

impl Aabb {
  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self { min, max }
  }

  /// True when a sphere overlaps this box (closest-point test).
  pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
    let closest = center.clamp(self.min, self.max);
    closest.distance_squared(center) <= radius * radius
  }
}

/// Noise parameters shaping a procedurally populated density volume.
///
/// Density at a grid cell is `(world_z / scale - height_bias)` plus
/// `noise_strength` times coherent 3D noise sampled at the world position
/// scaled by `noise_frequency`. Negative density is below the perturbed
/// plane (solid), positive is above (air).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParams {
  /// Frequency multiplier for noise sampling. Smaller = larger features.
  pub noise_frequency: f32,

  /// Height of the base plane, in samples.
  pub height_bias: f32,

  /// Amplitude of the noise perturbation, in density units.
  pub noise_strength: f32,
}

impl Default for TerrainParams {
  fn default() -> Self {
    Self {
      noise_frequency: 0.003,
      height_bias: 20.0,
      noise_strength: 3.0,
    }
  }
}

impl TerrainParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_noise_frequency(mut self, frequency: f32) -> Self {
    self.noise_frequency = frequency;
    self
  }

  pub fn with_height_bias(mut self, bias: f32) -> Self {
    self.height_bias = bias;
    self
  }

  pub fn with_noise_strength(mut self, strength: f32) -> Self {
    self.noise_strength = strength;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mesh_counts() {
    let mut mesh = Mesh::new();
    assert!(mesh.is_empty());

    mesh.positions.push([0.0, 0.0, 0.0]);
    mesh.positions.push([1.0, 0.0, 0.0]);
    mesh.positions.push([0.0, 1.0, 0.0]);
    mesh.normals.extend_from_slice(&[[0.0, 0.0, 1.0]; 3]);
    mesh.indices.extend_from_slice(&[0, 1, 2]);

    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);

    mesh.clear();
    assert!(mesh.is_empty());
    assert_eq!(mesh.triangle_count(), 0);
  }

  #[test]
  fn aabb_sphere_overlap() {
    let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(4.0));

    // Sphere center inside the box.
    assert!(aabb.intersects_sphere(Vec3::splat(2.0), 0.5));
    // Sphere touching a face from outside.
    assert!(aabb.intersects_sphere(Vec3::new(5.0, 2.0, 2.0), 1.0));
    // Clearly separated.
    assert!(!aabb.intersects_sphere(Vec3::new(8.0, 2.0, 2.0), 1.0));
  }
}
