//! 2D heightmap grid mesher.
//!
//! The trivial companion to the voxel pipeline: a `width × depth` vertex
//! grid displaced by 2D noise, two triangles per cell, with accumulated
//! per-vertex normals. No density volume, no digging — useful for distant
//! backdrop terrain and as a sanity reference for the mesh format.
//!
//! Unlike the marching cubes output, grid vertices are shared between the
//! triangles that touch them.

use glam::Vec3;

use crate::noise::NoiseSource;
use crate::types::Mesh;

/// Shape parameters for a heightmap sheet.
#[derive(Clone, Copy, Debug)]
pub struct HeightmapParams {
  /// Frequency multiplier for the 2D noise lookup.
  pub noise_frequency: f32,

  /// World-space amplitude of the displacement.
  pub max_height: f32,

  /// World distance between adjacent grid vertices.
  pub scale: f32,
}

impl Default for HeightmapParams {
  fn default() -> Self {
    Self {
      noise_frequency: 0.05,
      max_height: 300.0,
      scale: 25.0,
    }
  }
}

/// Build a `width × depth` heightmap mesh.
///
/// Grids smaller than 2×2 produce no cells and an empty mesh.
pub fn generate(
  width: usize,
  depth: usize,
  params: &HeightmapParams,
  noise: &dyn NoiseSource,
) -> Mesh {
  let mut mesh = Mesh::new();
  if width < 2 || depth < 2 {
    return mesh;
  }

  // Vertex grid, displaced along +Z.
  for y in 0..depth {
    for x in 0..width {
      let n = noise.sample_2d(
        x as f32 * params.noise_frequency,
        y as f32 * params.noise_frequency,
      );
      mesh.positions.push([
        x as f32 * params.scale,
        y as f32 * params.scale,
        n * params.max_height,
      ]);
    }
  }

  // Two triangles per grid cell, wound so flat sheets face +Z.
  for y in 0..depth - 1 {
    for x in 0..width - 1 {
      let i = (x + y * width) as u32;
      let w = width as u32;
      mesh.indices.extend_from_slice(&[i, i + w + 1, i + w]);
      mesh.indices.extend_from_slice(&[i, i + 1, i + w + 1]);
    }
  }

  // Accumulate face normals onto each touched vertex, then normalize.
  let mut accumulated = vec![Vec3::ZERO; mesh.positions.len()];
  for tri in mesh.indices.chunks_exact(3) {
    let p0 = Vec3::from(mesh.positions[tri[0] as usize]);
    let p1 = Vec3::from(mesh.positions[tri[1] as usize]);
    let p2 = Vec3::from(mesh.positions[tri[2] as usize]);

    let face = (p1 - p0).cross(p2 - p0).normalize_or_zero();
    for &index in tri {
      accumulated[index as usize] += face;
    }
  }

  mesh.normals = accumulated
    .into_iter()
    .map(|n| {
      let normal = n.normalize_or_zero();
      if normal == Vec3::ZERO {
        // Degenerate star of faces; point up rather than emit a zero normal.
        [0.0, 0.0, 1.0]
      } else {
        normal.to_array()
      }
    })
    .collect();

  mesh
}

#[cfg(test)]
#[path = "heightmap_test.rs"]
mod heightmap_test;
