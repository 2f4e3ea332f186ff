//! Scalar density volumes.
//!
//! A `DensityField` is a cube of `size³` samples with uniform world spacing.
//! The sign of a sample relative to the field's iso-level defines solid
//! versus empty: below the iso-level is inside the terrain.
//!
//! # Memory Layout
//!
//! ```text
//! index = x + y * size + z * size²
//! ```
//!
//! X is the fastest-varying axis. World position of sample `(x, y, z)` is
//! `origin + (x, y, z) * scale`.

use glam::Vec3;

use crate::error::TerrainError;
use crate::noise::NoiseSource;
use crate::types::TerrainParams;

/// A `size³` scalar grid with uniform sample spacing.
///
/// The buffer is bulk-overwritten by [`populate`](Self::populate) and
/// locally mutated by [`apply_radial`](Self::apply_radial); it is never
/// resized in place. Changing resolution means building a new field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DensityField {
  size: usize,
  scale: f32,
  iso_level: f32,
  samples: Vec<f32>,
}

impl DensityField {
  /// Allocate a zeroed `size³` field.
  pub fn new(size: usize, scale: f32, iso_level: f32) -> Self {
    Self {
      size,
      scale,
      iso_level,
      samples: vec![0.0; size * size * size],
    }
  }

  /// The uninitialized field a fresh chunk starts with.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Reassemble a field from its persisted parts, rejecting any buffer
  /// whose length does not match the declared size.
  pub fn from_parts(
    size: usize,
    scale: f32,
    iso_level: f32,
    samples: Vec<f32>,
  ) -> Result<Self, TerrainError> {
    let expected = size * size * size;
    if samples.len() != expected {
      return Err(TerrainError::InconsistentDensity {
        size,
        actual: samples.len(),
        expected,
      });
    }

    Ok(Self {
      size,
      scale,
      iso_level,
      samples,
    })
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn scale(&self) -> f32 {
    self.scale
  }

  pub fn iso_level(&self) -> f32 {
    self.iso_level
  }

  pub fn samples(&self) -> &[f32] {
    &self.samples
  }

  /// True when the field holds a meshable volume: at least two samples per
  /// axis and a buffer consistent with the declared size. Anything else is
  /// treated as uninitialized and must not be meshed.
  pub fn is_meshable(&self) -> bool {
    self.size > 1 && self.samples.len() == self.size * self.size * self.size
  }

  #[inline]
  pub fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
    x + y * self.size + z * self.size * self.size
  }

  /// Density at the given coordinates, clamped to the nearest valid sample.
  /// The clamping defines gradient behavior at the field boundary.
  #[inline]
  pub fn sample(&self, x: i32, y: i32, z: i32) -> f32 {
    debug_assert!(self.is_meshable());
    let max = (self.size - 1) as i32;
    let x = x.clamp(0, max) as usize;
    let y = y.clamp(0, max) as usize;
    let z = z.clamp(0, max) as usize;
    self.samples[self.linear_index(x, y, z)]
  }

  /// Fill the whole volume from the noise-perturbed plane model.
  ///
  /// For every cell at `world = origin + (x, y, z) * scale`:
  ///
  /// ```text
  /// density = (world.z / scale - height_bias)
  ///         + noise3(world * noise_frequency) * noise_strength
  /// ```
  ///
  /// Negative below the perturbed plane (solid), positive above (air).
  pub fn populate(&mut self, origin: Vec3, params: &TerrainParams, noise: &dyn NoiseSource) {
    let size = self.size;
    for z in 0..size {
      for y in 0..size {
        for x in 0..size {
          let world = origin + Vec3::new(x as f32, y as f32, z as f32) * self.scale;
          let n = noise.sample_3d(
            world.x * params.noise_frequency,
            world.y * params.noise_frequency,
            world.z * params.noise_frequency,
          );
          let density = (world.z / self.scale - params.height_bias) + n * params.noise_strength;
          let index = self.linear_index(x, y, z);
          self.samples[index] = density;
        }
      }
    }
  }

  /// Additive update of every voxel within `radius` of `center` (both in
  /// voxel units), scaled by a linear falloff that reaches zero at the
  /// radius boundary. Voxels outside the field are skipped, not clamped.
  ///
  /// The update is sign-agnostic; callers pick the sign of `strength` for
  /// the effect they want. Returns the number of samples touched.
  pub fn apply_radial(&mut self, center: Vec3, radius: f32, strength: f32) -> usize {
    if radius <= 0.0 {
      return 0;
    }

    let size = self.size as i32;
    let reach = radius.ceil() as i32;
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    let cz = center.z.round() as i32;

    let mut modified = 0;
    for z in (cz - reach)..=(cz + reach) {
      for y in (cy - reach)..=(cy + reach) {
        for x in (cx - reach)..=(cx + reach) {
          if x < 0 || y < 0 || z < 0 || x >= size || y >= size || z >= size {
            continue;
          }

          let distance = Vec3::new(x as f32, y as f32, z as f32).distance(center);
          if distance <= radius {
            let index = self.linear_index(x as usize, y as usize, z as usize);
            self.samples[index] += strength * (1.0 - distance / radius);
            modified += 1;
          }
        }
      }
    }

    modified
  }

  /// Min/max over all samples, or `None` for an empty field. Used for
  /// post-edit diagnostics.
  pub fn extent(&self) -> Option<(f32, f32)> {
    let mut iter = self.samples.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
  }
}

#[cfg(test)]
#[path = "density_test.rs"]
mod density_test;
