//! Coherent noise sources for terrain generation.

use ::noise::{NoiseFn, Perlin};

/// Deterministic coherent noise in `[-1, 1]`.
///
/// Implementations must be pure functions of position and construction
/// parameters: worker tasks sample them concurrently during chunk
/// generation, and chunks regenerated from the same seed must match.
pub trait NoiseSource: Send + Sync {
  /// 2D noise at the given position.
  fn sample_2d(&self, x: f32, y: f32) -> f32;

  /// 3D noise at the given position.
  fn sample_3d(&self, x: f32, y: f32, z: f32) -> f32;
}

/// Perlin noise source.
#[derive(Clone)]
pub struct PerlinNoise {
  perlin: Perlin,
}

impl PerlinNoise {
  pub fn new(seed: u32) -> Self {
    Self {
      perlin: Perlin::new(seed),
    }
  }
}

impl NoiseSource for PerlinNoise {
  fn sample_2d(&self, x: f32, y: f32) -> f32 {
    self.perlin.get([x as f64, y as f64]) as f32
  }

  fn sample_3d(&self, x: f32, y: f32, z: f32) -> f32 {
    self.perlin.get([x as f64, y as f64, z as f64]) as f32
  }
}
