use glam::Vec3;

use super::*;
use crate::noise::PerlinNoise;

/// Noise source that always returns zero, leaving only the plane term.
struct FlatNoise;

impl NoiseSource for FlatNoise {
  fn sample_2d(&self, _x: f32, _y: f32) -> f32 {
    0.0
  }

  fn sample_3d(&self, _x: f32, _y: f32, _z: f32) -> f32 {
    0.0
  }
}

#[test]
fn linear_layout_is_x_fastest() {
  let size = 4;
  let samples: Vec<f32> = (0..size * size * size).map(|i| i as f32).collect();
  let field = DensityField::from_parts(size, 1.0, 0.0, samples).unwrap();

  for z in 0..size {
    for y in 0..size {
      for x in 0..size {
        let expected = (x + y * size + z * size * size) as f32;
        assert_eq!(field.sample(x as i32, y as i32, z as i32), expected);
      }
    }
  }
}

#[test]
fn sampling_clamps_out_of_range_coordinates() {
  let size = 4;
  let samples: Vec<f32> = (0..size * size * size).map(|i| i as f32).collect();
  let field = DensityField::from_parts(size, 1.0, 0.0, samples).unwrap();

  assert_eq!(field.sample(-5, 0, 0), field.sample(0, 0, 0));
  assert_eq!(field.sample(17, 2, 1), field.sample(3, 2, 1));
  assert_eq!(field.sample(1, -1, 9), field.sample(1, 0, 3));
}

#[test]
fn populate_is_deterministic() {
  let noise = PerlinNoise::new(42);
  let params = TerrainParams::default().with_noise_frequency(0.05);

  let mut a = DensityField::new(8, 2.0, 0.0);
  let mut b = DensityField::new(8, 2.0, 0.0);
  a.populate(Vec3::new(10.0, -4.0, 0.0), &params, &noise);
  b.populate(Vec3::new(10.0, -4.0, 0.0), &params, &noise);

  assert_eq!(a.samples(), b.samples());
}

#[test]
fn populate_builds_a_plane_without_noise() {
  let mut field = DensityField::new(4, 1.0, 0.0);
  let params = TerrainParams::default()
    .with_height_bias(1.5)
    .with_noise_strength(0.0);
  field.populate(Vec3::ZERO, &params, &FlatNoise);

  // density = z - 1.5: solid below the plane, air above.
  assert_eq!(field.sample(0, 0, 0), -1.5);
  assert_eq!(field.sample(3, 2, 1), -0.5);
  assert_eq!(field.sample(1, 1, 2), 0.5);
  assert_eq!(field.sample(0, 0, 3), 1.5);
}

#[test]
fn populate_respects_world_origin() {
  let noise = PerlinNoise::new(9);
  let params = TerrainParams::default().with_noise_frequency(0.1);
  let scale = 2.0;

  // Overlapping sample rows of two adjacent volumes agree: the world
  // position, not the local index, drives the density value.
  let mut left = DensityField::new(4, scale, 0.0);
  let mut right = DensityField::new(4, scale, 0.0);
  left.populate(Vec3::ZERO, &params, &noise);
  right.populate(Vec3::new(3.0 * scale, 0.0, 0.0), &params, &noise);

  for z in 0..4 {
    for y in 0..4 {
      assert_eq!(left.sample(3, y, z), right.sample(0, y, z));
    }
  }
}

#[test]
fn from_parts_rejects_mismatched_buffer() {
  let result = DensityField::from_parts(4, 1.0, 0.0, vec![0.0; 63]);
  assert!(matches!(
    result,
    Err(TerrainError::InconsistentDensity {
      size: 4,
      actual: 63,
      expected: 64,
    })
  ));
}

#[test]
fn empty_field_is_not_meshable() {
  assert!(!DensityField::empty().is_meshable());
  assert!(!DensityField::new(1, 1.0, 0.0).is_meshable());
  assert!(DensityField::new(2, 1.0, 0.0).is_meshable());
}

#[test]
fn radial_update_applies_linear_falloff() {
  let mut field = DensityField::new(8, 1.0, 0.0);
  let center = Vec3::new(4.0, 4.0, 4.0);
  let modified = field.apply_radial(center, 2.0, 10.0);
  assert!(modified > 0);

  // Full strength at the center, fading toward the boundary.
  assert_eq!(field.sample(4, 4, 4), 10.0);
  assert_eq!(field.sample(5, 4, 4), 5.0);
  assert_eq!(field.sample(6, 4, 4), 0.0);
  // Outside the radius: untouched.
  assert_eq!(field.sample(4, 4, 1), 0.0);
}

#[test]
fn radial_update_skips_out_of_bounds_voxels() {
  let mut field = DensityField::new(4, 1.0, 0.0);
  let near_corner = field.apply_radial(Vec3::ZERO, 1.5, 1.0);
  let interior = {
    let mut other = DensityField::new(8, 1.0, 0.0);
    other.apply_radial(Vec3::splat(4.0), 1.5, 1.0)
  };

  // The corner sphere is clipped by the field bounds.
  assert!(near_corner > 0);
  assert!(near_corner < interior);
}

#[test]
fn radial_update_with_zero_strength_changes_nothing() {
  let mut field = DensityField::new(6, 1.0, 0.0);
  let params = TerrainParams::default().with_height_bias(2.0);
  field.populate(Vec3::ZERO, &params, &PerlinNoise::new(3));
  let before = field.clone();

  field.apply_radial(Vec3::splat(3.0), 2.0, 0.0);
  assert_eq!(field, before);
}

#[test]
fn extent_tracks_min_and_max() {
  assert_eq!(DensityField::empty().extent(), None);

  let field = DensityField::from_parts(2, 1.0, 0.0, vec![3.0, -7.0, 0.5, 2.0, 1.0, 0.0, -1.0, 4.0])
    .unwrap();
  assert_eq!(field.extent(), Some((-7.0, 4.0)));
}
