use super::*;

fn ramp_field(size: usize, scale: f32, f: impl Fn(usize, usize, usize) -> f32) -> DensityField {
  let mut samples = Vec::with_capacity(size * size * size);
  for z in 0..size {
    for y in 0..size {
      for x in 0..size {
        samples.push(f(x, y, z));
      }
    }
  }
  DensityField::from_parts(size, scale, 0.0, samples).unwrap()
}

#[test]
fn one_gradient_per_voxel() {
  let field = ramp_field(5, 1.0, |_, _, _| 0.0);
  assert_eq!(compute_field(&field).len(), 125);
}

#[test]
fn linear_ramp_points_up_the_slope() {
  let field = ramp_field(4, 1.0, |_, _, z| z as f32);
  let gradients = compute_field(&field);

  // Interior voxels see the full central difference.
  let index = field.linear_index(1, 1, 1);
  assert_eq!(gradients[index], Vec3::new(0.0, 0.0, 2.0));

  // Boundary voxels clamp one side, halving the magnitude.
  let bottom = field.linear_index(1, 1, 0);
  let top = field.linear_index(1, 1, 3);
  assert_eq!(gradients[bottom], Vec3::new(0.0, 0.0, 1.0));
  assert_eq!(gradients[top], Vec3::new(0.0, 0.0, 1.0));
}

#[test]
fn gradient_is_divided_by_sample_spacing() {
  let field = ramp_field(4, 2.0, |x, _, _| x as f32);
  let gradients = compute_field(&field);

  let index = field.linear_index(1, 2, 2);
  assert_eq!(gradients[index], Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn near_zero_spacing_skips_the_division() {
  let field = ramp_field(4, 0.0, |_, y, _| y as f32);
  let gradients = compute_field(&field);

  // No NaN/Inf: the raw difference is kept.
  let index = field.linear_index(2, 1, 2);
  assert_eq!(gradients[index], Vec3::new(0.0, 2.0, 0.0));
  assert!(gradients.iter().all(|g| g.is_finite()));
}

#[test]
fn mixed_slope_combines_axes() {
  let field = ramp_field(4, 1.0, |x, y, z| x as f32 + 2.0 * y as f32 - z as f32);
  let gradients = compute_field(&field);

  let index = field.linear_index(1, 1, 1);
  assert_eq!(gradients[index], Vec3::new(2.0, 4.0, -2.0));
}
