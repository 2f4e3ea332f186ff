//! Central-difference gradient estimation over a density field.
//!
//! The per-voxel gradient approximates the local density gradient
//! (steepest-ascent direction) and serves as a smooth surface-normal proxy:
//! unlike a flat per-face normal it varies continuously across a cell, so
//! the mesher can interpolate it along each crossed edge.

use glam::Vec3;

use crate::density::DensityField;

/// Sample spacings below this are treated as degenerate: the division is
/// skipped and the raw central difference is kept, rather than producing
/// NaN or infinite components.
const MIN_SCALE: f32 = 1e-4;

/// One gradient vector per voxel, in the field's linear layout.
///
/// Each component is the central difference along that axis divided by the
/// sample spacing. Out-of-range neighbors clamp to the field boundary, so
/// boundary voxels see a one-sided (half-magnitude) difference. Vectors are
/// left unnormalized here; the mesher renormalizes per cube corner.
pub fn compute_field(field: &DensityField) -> Vec<Vec3> {
  let size = field.size() as i32;
  let scale = field.scale();
  let divide = scale.abs() > MIN_SCALE;

  let mut gradients = Vec::with_capacity(field.samples().len());
  for z in 0..size {
    for y in 0..size {
      for x in 0..size {
        let dx = field.sample(x + 1, y, z) - field.sample(x - 1, y, z);
        let dy = field.sample(x, y + 1, z) - field.sample(x, y - 1, z);
        let dz = field.sample(x, y, z + 1) - field.sample(x, y, z - 1);

        let mut gradient = Vec3::new(dx, dy, dz);
        if divide {
          gradient /= scale;
        }

        gradients.push(gradient);
      }
    }
  }

  gradients
}

#[cfg(test)]
#[path = "gradient_test.rs"]
mod gradient_test;
