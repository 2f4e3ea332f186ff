//! Marching cubes isosurface extraction.
//!
//! Converts a density volume and its gradient field into a triangle mesh
//! approximating the iso-level surface, one unit cube at a time.
//!
//! # Processing Pipeline
//!
//! ```text
//! For each of the (size-1)³ unit cubes:
//!   1. Load the 8 corner densities and normalized corner gradients
//!   2. Build the 8-bit case index (bit i set when corner i < iso-level)
//!   3. EDGE_TABLE[case] == 0  →  cube fully inside/outside, skip
//!   4. Interpolate a vertex (position + blended normal) on each crossed edge
//!   5. TRI_TABLE[case] emits triangles as edge-index triples
//! ```
//!
//! Every triangle corner becomes a fresh vertex: nothing is welded across
//! triangles, trading memory for a single-pass build with no edge cache.
//! Vertices carry the interpolated gradient as their normal; a blend that
//! cancels to zero falls back to the triangle's flat face normal so every
//! emitted normal is finite and unit length.

mod tables;

pub use tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

use glam::{Vec3, Vec3A};

use crate::density::DensityField;
use crate::types::Mesh;

/// Tolerance for the interpolation tie-breaks: corner values this close to
/// the iso-level (or to each other) snap to a corner instead of dividing.
const ISO_EPSILON: f32 = 1e-4;

/// Threshold below which a squared length counts as a zero vector.
const MIN_NORMAL_LENGTH_SQ: f32 = 1e-12;

/// A vertex interpolated on a cube edge. The normal may be the zero vector
/// when the blended corner gradients cancel; emission resolves that case.
#[derive(Clone, Copy)]
struct EdgeVertex {
  position: Vec3A,
  normal: Vec3A,
}

impl EdgeVertex {
  const ZERO: Self = Self {
    position: Vec3A::ZERO,
    normal: Vec3A::ZERO,
  };
}

/// Extract the iso-surface of `field` as a triangle mesh.
///
/// `gradients` must be the per-voxel gradient field of `field` in the same
/// linear layout; callers are expected to have validated the field before
/// meshing (see `TerrainChunk::rebuild_mesh`).
pub fn generate(field: &DensityField, gradients: &[Vec3], iso_level: f32) -> Mesh {
  debug_assert!(field.is_meshable());
  debug_assert_eq!(gradients.len(), field.samples().len());

  let mut mesh = Mesh::new();
  let size = field.size();

  for z in 0..size - 1 {
    for y in 0..size - 1 {
      for x in 0..size - 1 {
        process_cube(field, gradients, [x, y, z], iso_level, &mut mesh);
      }
    }
  }

  mesh
}

/// Triangulate a single unit cube of the grid.
fn process_cube(
  field: &DensityField,
  gradients: &[Vec3],
  pos: [usize; 3],
  iso_level: f32,
  mesh: &mut Mesh,
) {
  let scale = field.scale();
  let mut corner_pos = [Vec3A::ZERO; 8];
  let mut corner_val = [0.0f32; 8];
  let mut corner_grad = [Vec3A::ZERO; 8];

  for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
    let cx = pos[0] + offset[0] as usize;
    let cy = pos[1] + offset[1] as usize;
    let cz = pos[2] + offset[2] as usize;
    let index = field.linear_index(cx, cy, cz);

    corner_pos[i] = Vec3A::new(cx as f32, cy as f32, cz as f32) * scale;
    corner_val[i] = field.samples()[index];
    corner_grad[i] = Vec3A::from(gradients[index]).normalize_or_zero();
  }

  let mut case = 0usize;
  for (i, value) in corner_val.iter().enumerate() {
    if *value < iso_level {
      case |= 1 << i;
    }
  }

  let edges = EDGE_TABLE[case];
  if edges == 0 {
    return;
  }

  let mut edge_verts = [EdgeVertex::ZERO; 12];
  for (edge, corners) in EDGE_CORNERS.iter().enumerate() {
    if edges & (1 << edge) != 0 {
      let [a, b] = *corners;
      edge_verts[edge] = interpolate_edge(
        iso_level,
        corner_pos[a],
        corner_pos[b],
        corner_val[a],
        corner_val[b],
        corner_grad[a],
        corner_grad[b],
      );
    }
  }

  let triangles = &TRI_TABLE[case];
  let mut i = 0;
  while triangles[i] >= 0 {
    emit_triangle(
      mesh,
      edge_verts[triangles[i] as usize],
      edge_verts[triangles[i + 1] as usize],
      edge_verts[triangles[i + 2] as usize],
    );
    i += 3;
  }
}

/// Interpolate the surface crossing on one cube edge.
///
/// `mu = (iso - v1) / (v2 - v1)`, with tie-breaks that avoid dividing by a
/// near-zero span: a corner value at the iso-level returns that corner, and
/// near-equal corner values return corner 1.
fn interpolate_edge(
  iso_level: f32,
  p1: Vec3A,
  p2: Vec3A,
  v1: f32,
  v2: f32,
  n1: Vec3A,
  n2: Vec3A,
) -> EdgeVertex {
  if (iso_level - v1).abs() < ISO_EPSILON {
    return EdgeVertex {
      position: p1,
      normal: n1,
    };
  }
  if (iso_level - v2).abs() < ISO_EPSILON {
    return EdgeVertex {
      position: p2,
      normal: n2,
    };
  }
  if (v1 - v2).abs() < ISO_EPSILON {
    return EdgeVertex {
      position: p1,
      normal: n1,
    };
  }

  let mu = (iso_level - v1) / (v2 - v1);
  EdgeVertex {
    position: p1 + (p2 - p1) * mu,
    normal: (n1 + (n2 - n1) * mu).normalize_or_zero(),
  }
}

/// Append one flat triangle: three fresh vertices, no sharing.
///
/// Vertices whose blended normal cancelled to zero take the flat face
/// normal; a fully degenerate face falls back to +Z so the output never
/// contains a non-unit normal.
fn emit_triangle(mesh: &mut Mesh, r0: EdgeVertex, r1: EdgeVertex, r2: EdgeVertex) {
  let base = mesh.positions.len() as u32;

  let mut face_normal = (r1.position - r0.position)
    .cross(r2.position - r0.position)
    .normalize_or_zero();
  if face_normal.length_squared() < MIN_NORMAL_LENGTH_SQ {
    face_normal = Vec3A::Z;
  }

  for vertex in [r0, r1, r2] {
    let normal = if vertex.normal.length_squared() < MIN_NORMAL_LENGTH_SQ {
      face_normal
    } else {
      vertex.normal
    };

    mesh.positions.push(vertex.position.to_array());
    mesh.normals.push(normal.to_array());
  }

  mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
}
