use super::*;

#[test]
fn homogeneous_cases_have_no_edges() {
  assert_eq!(EDGE_TABLE[0], 0);
  assert_eq!(EDGE_TABLE[255], 0);
}

#[test]
fn complementary_cases_cut_the_same_edges() {
  // Flipping inside/outside flips the case index but not the crossed edges.
  for case in 0..256 {
    assert_eq!(EDGE_TABLE[case], EDGE_TABLE[255 - case]);
  }
}

#[test]
fn single_corner_case_cuts_its_three_edges() {
  // Only corner 0 inside: edges 0 (0-1), 3 (3-0) and 8 (0-4) cross.
  assert_eq!(EDGE_TABLE[1], (1 << 0) | (1 << 3) | (1 << 8));
}

#[test]
fn triangle_rows_are_terminated_and_well_formed() {
  for (case, row) in TRI_TABLE.iter().enumerate() {
    let terminator = row
      .iter()
      .position(|&v| v == -1)
      .unwrap_or_else(|| panic!("case {case} has no terminator"));

    assert_eq!(terminator % 3, 0, "case {case} truncates a triangle");
    assert!(terminator <= 15, "case {case} overruns the row");
    for &entry in &row[..terminator] {
      assert!((0..12).contains(&entry), "case {case} bad edge {entry}");
    }
  }
}

#[test]
fn triangles_only_reference_active_edges() {
  for (case, row) in TRI_TABLE.iter().enumerate() {
    let edges = EDGE_TABLE[case];
    for &entry in row.iter().take_while(|&&v| v >= 0) {
      assert!(
        edges & (1 << entry) != 0,
        "case {case} references inactive edge {entry}"
      );
    }
  }
}

#[test]
fn homogeneous_cases_emit_no_triangles() {
  assert_eq!(TRI_TABLE[0][0], -1);
  assert_eq!(TRI_TABLE[255][0], -1);
}

#[test]
fn edges_connect_adjacent_corners() {
  for (edge, [a, b]) in EDGE_CORNERS.iter().enumerate() {
    let pa = CORNER_OFFSETS[*a];
    let pb = CORNER_OFFSETS[*b];
    let moved: i32 = (0..3).map(|axis| (pa[axis] - pb[axis]).abs()).sum();
    assert_eq!(moved, 1, "edge {edge} does not span a unit step");
  }
}
