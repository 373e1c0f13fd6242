use super::*;

#[test]
fn test_edge_table_homogeneous() {
  assert_eq!(EDGE_TABLE[0], 0, "All outside should have no edges");
  assert_eq!(EDGE_TABLE[255], 0, "All inside should have no edges");
  assert!(is_homogeneous(0));
  assert!(is_homogeneous(0xFF));
  assert!(!is_homogeneous(0x01));
}

#[test]
fn test_edge_table_single_corner() {
  for corner in 0..8 {
    let mask = 1u8 << corner;
    let edge_count = EDGE_TABLE[mask as usize].count_ones();
    assert_eq!(edge_count, 3, "Corner {} should have 3 edges", corner);
  }
}

#[test]
fn test_edge_table_complement_symmetry() {
  for i in 0..128 {
    assert_eq!(EDGE_TABLE[i], EDGE_TABLE[255 - i]);
  }
}

#[test]
fn test_owned_edges_index_matches_axis() {
  for axis in 0..3 {
    assert_eq!(EDGE_CORNERS[axis][0], 0);
    assert_eq!(EDGE_AXIS[axis] as usize, axis);
  }
}

#[test]
fn test_four_edges_per_axis() {
  for axis in 0..3u8 {
    assert_eq!(EDGE_AXIS.iter().filter(|&&a| a == axis).count(), 4);
  }
}

#[test]
fn test_edge_corners_differ_in_one_bit() {
  for edge in &EDGE_CORNERS {
    assert!(edge[0] < 8 && edge[1] < 8);
    assert_eq!((edge[0] ^ edge[1]).count_ones(), 1);
  }
}

#[test]
fn test_corner_position() {
  assert_eq!(corner_position(0), [0.0, 0.0, 0.0]);
  assert_eq!(corner_position(1), [1.0, 0.0, 0.0]);
  assert_eq!(corner_position(2), [0.0, 1.0, 0.0]);
  assert_eq!(corner_position(4), [0.0, 0.0, 1.0]);
  assert_eq!(corner_position(7), [1.0, 1.0, 1.0]);
}
