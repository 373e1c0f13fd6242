use super::*;

#[test]
fn test_coord_to_index_roundtrip() {
  for stride in [2usize, 5, 16] {
    for x in 0..stride {
      for y in 0..stride {
        for z in 0..stride {
          let idx = coord_to_index(x, y, z, stride);
          assert_eq!(index_to_coord(idx, stride), [x, y, z], "stride {}", stride);
        }
      }
    }
  }
}

#[test]
fn test_z_is_innermost() {
  assert_eq!(coord_to_index(0, 0, 1, 8), 1);
  assert_eq!(coord_to_index(0, 1, 0, 8), 8);
  assert_eq!(coord_to_index(1, 0, 0, 8), 64);
}

#[test]
fn test_corner_offsets_match_bit_layout() {
  for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
    assert_eq!(offset[0], corner & 1);
    assert_eq!(offset[1], (corner >> 1) & 1);
    assert_eq!(offset[2], (corner >> 2) & 1);
  }
}

#[test]
fn test_group_count_rounds_up() {
  assert_eq!(group_count(0), 0);
  assert_eq!(group_count(1), 1);
  assert_eq!(group_count(WORKGROUP_SIZE), 1);
  assert_eq!(group_count(WORKGROUP_SIZE + 1), 2);
  assert_eq!(group_count(1000), 16);
}

#[test]
fn test_max_resolution_cells_fit_below_sentinel() {
  let cells = (MAX_RESOLUTION as u64 - 1).pow(3);
  assert!(cells < NO_VERTEX as u64);
}
