//! Corner-mask to crossing-edge lookup.
//!
//! A cell is active when at least one of its 12 edges joins an inside corner
//! (negative distance) to an outside one. The table below answers "which
//! edges?" for every one of the 256 corner masks.
//!
//! # Cube Topology
//!
//! ```text
//!       6──────7         Corners (binary ZYX):
//!      /│     /│           0=(0,0,0)  1=(1,0,0)  2=(0,1,0)  3=(1,1,0)
//!     4─┼────5 │           4=(0,0,1)  5=(1,0,1)  6=(0,1,1)  7=(1,1,1)
//!     │ 2────┼─3
//!     │/     │/          +Y
//!     0──────1            │  +Z
//!                         │ /
//!                         └───+X
//! ```
//!
//! Edges 0, 1 and 2 leave corner 0 along +X, +Y and +Z. Those three are the
//! edges a cell "owns" when quads are emitted, which is why their bit index
//! equals their axis.

/// Edge endpoint corner indices, `from` first.
pub const EDGE_CORNERS: [[u8; 2]; 12] = [
  [0, 1], // Edge 0:  X axis at Y=0, Z=0
  [0, 2], // Edge 1:  Y axis at X=0, Z=0
  [0, 4], // Edge 2:  Z axis at X=0, Y=0
  [1, 3], // Edge 3:  Y axis at X=1, Z=0
  [1, 5], // Edge 4:  Z axis at X=1, Y=0
  [2, 3], // Edge 5:  X axis at Y=1, Z=0
  [2, 6], // Edge 6:  Z axis at X=0, Y=1
  [3, 7], // Edge 7:  Z axis at X=1, Y=1
  [4, 5], // Edge 8:  X axis at Y=0, Z=1
  [4, 6], // Edge 9:  Y axis at X=0, Z=1
  [5, 7], // Edge 10: Y axis at X=1, Z=1
  [6, 7], // Edge 11: X axis at Y=1, Z=1
];

/// Axis each edge runs along (0 = X, 1 = Y, 2 = Z).
pub const EDGE_AXIS: [u8; 12] = generate_edge_axes();

/// Index: 8-bit corner mask (bit set = corner inside).
/// Value: 12-bit edge mask (bit set = edge crosses the surface).
pub const EDGE_TABLE: [u16; 256] = generate_edge_table();

const fn generate_edge_table() -> [u16; 256] {
  let mut table = [0u16; 256];
  let mut corner_mask = 0usize;

  while corner_mask < 256 {
    let mut edge_mask = 0u16;
    let mut edge = 0;

    while edge < 12 {
      let c0 = EDGE_CORNERS[edge][0] as usize;
      let c1 = EDGE_CORNERS[edge][1] as usize;

      if (corner_mask >> c0) & 1 != (corner_mask >> c1) & 1 {
        edge_mask |= 1 << edge;
      }

      edge += 1;
    }

    table[corner_mask] = edge_mask;
    corner_mask += 1;
  }

  table
}

const fn generate_edge_axes() -> [u8; 12] {
  let mut axes = [0u8; 12];
  let mut edge = 0;

  while edge < 12 {
    // Endpoints differ in exactly one bit; its position is the axis.
    let diff = EDGE_CORNERS[edge][0] ^ EDGE_CORNERS[edge][1];
    axes[edge] = diff.trailing_zeros() as u8;
    edge += 1;
  }

  axes
}

/// True when every corner has the same sign (no crossing edges).
#[inline(always)]
pub const fn is_homogeneous(corner_mask: u8) -> bool {
  corner_mask == 0 || corner_mask == 0xFF
}

/// Corner position within the unit cube.
#[inline(always)]
pub const fn corner_position(corner: u8) -> [f32; 3] {
  [
    (corner & 1) as f32,
    ((corner >> 1) & 1) as f32,
    ((corner >> 2) & 1) as f32,
  ]
}

#[cfg(test)]
#[path = "edge_table_test.rs"]
mod edge_table_test;
