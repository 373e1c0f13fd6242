//! Grid layout and dispatch constants.
//!
//! The sample grid has a runtime resolution `N` (samples per axis). Cells are
//! the `(N-1)³` cubes spanned by neighbouring samples.
//!
//! # Memory Layout
//!
//! ```text
//! Sample memory layout (X major, Z innermost):
//!
//! Address:  0      1     ...  N-1      N     ...  N²    ...
//! Content: [0,0,0][0,0,1]...[0,0,N-1][0,1,0]...[1,0,0]...
//!          └──────── Z ────────┘└─────── Z ───...
//!
//! index = (x * N + y) * N + z
//! ```
//!
//! Cells use the same layout with stride `N-1`, so a cell id and the sample id
//! of its minimum corner are different numbers whenever `x` or `y` is non-zero.
//!
//! # Coordinate System
//!
//! ```text
//!         +Y
//!          │
//!          └───────── +X
//!         /
//!       +Z
//!
//! Cell corner indices (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

/// Invocations per compute workgroup. Indirect group counts are
/// `ceil(count / WORKGROUP_SIZE)`.
pub const WORKGROUP_SIZE: u32 = 64;

/// Smallest smoothing width used by the blend operators. Widths at or below
/// this collapse to the hard boolean.
pub const MIN_SMOOTHING: f32 = 1e-5;

/// Default hard-edge threshold, cos 30°. A vertex on a 90° crease gets a
/// normal halfway between the faces, 45° from its flat neighbours, so the
/// threshold must sit above cos 45° for the crease to split.
pub const DEFAULT_HARD_EDGE_COSINE: f32 = 0.866_025_4;

/// Cell record value meaning "no vertex".
pub const NO_VERTEX: u32 = u32::MAX;

/// Smallest supported grid resolution (one cell).
pub const MIN_RESOLUTION: u32 = 2;

/// Largest supported grid resolution. Keeps cell ids below `NO_VERTEX`.
pub const MAX_RESOLUTION: u32 = 1024;

/// Plane-projection steps used by dual contouring on feature cells.
pub const FEATURE_SMOOTHING_STEPS: u32 = 6;

/// Central difference step, as a fraction of the cell size.
pub const GRADIENT_EPSILON: f32 = 1e-2;

/// Grid offsets of the 8 cube corners relative to the cell minimum corner.
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
  [0, 0, 0],
  [1, 0, 0],
  [0, 1, 0],
  [1, 1, 0],
  [0, 0, 1],
  [1, 0, 1],
  [0, 1, 1],
  [1, 1, 1],
];

/// Convert 3D coordinates to a linear index for a grid with `stride` entries
/// per axis.
#[inline(always)]
pub const fn coord_to_index(x: usize, y: usize, z: usize, stride: usize) -> usize {
  (x * stride + y) * stride + z
}

/// Convert a linear index back to 3D coordinates.
#[inline(always)]
pub const fn index_to_coord(idx: usize, stride: usize) -> [usize; 3] {
  let z = idx % stride;
  let y = (idx / stride) % stride;
  let x = idx / (stride * stride);
  [x, y, z]
}

/// Number of workgroups needed to cover `count` invocations.
#[inline(always)]
pub const fn group_count(count: u32) -> u32 {
  count.div_ceil(WORKGROUP_SIZE)
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
