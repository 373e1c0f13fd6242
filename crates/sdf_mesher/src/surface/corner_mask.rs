//! Corner mask computation.
//!
//! The corner mask is an 8-bit value where each bit indicates whether a corner
//! of the cell is inside the surface (negative distance).

/// Build the corner mask from 8 corner distances.
///
/// Bit `i` is set when corner `i` (binary ZYX layout) is inside. Exactly zero
/// counts as outside, so a surface passing through a grid point is attributed
/// to one side consistently.
#[inline]
pub fn build(samples: &[f32; 8]) -> u8 {
  samples
    .iter()
    .enumerate()
    .fold(0u8, |mask, (i, &s)| mask | (((s < 0.0) as u8) << i))
}
