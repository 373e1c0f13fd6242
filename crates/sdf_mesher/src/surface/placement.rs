//! Edge crossings and the two vertex placement rules.
//!
//! ```text
//!   inside ●───────x──────○ outside      t = s_from / (s_from - s_to)
//!          from    point   to            point = from + t·(to - from)
//! ```
//!
//! Surface nets places the cell vertex at the mean of its crossing points.
//! Dual contouring starts from the same mean and, on feature cells, pulls it
//! toward the intersection of the crossing tangent planes.

use glam::Vec3A;
use smallvec::SmallVec;

use crate::edge_table::{EDGE_CORNERS, EDGE_TABLE};

/// Corner positions within the unit cube (corner i = (bit0, bit1, bit2)).
pub const CORNER_POSITIONS: [Vec3A; 8] = [
  Vec3A::new(0.0, 0.0, 0.0),
  Vec3A::new(1.0, 0.0, 0.0),
  Vec3A::new(0.0, 1.0, 0.0),
  Vec3A::new(1.0, 1.0, 0.0),
  Vec3A::new(0.0, 0.0, 1.0),
  Vec3A::new(1.0, 0.0, 1.0),
  Vec3A::new(0.0, 1.0, 1.0),
  Vec3A::new(1.0, 1.0, 1.0),
];

/// One sign-changing cell edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCrossing {
  pub edge: u8,
  pub from: Vec3A,
  pub to: Vec3A,
  pub s_from: f32,
  pub s_to: f32,
  /// Current estimate of the zero crossing.
  pub point: Vec3A,
}

pub type Crossings = SmallVec<[EdgeCrossing; 12]>;

/// Interpolation parameter of the zero crossing, clamped to the edge.
#[inline(always)]
pub fn crossing_t(s_from: f32, s_to: f32) -> f32 {
  let t = s_from / (s_from - s_to);
  if t.is_finite() {
    t.clamp(0.0, 1.0)
  } else {
    0.5
  }
}

/// Linear-interpolated crossings of a cell at `min` with side `size`.
pub fn edge_crossings(min: Vec3A, size: f32, samples: &[f32; 8], corner_mask: u8) -> Crossings {
  let edge_mask = EDGE_TABLE[corner_mask as usize];
  let mut crossings = Crossings::new();

  for (edge, &[c0, c1]) in EDGE_CORNERS.iter().enumerate() {
    if edge_mask & (1 << edge) == 0 {
      continue;
    }
    let (c0, c1) = (c0 as usize, c1 as usize);
    let from = min + CORNER_POSITIONS[c0] * size;
    let to = min + CORNER_POSITIONS[c1] * size;
    let t = crossing_t(samples[c0], samples[c1]);
    crossings.push(EdgeCrossing {
      edge: edge as u8,
      from,
      to,
      s_from: samples[c0],
      s_to: samples[c1],
      point: from + (to - from) * t,
    });
  }

  crossings
}

/// Arithmetic mean of the crossing points.
#[inline]
pub fn mean(crossings: &[EdgeCrossing]) -> Vec3A {
  if crossings.is_empty() {
    return Vec3A::ZERO;
  }
  crossings.iter().map(|c| c.point).sum::<Vec3A>() / crossings.len() as f32
}

/// True when some pair of crossing normals disagrees by more than the hard
/// edge threshold.
pub fn is_feature(normals: &[Vec3A], hard_edge_cosine: f32) -> bool {
  for (i, a) in normals.iter().enumerate() {
    for b in &normals[i + 1..] {
      if a.dot(*b) < hard_edge_cosine {
        return true;
      }
    }
  }
  false
}

/// Dual contouring position.
///
/// Smooth cells keep the crossing mean. Feature cells take `steps` rounds of
/// plane-projection averaging (`c += mean(nᵢ·(pᵢ - c)·nᵢ)`), clamped to the
/// cell so a vertex never leaves it.
pub fn feature_position(
  crossings: &[EdgeCrossing],
  normals: &[Vec3A],
  hard_edge_cosine: f32,
  steps: u32,
  cell_min: Vec3A,
  cell_max: Vec3A,
) -> Vec3A {
  let mut c = mean(crossings);
  if !is_feature(normals, hard_edge_cosine) {
    return c;
  }

  let inv_count = (crossings.len() as f32).recip();
  for _ in 0..steps {
    let mut delta = Vec3A::ZERO;
    for (crossing, n) in crossings.iter().zip(normals) {
      delta += *n * n.dot(crossing.point - c);
    }
    c = (c + delta * inv_count).clamp(cell_min, cell_max);
  }
  c
}

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;
