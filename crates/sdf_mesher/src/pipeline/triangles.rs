//! Stage 4: Generate triangles
//!
//! One invocation per numbered vertex. The three grid edges leaving the
//! cell's minimum corner along +x, +y and +z are shared by four cells; when
//! such an edge changes sign the four cell vertices form a quad.
//!
//! ```text
//!   v                 a = this cell
//!   ▲   d ───── a     b = -u -v
//!   │   │       │     c = -u
//!   │   b ───── c     d = -v
//!   └──────────► u
//! ```
//!
//! Quads split along the shorter diagonal (surface nets) or the diagonal
//! whose endpoint normals agree best (dual contouring). Winding follows the
//! sign of the edge's origin sample so front faces point out of the solid.

use glam::Vec3A;

use crate::device::{dispatch_indirect, AppendBuffer, Counters, DispatchArgs};
use crate::sdf::FieldSample;
use crate::types::{ExtractionMode, GridLayout};

use super::buffers::{CellRecord, RawVertex, Triangle};

/// Read-only view of what the triangle kernel needs.
pub struct TriangleInputs<'a> {
  pub samples: &'a [FieldSample],
  pub cells: &'a [CellRecord],
  pub vertices: &'a AppendBuffer<RawVertex>,
  pub vertex_order: &'a [u32],
  pub grid: &'a GridLayout,
  pub extraction: ExtractionMode,
  pub hard_edge_cosine: f32,
}

impl TriangleInputs<'_> {
  #[inline]
  fn vertex(&self, numbered: u32) -> Option<&RawVertex> {
    let append = *self.vertex_order.get(numbered as usize)?;
    self.vertices.get(append)
  }

  #[inline]
  fn numbered_at(&self, cell: [usize; 3]) -> Option<u32> {
    self.cells[self.grid.cell_index(cell[0], cell[1], cell[2])].vertex_index()
  }

  #[inline]
  fn distance(&self, p: [usize; 3]) -> f32 {
    self.samples[self.grid.sample_index(p[0], p[1], p[2])].distance
  }
}

/// Split quad `[a, b, c, d]` into two triangles.
///
/// `along_ab` picks the a–b diagonal, otherwise c–d. `flip` reverses the
/// winding for edges whose origin sample is outside.
#[inline]
pub fn split_quad(quad: [u32; 4], along_ab: bool, flip: bool) -> [[u32; 3]; 2] {
  let [a, b, c, d] = quad;
  match (along_ab, flip) {
    (true, false) => [[a, b, d], [a, c, b]],
    (true, true) => [[a, d, b], [a, b, c]],
    (false, false) => [[c, b, d], [c, d, a]],
    (false, true) => [[c, d, b], [c, a, d]],
  }
}

/// Corners touching an edge whose endpoint normals disagree.
#[inline]
pub fn hard_corners(normals: [Vec3A; 3], cosine: f32) -> u8 {
  let mut mask = 0u8;
  for (i, j) in [(0usize, 1usize), (1, 2), (2, 0)] {
    if normals[i].dot(normals[j]) < cosine {
      mask |= (1 << i) | (1 << j);
    }
  }
  mask
}

#[tracing::instrument(skip_all, name = "pipeline::triangles")]
pub fn run(
  inputs: &TriangleInputs<'_>,
  triangles: &AppendBuffer<Triangle>,
  counters: &Counters,
  vertex_args: &DispatchArgs,
  vertex_count: u32,
) {
  dispatch_indirect(vertex_args, |n| {
    if n >= vertex_count {
      return;
    }
    let Some(origin_vertex) = inputs.vertex(n) else {
      return;
    };
    let pos = inputs.grid.cell_coord(origin_vertex.cell as usize);

    for axis in 0..3 {
      let u = (axis + 1) % 3;
      let v = (axis + 2) % 3;
      if pos[u] == 0 || pos[v] == 0 {
        continue;
      }

      let mut far = pos;
      far[axis] += 1;
      let s_origin = inputs.distance(pos);
      if (s_origin < 0.0) == (inputs.distance(far) < 0.0) {
        continue;
      }

      let mut pos_b = pos;
      pos_b[u] -= 1;
      pos_b[v] -= 1;
      let mut pos_c = pos;
      pos_c[u] -= 1;
      let mut pos_d = pos;
      pos_d[v] -= 1;

      let (Some(b), Some(c), Some(d)) = (
        inputs.numbered_at(pos_b),
        inputs.numbered_at(pos_c),
        inputs.numbered_at(pos_d),
      ) else {
        continue;
      };
      let quad = [n, b, c, d];
      let (Some(vb), Some(vc), Some(vd)) = (inputs.vertex(b), inputs.vertex(c), inputs.vertex(d))
      else {
        continue;
      };
      let va = origin_vertex;

      let along_ab = match inputs.extraction {
        ExtractionMode::SurfaceNets => {
          va.position.distance_squared(vb.position) < vc.position.distance_squared(vd.position)
        }
        ExtractionMode::DualContouring => va.normal.dot(vb.normal) > vc.normal.dot(vd.normal),
      };
      let flip = s_origin >= 0.0;

      let normal_of = |i: u32| match i {
        i if i == n => va.normal,
        i if i == b => vb.normal,
        i if i == c => vc.normal,
        _ => vd.normal,
      };

      for tri in split_quad(quad, along_ab, flip) {
        let normals = tri.map(normal_of);
        let appended = triangles.append(Triangle {
          indices: tri,
          hard_corners: hard_corners(normals, inputs.hard_edge_cosine),
        });
        if appended.is_some() {
          counters.add_indices(3);
        }
      }
    }
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constants::DEFAULT_HARD_EDGE_COSINE;

  fn directed_edges(t: [u32; 3]) -> [(u32, u32); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
  }

  #[test]
  fn test_split_triangles_share_diagonal_consistently() {
    let quad = [0, 1, 2, 3];
    for along_ab in [true, false] {
      for flip in [true, false] {
        let [t0, t1] = split_quad(quad, along_ab, flip);
        // A consistently wound pair walks the shared edge in opposite
        // directions.
        let shared = directed_edges(t0)
          .into_iter()
          .filter(|&(p, q)| directed_edges(t1).contains(&(q, p)))
          .count();
        assert_eq!(shared, 1, "along_ab={along_ab} flip={flip}");
      }
    }
  }

  #[test]
  fn test_flip_reverses_winding() {
    let quad = [0, 1, 2, 3];
    let [t0, _] = split_quad(quad, true, false);
    let [f0, _] = split_quad(quad, true, true);
    let reversed = [f0[0], f0[2], f0[1]];
    assert_eq!(t0, reversed);
  }

  #[test]
  fn test_diagonal_choice_covers_quad() {
    for along_ab in [true, false] {
      let tris = split_quad([10, 11, 12, 13], along_ab, false);
      let mut used: Vec<u32> = tris.iter().flatten().copied().collect();
      used.sort_unstable();
      used.dedup();
      assert_eq!(used, vec![10, 11, 12, 13]);
    }
  }

  #[test]
  fn test_hard_corner_mask() {
    let smooth = [Vec3A::Y, Vec3A::Y, Vec3A::new(0.1, 1.0, 0.0).normalize()];
    assert_eq!(hard_corners(smooth, 0.5), 0);

    let crease = [Vec3A::Y, Vec3A::Y, Vec3A::X];
    assert_eq!(hard_corners(crease, 0.5), 0b111);

    let one_edge = [Vec3A::Y, Vec3A::Y, Vec3A::Y];
    assert_eq!(hard_corners(one_edge, 1.5), 0b111);
  }

  #[test]
  fn test_default_threshold_splits_right_angle_crease() {
    // Face vertices either side of a 90° crease, and the crease vertex whose
    // normal bisects them.
    let crease = Vec3A::new(1.0, 1.0, 0.0).normalize();
    let normals = [Vec3A::X, crease, Vec3A::X];
    assert_eq!(hard_corners(normals, DEFAULT_HARD_EDGE_COSINE), 0b111);

    let curved = [Vec3A::Y, Vec3A::new(0.2, 1.0, 0.0).normalize(), Vec3A::Y];
    assert_eq!(hard_corners(curved, DEFAULT_HARD_EDGE_COSINE), 0);
  }
}
