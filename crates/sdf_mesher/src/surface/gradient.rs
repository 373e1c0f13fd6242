//! Surface normals.
//!
//! Three sources, in order of preference:
//! - central differences of the field at the vertex (exact field, any point)
//! - the 2x2x2 corner stencil of the owning cell (no extra evaluations)
//! - angle-weighted face normals of the finished mesh (host readback only)

use glam::Vec3A;

/// Normalized central-difference gradient of `field` at `p`.
///
/// Returns `None` where the gradient vanishes or is not finite (e.g. at a
/// sphere's center or outside every primitive).
#[inline]
pub fn central_difference<F>(field: &F, p: Vec3A, eps: f32) -> Option<Vec3A>
where
  F: Fn(Vec3A) -> f32,
{
  let dx = Vec3A::new(eps, 0.0, 0.0);
  let dy = Vec3A::new(0.0, eps, 0.0);
  let dz = Vec3A::new(0.0, 0.0, eps);
  let g = Vec3A::new(
    field(p + dx) - field(p - dx),
    field(p + dy) - field(p - dy),
    field(p + dz) - field(p - dz),
  );
  let len_sq = g.length_squared();
  if len_sq.is_finite() && len_sq > 1e-20 {
    Some(g * len_sq.sqrt().recip())
  } else {
    None
  }
}

/// Gradient from the 8 corner samples of a cell.
///
/// Corner layout:
/// ```text
/// 0: (0,0,0)  4: (0,0,1)
/// 1: (1,0,0)  5: (1,0,1)
/// 2: (0,1,0)  6: (0,1,1)
/// 3: (1,1,0)  7: (1,1,1)
/// ```
#[inline]
pub fn from_corners(samples: &[f32; 8]) -> Vec3A {
  let gx = (samples[1] + samples[3] + samples[5] + samples[7])
    - (samples[0] + samples[2] + samples[4] + samples[6]);
  let gy = (samples[2] + samples[3] + samples[6] + samples[7])
    - (samples[0] + samples[1] + samples[4] + samples[5]);
  let gz = (samples[4] + samples[5] + samples[6] + samples[7])
    - (samples[0] + samples[1] + samples[2] + samples[3]);

  let gradient = Vec3A::new(gx, gy, gz);
  let len_sq = gradient.length_squared();

  if !len_sq.is_finite() || len_sq < 1e-8 {
    return Vec3A::Y;
  }

  gradient * len_sq.sqrt().recip()
}

// =============================================================================
// Geometry-based normal recalculation
// =============================================================================

/// Recalculate normals from triangle geometry using angle-weighted averaging
/// (Thürmer & Wüthrich, "Mean Weighted by Angle").
///
/// Vertices that were split along hard edges only see the faces that
/// reference them, so creases stay sharp.
pub fn recalculate_from_geometry(positions: &[[f32; 3]], indices: &[u32], normals: &mut [[f32; 3]]) {
  let mut accum = vec![Vec3A::ZERO; positions.len()];

  for tri in indices.chunks_exact(3) {
    let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
    if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
      continue;
    }

    let p0 = Vec3A::from_array(positions[i0]);
    let p1 = Vec3A::from_array(positions[i1]);
    let p2 = Vec3A::from_array(positions[i2]);

    let e01 = p1 - p0;
    let e02 = p2 - p0;
    let e12 = p2 - p1;

    let face_normal = e01.cross(e02);
    let face_len_sq = face_normal.length_squared();

    // Skip degenerate triangles
    if face_len_sq < 1e-12 {
      continue;
    }

    let unit = face_normal * face_len_sq.sqrt().recip();
    accum[i0] += unit * vertex_angle(e01, e02);
    accum[i1] += unit * vertex_angle(-e01, e12);
    accum[i2] += unit * vertex_angle(-e02, -e12);
  }

  for (normal, sum) in normals.iter_mut().zip(accum) {
    let len_sq = sum.length_squared();
    *normal = if len_sq < 1e-12 {
      [0.0, 1.0, 0.0]
    } else {
      (sum * len_sq.sqrt().recip()).to_array()
    };
  }
}

/// Angle between two edge vectors at a vertex, in radians.
#[inline]
fn vertex_angle(e1: Vec3A, e2: Vec3A) -> f32 {
  let len1_sq = e1.length_squared();
  let len2_sq = e2.length_squared();

  if len1_sq < 1e-12 || len2_sq < 1e-12 {
    return 0.0;
  }

  let cos_angle = e1.dot(e2) / (len1_sq.sqrt() * len2_sq.sqrt());
  cos_angle.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
#[path = "gradient_test.rs"]
mod gradient_test;
