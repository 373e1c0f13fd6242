//! Vertex refinement against the exact field.
//!
//! - Binary search narrows each crossing edge to its zero before averaging.
//! - Gradient descent projects the averaged point onto the surface with
//!   `p -= n(p)·d(p)`.
//!
//! Either may run alone; when both are enabled bisection runs first.

use glam::Vec3A;

use super::gradient;
use super::placement::EdgeCrossing;

/// Bisect a crossing edge `iterations` times and return the linear
/// interpolation inside the final bracket.
pub fn bisect<F>(field: &F, crossing: &EdgeCrossing, iterations: u32) -> Vec3A
where
  F: Fn(Vec3A) -> f32,
{
  let (mut lo, mut hi) = (crossing.from, crossing.to);
  let (mut s_lo, mut s_hi) = (crossing.s_from, crossing.s_to);
  let inside_lo = s_lo < 0.0;

  for _ in 0..iterations {
    let mid = (lo + hi) * 0.5;
    let s_mid = field(mid);
    if !s_mid.is_finite() {
      break;
    }
    if (s_mid < 0.0) == inside_lo {
      lo = mid;
      s_lo = s_mid;
    } else {
      hi = mid;
      s_hi = s_mid;
    }
  }

  lo + (hi - lo) * super::placement::crossing_t(s_lo, s_hi)
}

/// Newton-style projection onto the zero set.
///
/// Stops early once the step is negligible or the field stops being finite.
pub fn descend<F>(field: &F, start: Vec3A, iterations: u32, eps: f32) -> Vec3A
where
  F: Fn(Vec3A) -> f32,
{
  let mut p = start;
  for _ in 0..iterations {
    let d = field(p);
    if !d.is_finite() {
      break;
    }
    let Some(n) = gradient::central_difference(field, p, eps) else {
      break;
    };
    let next = p - n * d;
    if !next.is_finite() {
      break;
    }
    p = next;
    if d.abs() < eps * 1e-3 {
      break;
    }
  }
  p
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sphere(p: Vec3A) -> f32 {
    p.length() - 1.0
  }

  fn crossing(from: Vec3A, to: Vec3A) -> EdgeCrossing {
    let (s_from, s_to) = (sphere(from), sphere(to));
    let t = s_from / (s_from - s_to);
    EdgeCrossing {
      edge: 0,
      from,
      to,
      s_from,
      s_to,
      point: from + (to - from) * t,
    }
  }

  #[test]
  fn test_bisect_converges_on_curved_surface() {
    let c = crossing(Vec3A::new(0.5, 0.7, 0.0), Vec3A::new(0.9, 0.7, 0.0));
    let linear_err = sphere(c.point).abs();
    let refined = bisect(&sphere, &c, 10);
    assert!(sphere(refined).abs() < linear_err);
    assert!(sphere(refined).abs() < 1e-5);
    // Stays on the edge.
    assert!((refined.y - 0.7).abs() < 1e-6);
  }

  #[test]
  fn test_bisect_zero_iterations_is_linear() {
    let c = crossing(Vec3A::new(0.0, 0.0, 0.0), Vec3A::new(2.0, 0.0, 0.0));
    assert!((bisect(&sphere, &c, 0) - c.point).length() < 1e-6);
  }

  #[test]
  fn test_descend_projects_to_sphere() {
    for start in [
      Vec3A::new(0.8, 0.3, 0.1),
      Vec3A::new(-1.3, 0.2, 0.6),
      Vec3A::new(0.0, 0.0, 0.95),
    ] {
      let p = descend(&sphere, start, 4, 1e-3);
      assert!(sphere(p).abs() < 1e-4, "{:?} -> {:?}", start, p);
    }
  }

  #[test]
  fn test_descend_zero_iterations_is_identity() {
    let start = Vec3A::new(0.4, 0.4, 0.4);
    assert_eq!(descend(&sphere, start, 0, 1e-3), start);
  }

  #[test]
  fn test_descend_stops_on_empty_field() {
    let empty = |_p: Vec3A| f32::INFINITY;
    let start = Vec3A::ONE;
    assert_eq!(descend(&empty, start, 8, 1e-3), start);
  }
}
