//! Vertex material from the owning cell's corner samples.

use glam::Vec3A;

use crate::sdf::BlendedMaterial;

/// Trilinear weights of the 8 corners at a fractional cell position.
#[inline]
pub fn trilinear_weights(frac: Vec3A) -> [f32; 8] {
  let f = frac.clamp(Vec3A::ZERO, Vec3A::ONE);
  let g = Vec3A::ONE - f;
  [
    g.x * g.y * g.z,
    f.x * g.y * g.z,
    g.x * f.y * g.z,
    f.x * f.y * g.z,
    g.x * g.y * f.z,
    f.x * g.y * f.z,
    g.x * f.y * f.z,
    f.x * f.y * f.z,
  ]
}

/// Blend corner materials at a vertex.
///
/// Only inside corners (negative distance) contribute, weighted trilinearly by
/// the vertex position, so an outside primitive's material cannot bleed onto
/// the surface. Falls back to every corner if the inside weights vanish.
pub fn blend(materials: &[BlendedMaterial; 8], distances: &[f32; 8], frac: Vec3A) -> BlendedMaterial {
  let all = trilinear_weights(frac);
  let mut weights = [0.0f32; 8];
  let mut sum = 0.0;

  for corner in 0..8 {
    if distances[corner] < 0.0 {
      weights[corner] = all[corner];
      sum += all[corner];
    }
  }

  if sum < 1e-4 {
    weights = all;
    sum = all.iter().sum();
  }

  let inv_sum = sum.recip();
  for w in &mut weights {
    *w *= inv_sum;
  }

  BlendedMaterial::weighted_sum(materials, &weights)
}

#[cfg(test)]
mod tests {
  use glam::Vec4;

  use super::*;
  use crate::sdf::Material;

  #[test]
  fn test_trilinear_weights_sum_to_one() {
    for frac in [Vec3A::ZERO, Vec3A::splat(0.5), Vec3A::new(0.2, 0.9, 0.4)] {
      let sum: f32 = trilinear_weights(frac).iter().sum();
      assert!((sum - 1.0).abs() < 1e-6);
    }
    assert_eq!(trilinear_weights(Vec3A::ONE)[7], 1.0);
  }

  #[test]
  fn test_only_inside_corners_contribute() {
    let red = Material::color(Vec4::new(1.0, 0.0, 0.0, 1.0)).resolve();
    let blue = Material::color(Vec4::new(0.0, 0.0, 1.0, 1.0)).resolve();
    // Bottom corners inside and red, top corners outside and blue.
    let materials = [red, red, blue, blue, red, red, blue, blue];
    let distances = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
    let m = blend(&materials, &distances, Vec3A::splat(0.5));
    assert!((m.color - red.color).length() < 1e-6);
  }

  #[test]
  fn test_mixed_inside_corners_blend() {
    let red = Material::color(Vec4::new(1.0, 0.0, 0.0, 1.0)).resolve();
    let blue = Material::color(Vec4::new(0.0, 0.0, 1.0, 1.0)).resolve();
    let materials = [red, blue, red, blue, red, blue, red, blue];
    let distances = [-1.0; 8];
    let m = blend(&materials, &distances, Vec3A::new(0.25, 0.5, 0.5));
    assert!((m.color - Vec4::new(0.75, 0.0, 0.25, 1.0)).length() < 1e-5);
  }

  #[test]
  fn test_all_outside_falls_back_to_trilinear() {
    let red = Material::color(Vec4::new(1.0, 0.0, 0.0, 1.0)).resolve();
    let m = blend(&[red; 8], &[1.0; 8], Vec3A::splat(0.5));
    assert!((m.color - red.color).length() < 1e-6);
  }
}
