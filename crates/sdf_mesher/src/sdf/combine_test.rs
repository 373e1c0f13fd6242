use glam::Vec4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::sdf::material::Material;

fn sample(distance: f32, material: BlendedMaterial) -> FieldSample {
  FieldSample { distance, material }
}

#[test]
fn test_smooth_union_never_exceeds_min() {
  let mut rng = StdRng::seed_from_u64(0x5EED);
  for _ in 0..10_000 {
    let a = rng.random_range(-10.0f32..10.0);
    let b = rng.random_range(-10.0f32..10.0);
    let k = rng.random_range(0.0f32..4.0);
    let d = smooth_union(a, b, k);
    assert!(d <= a.min(b) + 1e-6, "union({}, {}, {}) = {}", a, b, k, d);
  }
}

#[test]
fn test_operators_converge_to_booleans() {
  let mut rng = StdRng::seed_from_u64(42);
  for _ in 0..1_000 {
    let a = rng.random_range(-3.0f32..3.0);
    let b = rng.random_range(-3.0f32..3.0);
    for k in [0.0, 1e-7, MIN_SMOOTHING] {
      assert!((smooth_union(a, b, k) - a.min(b)).abs() < 1e-4);
      assert!((smooth_intersection(a, b, k) - a.max(b)).abs() < 1e-4);
      assert!((smooth_subtraction(a, b, k) - b.max(-a)).abs() < 1e-4);
    }
  }
}

#[test]
fn test_negative_smoothing_is_clamped() {
  assert_eq!(smooth_union(0.2, 0.7, -1.0), 0.2);
  assert!(smooth_union(0.2, 0.7, -1.0).is_finite());
}

#[test]
fn test_two_sphere_union_at_midpoint() {
  // Unit spheres at (±0.5, 0, 0): both report -0.5 at the origin.
  let m = BlendedMaterial::default();
  let first = combine(CombineOp::Union, 0.5, &sample(-0.5, m), &FieldSample::empty());
  assert_eq!(first.distance, -0.5);
  let both = combine(CombineOp::Union, 0.5, &sample(-0.5, m), &first);
  assert!((both.distance - (-0.625)).abs() < 1e-6);
}

#[test]
fn test_fold_starts_from_empty_field() {
  let m = BlendedMaterial::default();
  assert_eq!(fold(std::iter::empty()).distance, f32::INFINITY);
  // Subtracting or intersecting with nothing stays empty.
  assert_eq!(fold([(CombineOp::Subtraction, 0.1, sample(-1.0, m))]).distance, f32::INFINITY);
  assert_eq!(fold([(CombineOp::Intersection, 0.1, sample(-1.0, m))]).distance, f32::INFINITY);
  assert_eq!(fold([(CombineOp::Union, 0.1, sample(-1.0, m))]).distance, -1.0);
}

#[test]
fn test_first_union_takes_primitive_material() {
  let red = Material::color(Vec4::new(1.0, 0.0, 0.0, 1.0)).resolve();
  let out = fold([(CombineOp::Union, 0.2, sample(0.3, red))]);
  assert_eq!(out.material, red);
}

#[test]
fn test_union_material_blends_at_equal_distance() {
  let red = Material::color(Vec4::new(1.0, 0.0, 0.0, 1.0)).resolve();
  let blue = Material::color(Vec4::new(0.0, 0.0, 1.0, 1.0)).resolve();
  let out = fold([
    (CombineOp::Union, 0.2, sample(0.1, red)),
    (CombineOp::Union, 0.2, sample(0.1, blue)),
  ]);
  assert!((out.material.color - Vec4::new(0.5, 0.0, 0.5, 1.0)).length() < 1e-6);
}

#[test]
fn test_union_material_takes_closer_surface() {
  let red = Material::color(Vec4::new(1.0, 0.0, 0.0, 1.0))
    .with_smoothing(0.1)
    .resolve();
  let blue = Material::color(Vec4::new(0.0, 0.0, 1.0, 1.0))
    .with_smoothing(0.1)
    .resolve();
  let acc = sample(0.5, red);
  assert_eq!(combine(CombineOp::Union, 0.2, &sample(-0.5, blue), &acc).material, blue);
  assert_eq!(combine(CombineOp::Union, 0.2, &sample(1.5, blue), &acc).material, red);
}

#[test]
fn test_material_width_is_independent_of_distance_width() {
  // Wide distance smoothing, hard material edge.
  let red = Material::color(Vec4::X).with_smoothing(0.0).resolve();
  let blue = Material::color(Vec4::Z).with_smoothing(0.0).resolve();
  let acc = sample(0.0, red);
  let out = combine(CombineOp::Union, 2.0, &sample(-0.01, blue), &acc);
  assert_eq!(out.material, blue);
  assert!(out.distance < -0.01);
}

#[test]
fn test_subtraction_carves() {
  let m = BlendedMaterial::default();
  // Point inside both: removed.
  let out = fold([
    (CombineOp::Union, 0.0, sample(-1.0, m)),
    (CombineOp::Subtraction, 0.0, sample(-0.5, m)),
  ]);
  assert!(out.distance > 0.0);
}

#[test]
fn test_intersection_keeps_overlap_only() {
  let m = BlendedMaterial::default();
  let inside = fold([
    (CombineOp::Union, 0.0, sample(-1.0, m)),
    (CombineOp::Intersection, 0.0, sample(-0.2, m)),
  ]);
  assert_eq!(inside.distance, -0.2);
  let outside = fold([
    (CombineOp::Union, 0.0, sample(-1.0, m)),
    (CombineOp::Intersection, 0.0, sample(0.4, m)),
  ]);
  assert_eq!(outside.distance, 0.4);
}
