//! Smooth CSG operators for distances and materials.
//!
//! Every operator takes `a` (the primitive being folded in) and `b` (the
//! accumulated field so far). The polynomial blends below are the quadratic
//! smooth-min family; with a smoothing width at or below `MIN_SMOOTHING` they
//! reduce to the hard `min`/`max` booleans.
//!
//! ```text
//! union        h = clamp((k - |a-b|) / k)       d = min(a,b) - h²·k/4
//! intersection h = clamp(0.5 - 0.5(b-a)/k)      d = lerp(b, a, h) + k·h(1-h)
//! subtraction  h = clamp(0.5 - 0.5(b+a)/k)      d = lerp(b,-a, h) + k·h(1-h)
//! ```
//!
//! Material factors use the material's own transition width `km`:
//!
//! ```text
//! union        hm = clamp(0.5 + 0.5(b-a)/km)
//! intersection hm = clamp(0.5 - 0.5(b-a)/km)
//! subtraction  hm = clamp(0.5 - 0.5(b+a)/km)
//! material     = lerp(mat_b, mat_a, hm)
//! ```

use super::material::BlendedMaterial;
use crate::constants::MIN_SMOOTHING;

/// Boolean operation applied when folding a primitive into the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CombineOp {
  #[default]
  Union,
  Subtraction,
  Intersection,
}

/// Distance plus material at one point of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSample {
  pub distance: f32,
  pub material: BlendedMaterial,
}

impl FieldSample {
  /// Fold seed: nothing is inside yet.
  pub fn empty() -> Self {
    Self {
      distance: f32::INFINITY,
      material: BlendedMaterial::default(),
    }
  }
}

impl Default for FieldSample {
  fn default() -> Self {
    Self::empty()
  }
}

#[inline(always)]
fn width(k: f32) -> f32 {
  k.max(MIN_SMOOTHING)
}

#[inline(always)]
fn lerp(x: f32, y: f32, t: f32) -> f32 {
  // Written so t = 0 and t = 1 return x and y exactly, even when the other
  // endpoint is infinite.
  if t <= 0.0 {
    x
  } else if t >= 1.0 {
    y
  } else {
    x * (1.0 - t) + y * t
  }
}

#[inline(always)]
pub fn smooth_union(a: f32, b: f32, k: f32) -> f32 {
  let k = width(k);
  let h = ((k - (a - b).abs()) / k).clamp(0.0, 1.0);
  a.min(b) - h * h * k * 0.25
}

#[inline(always)]
pub fn smooth_intersection(a: f32, b: f32, k: f32) -> f32 {
  let k = width(k);
  let h = (0.5 - 0.5 * (b - a) / k).clamp(0.0, 1.0);
  lerp(b, a, h) + k * h * (1.0 - h)
}

/// Removes `a` from `b`.
#[inline(always)]
pub fn smooth_subtraction(a: f32, b: f32, k: f32) -> f32 {
  let k = width(k);
  let h = (0.5 - 0.5 * (b + a) / k).clamp(0.0, 1.0);
  lerp(b, -a, h) + k * h * (1.0 - h)
}

/// Weight of the primitive's material (`a`) against the accumulator's.
#[inline(always)]
pub fn material_factor(op: CombineOp, a: f32, b: f32, km: f32) -> f32 {
  let km = width(km);
  let h = match op {
    CombineOp::Union => 0.5 + 0.5 * (b - a) / km,
    CombineOp::Intersection => 0.5 - 0.5 * (b - a) / km,
    CombineOp::Subtraction => 0.5 - 0.5 * (b + a) / km,
  };
  // NaN only appears for ∞-∞ (two empty operands); prefer the accumulator.
  if h.is_nan() {
    0.0
  } else {
    h.clamp(0.0, 1.0)
  }
}

/// Blend one operator's distance.
#[inline(always)]
pub fn blend_distance(op: CombineOp, a: f32, b: f32, k: f32) -> f32 {
  match op {
    CombineOp::Union => smooth_union(a, b, k),
    CombineOp::Intersection => smooth_intersection(a, b, k),
    CombineOp::Subtraction => smooth_subtraction(a, b, k),
  }
}

/// Fold one primitive sample into the accumulator.
///
/// `k` is the primitive's distance smoothing; the material width comes from
/// the primitive's material.
#[inline]
pub fn combine(op: CombineOp, k: f32, primitive: &FieldSample, acc: &FieldSample) -> FieldSample {
  let (a, b) = (primitive.distance, acc.distance);
  let hm = material_factor(op, a, b, primitive.material.smoothing);
  FieldSample {
    distance: blend_distance(op, a, b, k),
    material: acc.material.lerp(&primitive.material, hm),
  }
}

/// Left fold over `(op, k, sample)` triples starting from the empty field.
pub fn fold<I>(samples: I) -> FieldSample
where
  I: IntoIterator<Item = (CombineOp, f32, FieldSample)>,
{
  samples
    .into_iter()
    .fold(FieldSample::empty(), |acc, (op, k, sample)| combine(op, k, &sample, &acc))
}

#[cfg(test)]
#[path = "combine_test.rs"]
mod combine_test;
