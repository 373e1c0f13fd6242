//! Surface materials and their blendable form.

use glam::{Vec3, Vec4};

/// Procedural displacement applied to a primitive's distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParams {
  pub seed: u32,
  pub octaves: u32,
  pub frequency: f32,
  pub amplitude: f32,
  /// Multiplier on animation time, scrolls the noise domain.
  pub time_scale: f32,
}

impl Default for NoiseParams {
  fn default() -> Self {
    Self {
      seed: 0,
      octaves: 0,
      frequency: 1.0,
      amplitude: 0.0,
      time_scale: 0.0,
    }
  }
}

impl NoiseParams {
  pub fn is_active(&self) -> bool {
    self.octaves > 0 && self.amplitude != 0.0
  }

  /// Interpolate parameters. Discrete fields take the nearer endpoint.
  pub fn lerp(&self, other: &Self, t: f32) -> Self {
    let (seed, octaves) = if t < 0.5 {
      (self.seed, self.octaves)
    } else {
      (other.seed, other.octaves)
    };
    Self {
      seed,
      octaves,
      frequency: mix(self.frequency, other.frequency, t),
      amplitude: mix(self.amplitude, other.amplitude, t),
      time_scale: mix(self.time_scale, other.time_scale, t),
    }
  }
}

/// How a material feeds the output vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaterialKind {
  /// Default white surface, no splat layer.
  #[default]
  None,
  /// Flat base color.
  Color,
  /// Single splat layer (0..4), tinted by the base color.
  Texture { layer: u8 },
  /// Explicit splat weights.
  Layered,
}

/// Material record as authored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
  pub kind: MaterialKind,
  pub base_color: Vec4,
  pub emission: Vec3,
  pub metallic: f32,
  pub smoothness: f32,
  pub subsurface_color: Vec3,
  pub subsurface_power: f32,

  /// Width of the material transition, independent of the distance
  /// smoothing of the primitive that uses this material.
  pub smoothing: f32,

  pub noise: NoiseParams,

  /// Splat weights for `MaterialKind::Layered`.
  pub layers: Vec4,
}

impl Default for Material {
  fn default() -> Self {
    Self {
      kind: MaterialKind::None,
      base_color: Vec4::ONE,
      emission: Vec3::ZERO,
      metallic: 0.0,
      smoothness: 0.5,
      subsurface_color: Vec3::ZERO,
      subsurface_power: 0.0,
      smoothing: 0.1,
      noise: NoiseParams::default(),
      layers: Vec4::X,
    }
  }
}

impl Material {
  pub fn color(rgba: Vec4) -> Self {
    Self {
      kind: MaterialKind::Color,
      base_color: rgba,
      ..Default::default()
    }
  }

  pub fn texture(layer: u8) -> Self {
    Self {
      kind: MaterialKind::Texture { layer: layer.min(3) },
      ..Default::default()
    }
  }

  pub fn layered(weights: Vec4) -> Self {
    Self {
      kind: MaterialKind::Layered,
      layers: weights,
      ..Default::default()
    }
  }

  pub fn with_emission(mut self, emission: Vec3) -> Self {
    self.emission = emission;
    self
  }

  pub fn with_metallic(mut self, metallic: f32) -> Self {
    self.metallic = metallic;
    self
  }

  pub fn with_smoothness(mut self, smoothness: f32) -> Self {
    self.smoothness = smoothness;
    self
  }

  pub fn with_subsurface(mut self, color: Vec3, power: f32) -> Self {
    self.subsurface_color = color;
    self.subsurface_power = power;
    self
  }

  pub fn with_smoothing(mut self, width: f32) -> Self {
    self.smoothing = width;
    self
  }

  pub fn with_noise(mut self, noise: NoiseParams) -> Self {
    self.noise = noise;
    self
  }

  /// Numbers that must be finite for the field to stay finite.
  pub fn is_finite(&self) -> bool {
    self.base_color.is_finite()
      && self.emission.is_finite()
      && self.subsurface_color.is_finite()
      && self.layers.is_finite()
      && self.metallic.is_finite()
      && self.smoothness.is_finite()
      && self.subsurface_power.is_finite()
      && self.smoothing.is_finite()
      && self.noise.frequency.is_finite()
      && self.noise.amplitude.is_finite()
      && self.noise.time_scale.is_finite()
  }

  /// Flatten into the form the blend operators work on.
  pub fn resolve(&self) -> BlendedMaterial {
    let (color, splat) = match self.kind {
      MaterialKind::None => (Vec4::ONE, Vec4::X),
      MaterialKind::Color => (self.base_color, Vec4::X),
      MaterialKind::Texture { layer } => {
        let mut splat = Vec4::ZERO;
        splat[layer.min(3) as usize] = 1.0;
        (self.base_color, splat)
      }
      MaterialKind::Layered => {
        let sum = self.layers.element_sum();
        let splat = if sum > 1e-4 { self.layers / sum } else { Vec4::X };
        (self.base_color, splat)
      }
    };

    BlendedMaterial {
      color,
      emission: self.emission,
      metallic: self.metallic,
      smoothness: self.smoothness,
      subsurface: self.subsurface_color.extend(self.subsurface_power),
      splat,
      smoothing: self.smoothing,
      noise: self.noise,
    }
  }
}

/// Material attributes as carried through the field fold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendedMaterial {
  pub color: Vec4,
  pub emission: Vec3,
  pub metallic: f32,
  pub smoothness: f32,
  /// RGB subsurface color, power in `w`.
  pub subsurface: Vec4,
  pub splat: Vec4,
  pub smoothing: f32,
  pub noise: NoiseParams,
}

impl Default for BlendedMaterial {
  fn default() -> Self {
    Material::default().resolve()
  }
}

impl BlendedMaterial {
  /// Component-wise `self·(1-t) + other·t`.
  pub fn lerp(&self, other: &Self, t: f32) -> Self {
    Self {
      color: self.color * (1.0 - t) + other.color * t,
      emission: self.emission * (1.0 - t) + other.emission * t,
      metallic: mix(self.metallic, other.metallic, t),
      smoothness: mix(self.smoothness, other.smoothness, t),
      subsurface: self.subsurface * (1.0 - t) + other.subsurface * t,
      splat: self.splat * (1.0 - t) + other.splat * t,
      smoothing: mix(self.smoothing, other.smoothing, t),
      noise: self.noise.lerp(&other.noise, t),
    }
  }

  /// Weighted sum. Weights are expected to sum to 1.
  pub fn weighted_sum(materials: &[BlendedMaterial], weights: &[f32]) -> Self {
    let mut out = Self {
      color: Vec4::ZERO,
      emission: Vec3::ZERO,
      metallic: 0.0,
      smoothness: 0.0,
      subsurface: Vec4::ZERO,
      splat: Vec4::ZERO,
      smoothing: 0.0,
      noise: NoiseParams::default(),
    };
    let mut heaviest = 0.0f32;

    for (m, &w) in materials.iter().zip(weights) {
      out.color += m.color * w;
      out.emission += m.emission * w;
      out.metallic += m.metallic * w;
      out.smoothness += m.smoothness * w;
      out.subsurface += m.subsurface * w;
      out.splat += m.splat * w;
      out.smoothing += m.smoothing * w;
      if w > heaviest {
        heaviest = w;
        out.noise = m.noise;
      }
    }

    out
  }
}

#[inline(always)]
fn mix(x: f32, y: f32, t: f32) -> f32 {
  x * (1.0 - t) + y * t
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_texture_layer_is_one_hot() {
    let m = Material::texture(2).resolve();
    assert_eq!(m.splat, Vec4::new(0.0, 0.0, 1.0, 0.0));
  }

  #[test]
  fn test_layered_weights_normalize() {
    let m = Material::layered(Vec4::new(2.0, 2.0, 0.0, 0.0)).resolve();
    assert!((m.splat.element_sum() - 1.0).abs() < 1e-6);
    assert_eq!(m.splat.x, 0.5);
  }

  #[test]
  fn test_lerp_endpoints_exact() {
    let a = Material::color(Vec4::new(1.0, 0.0, 0.0, 1.0)).resolve();
    let b = Material::color(Vec4::new(0.0, 0.0, 1.0, 1.0))
      .with_metallic(1.0)
      .resolve();
    assert_eq!(a.lerp(&b, 0.0), a);
    assert_eq!(a.lerp(&b, 1.0), b);
    let mid = a.lerp(&b, 0.5);
    assert_eq!(mid.color, Vec4::new(0.5, 0.0, 0.5, 1.0));
    assert_eq!(mid.metallic, 0.5);
  }

  #[test]
  fn test_noise_discrete_fields_pick_nearest() {
    let a = NoiseParams {
      seed: 1,
      octaves: 2,
      ..Default::default()
    };
    let b = NoiseParams {
      seed: 9,
      octaves: 5,
      ..Default::default()
    };
    assert_eq!(a.lerp(&b, 0.25).seed, 1);
    assert_eq!(a.lerp(&b, 0.75).octaves, 5);
  }

  #[test]
  fn test_weighted_sum_matches_lerp() {
    let a = Material::color(Vec4::ONE).resolve();
    let b = Material::color(Vec4::ZERO).with_smoothness(1.0).resolve();
    let sum = BlendedMaterial::weighted_sum(&[a, b], &[0.25, 0.75]);
    let lerp = a.lerp(&b, 0.75);
    assert!((sum.color - lerp.color).length() < 1e-6);
    assert!((sum.smoothness - lerp.smoothness).abs() < 1e-6);
  }
}
