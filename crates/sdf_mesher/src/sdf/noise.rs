//! Seeded value-noise fBm used to displace primitive distances.
//!
//! Lattice values come from an integer hash (xorshift-style mixing), so the
//! same seed and point always give the same value on every thread.

use glam::Vec3A;

use super::material::NoiseParams;

/// Hash a lattice point to `[-1, 1]`.
#[inline(always)]
fn lattice(x: i32, y: i32, z: i32, seed: u32) -> f32 {
  let mut h = seed ^ 0x9E37_79B9;
  h ^= (x as u32).wrapping_mul(0x8DA6_B343);
  h ^= (y as u32).wrapping_mul(0xD816_3841);
  h ^= (z as u32).wrapping_mul(0xCB1A_B31F);
  h ^= h << 13;
  h ^= h >> 17;
  h ^= h << 5;
  h = h.wrapping_mul(0x2545_F491);
  (h >> 8) as f32 / (1u32 << 23) as f32 - 1.0
}

#[inline(always)]
fn smooth(t: f32) -> f32 {
  t * t * (3.0 - 2.0 * t)
}

/// Single octave of trilinear value noise in `[-1, 1]`.
pub fn value_noise(p: Vec3A, seed: u32) -> f32 {
  let cell = p.floor();
  let f = p - cell;
  let (x, y, z) = (cell.x as i32, cell.y as i32, cell.z as i32);
  let (u, v, w) = (smooth(f.x), smooth(f.y), smooth(f.z));

  let c000 = lattice(x, y, z, seed);
  let c100 = lattice(x + 1, y, z, seed);
  let c010 = lattice(x, y + 1, z, seed);
  let c110 = lattice(x + 1, y + 1, z, seed);
  let c001 = lattice(x, y, z + 1, seed);
  let c101 = lattice(x + 1, y, z + 1, seed);
  let c011 = lattice(x, y + 1, z + 1, seed);
  let c111 = lattice(x + 1, y + 1, z + 1, seed);

  let x00 = c000 + (c100 - c000) * u;
  let x10 = c010 + (c110 - c010) * u;
  let x01 = c001 + (c101 - c001) * u;
  let x11 = c011 + (c111 - c011) * u;
  let y0 = x00 + (x10 - x00) * v;
  let y1 = x01 + (x11 - x01) * v;
  y0 + (y1 - y0) * w
}

/// Normalized fractal sum, in `[-1, 1]`. Each octave doubles frequency and
/// halves amplitude.
pub fn fbm(p: Vec3A, seed: u32, octaves: u32) -> f32 {
  let mut sum = 0.0;
  let mut amplitude = 1.0;
  let mut norm = 0.0;
  let mut q = p;

  for octave in 0..octaves.min(8) {
    sum += value_noise(q, seed.wrapping_add(octave)) * amplitude;
    norm += amplitude;
    amplitude *= 0.5;
    q *= 2.0;
  }

  if norm > 0.0 {
    sum / norm
  } else {
    0.0
  }
}

/// Distance offset for a material's noise at a world position.
#[inline]
pub fn displacement(params: &NoiseParams, world: Vec3A, time: f32) -> f32 {
  if !params.is_active() {
    return 0.0;
  }
  let scroll = Vec3A::splat(time * params.time_scale);
  params.amplitude * fbm(world * params.frequency + scroll, params.seed, params.octaves)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_value_noise_is_deterministic() {
    let p = Vec3A::new(1.3, -2.7, 0.4);
    assert_eq!(value_noise(p, 7), value_noise(p, 7));
    assert_ne!(value_noise(p, 7), value_noise(p, 8));
  }

  #[test]
  fn test_fbm_range() {
    for i in 0..500 {
      let p = Vec3A::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.05);
      let n = fbm(p, 3, 4);
      assert!((-1.0..=1.0).contains(&n), "fbm out of range: {}", n);
    }
  }

  #[test]
  fn test_value_noise_matches_lattice_at_integers() {
    let n = value_noise(Vec3A::new(2.0, 3.0, -1.0), 11);
    assert_eq!(n, lattice(2, 3, -1, 11));
  }

  #[test]
  fn test_inactive_noise_has_no_displacement() {
    let params = NoiseParams::default();
    assert_eq!(displacement(&params, Vec3A::ONE, 3.0), 0.0);
  }

  #[test]
  fn test_time_scrolls_noise() {
    let params = NoiseParams {
      seed: 1,
      octaves: 3,
      frequency: 1.5,
      amplitude: 0.2,
      time_scale: 1.0,
    };
    let p = Vec3A::new(0.3, 0.1, 0.7);
    assert_ne!(displacement(&params, p, 0.0), displacement(&params, p, 0.37));
    assert!(displacement(&params, p, 0.0).abs() <= 0.2);
  }
}
