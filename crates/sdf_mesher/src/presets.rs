//! Ready-made scenes for demos, benches and tests.

use glam::{Vec3, Vec4};

use crate::sdf::{CombineOp, Material, Primitive, SceneAggregator, Shape};

/// One sphere of `radius` at the origin.
pub fn single_sphere(radius: f32) -> SceneAggregator {
  let mut scene = SceneAggregator::new();
  let stone = scene.add_material(Material::color(Vec4::new(0.6, 0.6, 0.6, 1.0)));
  scene.add_primitive(Primitive::new(Shape::sphere(radius)).with_material(stone));
  scene
}

/// Two overlapping spheres joined by a smooth union with different colors,
/// so both the distance blend and the material blend are visible.
pub fn blended_pair() -> SceneAggregator {
  let mut scene = SceneAggregator::new();
  let red = scene.add_material(Material::color(Vec4::new(0.9, 0.2, 0.1, 1.0)).with_smoothing(0.3));
  let blue = scene.add_material(Material::color(Vec4::new(0.1, 0.3, 0.9, 1.0)).with_smoothing(0.3));
  scene.add_primitive(
    Primitive::new(Shape::sphere(0.5))
      .with_translation(Vec3::new(-0.3, 0.0, 0.0))
      .with_material(red),
  );
  scene.add_primitive(
    Primitive::new(Shape::sphere(0.5))
      .with_translation(Vec3::new(0.3, 0.0, 0.0))
      .with_smoothing(0.25)
      .with_material(blue),
  );
  scene
}

/// A box with a sphere carved out of one corner and a capsule through it.
/// Has hard edges for dual contouring.
pub fn carved_box() -> SceneAggregator {
  let mut scene = SceneAggregator::new();
  let metal = scene.add_material(
    Material::color(Vec4::new(0.8, 0.8, 0.85, 1.0))
      .with_metallic(0.9)
      .with_smoothness(0.7),
  );
  let inner = scene.add_material(Material::color(Vec4::new(0.9, 0.6, 0.1, 1.0)));
  scene.add_primitive(Primitive::new(Shape::cuboid(Vec3::splat(0.5))).with_material(metal));
  scene.add_primitive(
    Primitive::new(Shape::sphere(0.45))
      .with_translation(Vec3::splat(0.45))
      .with_operation(CombineOp::Subtraction)
      .with_smoothing(0.05)
      .with_material(inner),
  );
  scene.add_primitive(
    Primitive::new(Shape::Capsule {
      half_height: 0.6,
      radius: 0.15,
    })
    .with_operation(CombineOp::Subtraction)
    .with_material(inner),
  );
  scene
}

/// Preset by name, as used on the command line.
pub fn by_name(name: &str) -> Option<SceneAggregator> {
  match name {
    "sphere" => Some(single_sphere(1.0)),
    "blended_pair" => Some(blended_pair()),
    "carved_box" => Some(carved_box()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use glam::Vec3A;

  use super::*;

  #[test]
  fn test_presets_publish() {
    for name in ["sphere", "blended_pair", "carved_box"] {
      let buffers = by_name(name).unwrap().publish().unwrap();
      assert!(buffers.primitive_count() > 0, "{name}");
    }
    assert!(by_name("teapot").is_none());
  }

  #[test]
  fn test_carved_box_is_hollow_at_center() {
    let scene = carved_box().publish().unwrap();
    assert!(scene.distance(Vec3A::ZERO, 0.0) > 0.0);
    assert!(scene.distance(Vec3A::new(-0.4, -0.4, 0.4), 0.0) < 0.0);
  }
}
