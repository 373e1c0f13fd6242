//! Primitive shapes in their local frame. All distances are exact or
//! conservative (never overestimate), so refinement steps stay stable.

use glam::{Vec2, Vec3, Vec3A};

/// Shape of a primitive, centered at its local origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
  Sphere { radius: f32 },
  Box { half_extents: Vec3 },
  RoundedBox { half_extents: Vec3, radius: f32 },
  /// Ring in the XZ plane.
  Torus { major_radius: f32, minor_radius: f32 },
  /// Segment along Y from `-half_height` to `half_height`.
  Capsule { half_height: f32, radius: f32 },
  /// Capped cylinder along Y.
  Cylinder { half_height: f32, radius: f32 },
  /// Half-space below the plane `dot(p, normal) = offset`.
  Plane { normal: Vec3, offset: f32 },
}

impl Shape {
  pub fn sphere(radius: f32) -> Self {
    Shape::Sphere { radius }
  }

  pub fn cuboid(half_extents: Vec3) -> Self {
    Shape::Box { half_extents }
  }

  /// Signed distance at a local-space point.
  #[inline]
  pub fn distance(&self, p: Vec3A) -> f32 {
    match *self {
      Shape::Sphere { radius } => p.length() - radius,
      Shape::Box { half_extents } => box_distance(p, Vec3A::from(half_extents)),
      Shape::RoundedBox {
        half_extents,
        radius,
      } => box_distance(p, Vec3A::from(half_extents) - Vec3A::splat(radius)) - radius,
      Shape::Torus {
        major_radius,
        minor_radius,
      } => {
        let q = Vec2::new(Vec2::new(p.x, p.z).length() - major_radius, p.y);
        q.length() - minor_radius
      }
      Shape::Capsule {
        half_height,
        radius,
      } => {
        let y = p.y - p.y.clamp(-half_height, half_height);
        Vec3A::new(p.x, y, p.z).length() - radius
      }
      Shape::Cylinder {
        half_height,
        radius,
      } => {
        let d = Vec2::new(Vec2::new(p.x, p.z).length() - radius, p.y.abs() - half_height);
        d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
      }
      Shape::Plane { normal, offset } => {
        p.dot(Vec3A::from(normal.normalize_or(Vec3::Y))) - offset
      }
    }
  }

  /// Dimensions are finite and positive where they must be.
  pub fn is_valid(&self) -> bool {
    match *self {
      Shape::Sphere { radius } => radius.is_finite() && radius > 0.0,
      Shape::Box { half_extents } => half_extents.is_finite() && half_extents.min_element() > 0.0,
      Shape::RoundedBox {
        half_extents,
        radius,
      } => {
        half_extents.is_finite()
          && radius.is_finite()
          && radius >= 0.0
          && half_extents.min_element() >= radius
      }
      Shape::Torus {
        major_radius,
        minor_radius,
      } => major_radius.is_finite() && minor_radius.is_finite() && minor_radius > 0.0,
      Shape::Capsule {
        half_height,
        radius,
      }
      | Shape::Cylinder {
        half_height,
        radius,
      } => half_height.is_finite() && radius.is_finite() && half_height >= 0.0 && radius > 0.0,
      Shape::Plane { normal, offset } => {
        normal.is_finite() && offset.is_finite() && normal.length_squared() > 1e-12
      }
    }
  }
}

#[inline(always)]
fn box_distance(p: Vec3A, half_extents: Vec3A) -> f32 {
  let q = p.abs() - half_extents;
  q.max(Vec3A::ZERO).length() + q.max_element().min(0.0)
}
