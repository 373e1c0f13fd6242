use glam::Vec3A;

use super::*;

fn sphere(p: Vec3A) -> f32 {
  p.length() - 1.0
}

#[test]
fn test_corner_gradient_axes() {
  let x = from_corners(&[-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
  assert!((x - Vec3A::X).length() < 1e-6);
  let y = from_corners(&[-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0]);
  assert!((y - Vec3A::Y).length() < 1e-6);
  let z = from_corners(&[-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0]);
  assert!((z - Vec3A::Z).length() < 1e-6);
}

#[test]
fn test_corner_gradient_degenerate() {
  assert_eq!(from_corners(&[0.0; 8]), Vec3A::Y);
  assert_eq!(from_corners(&[f32::INFINITY; 8]), Vec3A::Y);
}

#[test]
fn test_central_difference_on_sphere() {
  for p in [
    Vec3A::new(1.0, 0.0, 0.0),
    Vec3A::new(0.3, -0.8, 0.52),
    Vec3A::new(-2.0, 1.0, 0.5),
  ] {
    let n = central_difference(&sphere, p, 1e-3).unwrap();
    assert!((n - p.normalize()).length() < 1e-3, "{:?} vs {:?}", n, p.normalize());
  }
}

#[test]
fn test_central_difference_vanishing_gradient() {
  let flat = |_p: Vec3A| 0.25;
  assert!(central_difference(&flat, Vec3A::ZERO, 1e-3).is_none());
  let empty = |_p: Vec3A| f32::INFINITY;
  assert!(central_difference(&empty, Vec3A::ZERO, 1e-3).is_none());
}

#[test]
fn test_geometry_normals_single_triangle() {
  let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
  let mut normals = [[0.0; 3]; 3];
  recalculate_from_geometry(&positions, &[0, 1, 2], &mut normals);
  for n in normals {
    assert!((Vec3A::from_array(n) - Vec3A::Z).length() < 1e-6);
  }
}

#[test]
fn test_geometry_normals_shared_vs_split_crease() {
  // Two faces meeting at a right angle along the x axis.
  let positions = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0], // floor (normal +y)
    [0.0, 1.0, 0.0],  // wall (normal +z)
  ];
  let mut normals = [[0.0; 3]; 4];
  recalculate_from_geometry(&positions, &[0, 1, 2, 0, 1, 3], &mut normals);
  let shared = Vec3A::from_array(normals[0]);
  assert!((shared - Vec3A::new(0.0, 1.0, 1.0).normalize()).length() < 1e-5);

  // Same faces, crease vertices duplicated for the wall.
  let split_positions = [
    positions[0],
    positions[1],
    positions[2],
    positions[3],
    positions[0],
    positions[1],
  ];
  let mut split_normals = [[0.0; 3]; 6];
  recalculate_from_geometry(&split_positions, &[0, 1, 2, 4, 5, 3], &mut split_normals);
  assert!((Vec3A::from_array(split_normals[0]) - Vec3A::Y).length() < 1e-5);
  assert!((Vec3A::from_array(split_normals[4]) - Vec3A::Z).length() < 1e-5);
}

#[test]
fn test_geometry_normals_ignore_unreferenced() {
  let positions = [[0.0; 3]; 2];
  let mut normals = [[5.0; 3]; 2];
  recalculate_from_geometry(&positions, &[], &mut normals);
  assert_eq!(normals, [[0.0, 1.0, 0.0]; 2]);
}
