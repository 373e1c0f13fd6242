use glam::{Affine3A, Vec3};

use super::*;

#[test]
fn test_centered_grid_is_symmetric() {
  let grid = GridLayout::centered(9, 0.25);
  let first = grid.sample_position(0, 0, 0);
  let last = grid.sample_position(8, 8, 8);
  assert!((first + last).length() < 1e-6);
  assert!((grid.extent() - 2.0).abs() < 1e-6);
}

#[test]
fn test_grid_counts() {
  let grid = GridLayout::centered(5, 1.0);
  assert_eq!(grid.sample_count(), 125);
  assert_eq!(grid.cell_count(), 64);
  assert_eq!(grid.cell_coord(grid.cell_index(3, 1, 2)), [3, 1, 2]);
  assert_eq!(grid.sample_coord(grid.sample_index(4, 0, 4)), [4, 0, 4]);
}

#[test]
fn test_default_capacity_small_grid_covers_every_cell() {
  let grid = GridLayout::centered(9, 1.0);
  let cap = BufferCapacity::default().resolve(&grid);
  assert_eq!(cap.vertices, 512);
  assert_eq!(cap.triangles, 512 * 4);
  assert_eq!(cap.intermediates, 512);
}

#[test]
fn test_default_capacity_scales_with_face_area() {
  let grid = GridLayout::centered(65, 1.0);
  let cap = BufferCapacity::default().resolve(&grid);
  assert_eq!(cap.vertices, 64 * 64 * 12);
}

#[test]
fn test_explicit_capacity_wins() {
  let grid = GridLayout::centered(9, 1.0);
  let cap = BufferCapacity {
    max_vertices: Some(10),
    max_triangles: None,
    max_intermediates: Some(3),
  }
  .resolve(&grid);
  assert_eq!(cap.vertices, 10);
  assert_eq!(cap.triangles, 40);
  assert_eq!(cap.intermediates, 3);
}

#[test]
fn test_settings_builder() {
  let settings = MeshSettings::new()
    .with_extraction(ExtractionMode::DualContouring)
    .with_binary_search_iterations(4)
    .with_gradient_descent_iterations(2)
    .with_hard_edge_cosine(0.8);
  assert_eq!(settings.extraction, ExtractionMode::DualContouring);
  assert_eq!(settings.binary_search_iterations, 4);
  assert_eq!(settings.gradient_descent_iterations, 2);
  assert_eq!(settings.hard_edge_cosine, 0.8);
  assert!(settings.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_resolution() {
  let settings = MeshSettings::new().with_grid(GridLayout::centered(1, 1.0));
  assert!(matches!(settings.validate(), Err(PipelineError::InvalidSettings(_))));
}

#[test]
fn test_validate_rejects_bad_cell_size() {
  let settings = MeshSettings::new().with_grid(GridLayout::centered(8, 0.0));
  assert!(settings.validate().is_err());
  let settings = MeshSettings::new().with_grid(GridLayout::centered(8, f32::NAN));
  assert!(settings.validate().is_err());
}

#[test]
fn test_validate_rejects_singular_transform() {
  let settings =
    MeshSettings::new().with_group_to_world(Affine3A::from_scale(Vec3::new(1.0, 0.0, 1.0)));
  assert!(settings.validate().is_err());
}

#[test]
fn test_aabb_encapsulate() {
  let mut aabb = MinMaxAABB::empty();
  assert!(!aabb.is_valid());
  aabb.encapsulate([1.0, -2.0, 0.5]);
  aabb.encapsulate([-1.0, 3.0, 0.0]);
  assert!(aabb.is_valid());
  assert_eq!(aabb.min, [-1.0, -2.0, 0.0]);
  assert_eq!(aabb.max, [1.0, 3.0, 0.5]);
}

#[test]
fn test_host_mesh_counts() {
  let mut mesh = HostMesh::new();
  assert!(mesh.is_empty());
  mesh.positions = vec![[0.0; 3]; 3];
  mesh.indices = vec![0, 1, 2, 2, 1, 0];
  assert_eq!(mesh.vertex_count(), 3);
  assert_eq!(mesh.triangle_count(), 2);
  assert_eq!(mesh.triangles().last(), Some([2, 1, 0]));
  mesh.clear();
  assert!(mesh.is_empty());
}

#[test]
fn test_mesh_data_byte_sizes() {
  let vertices = [OutputVertex::default(); 4];
  let indices = [0u32, 1, 2, 2, 3, 0];
  let data = MeshData::from_slices(&vertices, &indices, MinMaxAABB::empty());
  assert_eq!(data.vertices.len(), 4 * std::mem::size_of::<OutputVertex>());
  assert_eq!(data.indices.len(), 24);
  assert_eq!(data.vertex_count, 4);
  assert_eq!(data.index_count, 6);
}
