//! Stage 2: Place vertices
//!
//! One invocation per cell. Active cells get a vertex appended to the vertex
//! buffer and remember its append index; every cell record is rewritten so
//! nothing from a previous run survives.

use crate::constants::{group_count, CORNER_OFFSETS};
use crate::device::{dispatch, AppendBuffer};
use crate::sdf::{FieldSample, LocalField};
use crate::surface::{place_vertex, PlacementParams};
use crate::types::GridLayout;

use super::buffers::{CellRecord, RawVertex};

/// Distances at the 8 corners of a cell.
#[inline]
pub(crate) fn corner_distances(samples: &[FieldSample], grid: &GridLayout, cell: [usize; 3]) -> [f32; 8] {
  std::array::from_fn(|i| {
    let o = CORNER_OFFSETS[i];
    samples[grid.sample_index(cell[0] + o[0], cell[1] + o[1], cell[2] + o[2])].distance
  })
}

#[tracing::instrument(skip_all, name = "pipeline::place")]
pub fn run(
  samples: &[FieldSample],
  cells: &[CellRecord],
  vertices: &AppendBuffer<RawVertex>,
  grid: &GridLayout,
  field: &LocalField<'_>,
  params: &PlacementParams,
) {
  let cell_count = cells.len() as u32;
  let distance = |p| field.distance(p);

  dispatch(group_count(cell_count), |id| {
    if id >= cell_count {
      return;
    }
    let cell = grid.cell_coord(id as usize);
    let corners = corner_distances(samples, grid, cell);
    let (min, _) = grid.cell_bounds(cell);

    let appended = place_vertex(&distance, min, grid.cell_size, &corners, params).and_then(|v| {
      vertices.append(RawVertex {
        position: v.position,
        normal: v.normal,
        cell: id,
      })
    });
    cells[id as usize].place(appended);
  });
}

#[cfg(test)]
mod tests {
  use glam::Affine3A;

  use super::*;
  use crate::sdf::{Material, Primitive, SceneBuffers, Shape};
  use crate::types::MeshSettings;

  fn placed(resolution: u32, capacity: u32) -> (Vec<CellRecord>, AppendBuffer<RawVertex>, GridLayout) {
    let scene = SceneBuffers::build(
      &[Primitive::new(Shape::sphere(1.0))],
      &[Material::default()],
      1,
    )
    .unwrap();
    let grid = GridLayout::centered(resolution, 3.0 / (resolution - 1) as f32);
    let field = LocalField::new(&scene, Affine3A::IDENTITY, 0.0);
    let mut samples = vec![FieldSample::empty(); grid.sample_count()];
    super::super::sample::run(&mut samples, &grid, &field);

    let cells: Vec<CellRecord> = (0..grid.cell_count()).map(|_| CellRecord::default()).collect();
    let vertices = AppendBuffer::with_capacity(capacity);
    let params = PlacementParams::from(&MeshSettings::default().with_grid(grid));
    run(&samples, &cells, &vertices, &grid, &field, &params);
    (cells, vertices, grid)
  }

  #[test]
  fn test_back_references_point_at_own_vertex() {
    let (cells, vertices, _) = placed(12, 4096);
    assert!(vertices.len() > 0);
    for (id, cell) in cells.iter().enumerate() {
      if let Some(a) = cell.append_index() {
        assert_eq!(vertices.get(a).unwrap().cell, id as u32);
      }
    }
    let occupied = cells.iter().filter(|c| c.append_index().is_some()).count();
    assert_eq!(occupied as u32, vertices.len());
  }

  #[test]
  fn test_overflowing_cells_have_no_vertex() {
    let (cells, vertices, _) = placed(12, 8);
    assert_eq!(vertices.len(), 8);
    assert!(vertices.dropped() > 0);
    let occupied = cells.iter().filter(|c| c.append_index().is_some()).count();
    assert_eq!(occupied, 8);
  }

  #[test]
  fn test_vertices_lie_inside_their_cell() {
    let (_, vertices, grid) = placed(10, 4096);
    for v in vertices.iter() {
      let (min, max) = grid.cell_bounds(grid.cell_coord(v.cell as usize));
      assert!(v.position.cmpge(min - 1e-5).all() && v.position.cmple(max + 1e-5).all());
      assert!((v.normal.length() - 1.0).abs() < 1e-3);
    }
  }
}
