//! Per-cell surface extraction kernels.
//!
//! ```text
//! 8 corner distances
//!   │ corner_mask::build
//!   ▼
//! mask ── homogeneous? ──► no vertex
//!   │
//!   ▼ placement::edge_crossings      (linear t per crossing edge)
//!   │ refine::bisect                 (binary_search_iterations > 0)
//!   ▼
//! placement::mean / feature_position (surface nets / dual contouring)
//!   │ refine::descend                (gradient_descent_iterations > 0)
//!   ▼
//! gradient::central_difference ──► PlacedVertex { position, normal }
//! ```

pub mod corner_mask;
pub mod gradient;
pub mod material_weights;
pub mod placement;
pub mod refine;

use glam::Vec3A;
use smallvec::SmallVec;

use crate::constants::{FEATURE_SMOOTHING_STEPS, GRADIENT_EPSILON};
use crate::edge_table::is_homogeneous;
use crate::types::{ExtractionMode, MeshSettings};

/// Inputs of the placement kernel that come from settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementParams {
  pub extraction: ExtractionMode,
  pub binary_search_iterations: u32,
  pub gradient_descent_iterations: u32,
  pub hard_edge_cosine: f32,
}

impl From<&MeshSettings> for PlacementParams {
  fn from(settings: &MeshSettings) -> Self {
    Self {
      extraction: settings.extraction,
      binary_search_iterations: settings.binary_search_iterations,
      gradient_descent_iterations: settings.gradient_descent_iterations,
      hard_edge_cosine: settings.hard_edge_cosine,
    }
  }
}

/// Vertex chosen for an active cell, in group-local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedVertex {
  pub position: Vec3A,
  pub normal: Vec3A,
}

/// Place the vertex of the cell at `min` with side `size`.
///
/// `field` returns the local-space distance at a local-space point. Returns
/// `None` for homogeneous cells.
pub fn place_vertex<F>(
  field: &F,
  min: Vec3A,
  size: f32,
  samples: &[f32; 8],
  params: &PlacementParams,
) -> Option<PlacedVertex>
where
  F: Fn(Vec3A) -> f32,
{
  let mask = corner_mask::build(samples);
  if is_homogeneous(mask) {
    return None;
  }

  let mut crossings = placement::edge_crossings(min, size, samples, mask);
  if params.binary_search_iterations > 0 {
    for crossing in crossings.iter_mut() {
      crossing.point = refine::bisect(field, crossing, params.binary_search_iterations);
    }
  }

  let eps = size * GRADIENT_EPSILON;
  let fallback = gradient::from_corners(samples);

  let mut position = match params.extraction {
    ExtractionMode::SurfaceNets => placement::mean(&crossings),
    ExtractionMode::DualContouring => {
      let normals: SmallVec<[Vec3A; 12]> = crossings
        .iter()
        .map(|c| gradient::central_difference(field, c.point, eps).unwrap_or(fallback))
        .collect();
      placement::feature_position(
        &crossings,
        &normals,
        params.hard_edge_cosine,
        FEATURE_SMOOTHING_STEPS,
        min,
        min + Vec3A::splat(size),
      )
    }
  };

  if params.gradient_descent_iterations > 0 {
    position = refine::descend(field, position, params.gradient_descent_iterations, eps);
  }

  let normal = gradient::central_difference(field, position, eps).unwrap_or(fallback);
  Some(PlacedVertex { position, normal })
}
