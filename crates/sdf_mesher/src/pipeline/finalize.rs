//! Stages 5 and 6: Finalize
//!
//! ```text
//! pass 1  (finalize_args = max(vertex_count, triangle_count))
//!   ├─ i < vertex_count:   final_vertices[i] = primary i + corner material
//!   └─ t < triangle_count: indices[3t..3t+3] = triangle t
//!                          flagged corner → IntermediateRequest
//! pass 2  (intermediate_args)
//!   r < intermediate_count: final_vertices[vertex_count + r] = copy of source
//!                           indices[3·triangle + corner] = vertex_count + r
//! ```
//!
//! Duplicates carry the source's attributes unchanged. They exist so that
//! per-vertex attributes (geometry normals in particular) can differ across a
//! hard edge.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec3A;

use crate::constants::CORNER_OFFSETS;
use crate::device::{dispatch_indirect, dispatch_indirect_mut, AppendBuffer, DispatchArgs};
use crate::sdf::{BlendedMaterial, FieldSample};
use crate::surface::material_weights;
use crate::types::{GridLayout, OutputVertex};

use super::buffers::{IntermediateRequest, RawVertex, Triangle};

/// Pack position, normal and material into the device vertex layout.
pub fn output_vertex(position: Vec3A, normal: Vec3A, material: &BlendedMaterial) -> OutputVertex {
  OutputVertex {
    position: position.to_array(),
    normal: normal.to_array(),
    color: material.color.to_array(),
    emission: material.emission.to_array(),
    metallic: material.metallic,
    smoothness: material.smoothness,
    subsurface: material.subsurface.to_array(),
    splat_weights: material.splat.to_array(),
  }
}

/// Material at a vertex, blended from its cell's corner samples.
fn vertex_material(samples: &[FieldSample], grid: &GridLayout, vertex: &RawVertex) -> BlendedMaterial {
  let cell = grid.cell_coord(vertex.cell as usize);
  let corner = |i: usize| {
    let o = CORNER_OFFSETS[i];
    &samples[grid.sample_index(cell[0] + o[0], cell[1] + o[1], cell[2] + o[2])]
  };
  let materials: [BlendedMaterial; 8] = std::array::from_fn(|i| corner(i).material);
  let distances: [f32; 8] = std::array::from_fn(|i| corner(i).distance);
  let (min, _) = grid.cell_bounds(cell);
  let frac = (vertex.position - min) / grid.cell_size;
  material_weights::blend(&materials, &distances, frac)
}

/// Inputs of pass 1 besides the buffers it writes.
pub struct FinalizeInputs<'a> {
  pub samples: &'a [FieldSample],
  pub vertices: &'a AppendBuffer<RawVertex>,
  pub vertex_order: &'a [u32],
  pub triangles: &'a AppendBuffer<Triangle>,
  pub grid: &'a GridLayout,
  pub vertex_count: u32,
  pub triangle_count: u32,
}

#[tracing::instrument(skip_all, name = "pipeline::finalize_pass_one")]
pub fn pass_one(
  inputs: &FinalizeInputs<'_>,
  finalize_args: &DispatchArgs,
  final_vertices: &mut [OutputVertex],
  indices: &[AtomicU32],
  intermediates: &AppendBuffer<IntermediateRequest>,
) {
  let vertex_count = inputs.vertex_count;
  let triangle_count = inputs.triangle_count;

  rayon::join(
    || {
      dispatch_indirect_mut(finalize_args, final_vertices, |i, slot| {
        if i >= vertex_count {
          return;
        }
        let Some(vertex) = inputs
          .vertex_order
          .get(i as usize)
          .and_then(|&a| inputs.vertices.get(a))
        else {
          return;
        };
        let material = vertex_material(inputs.samples, inputs.grid, vertex);
        *slot = output_vertex(vertex.position, vertex.normal, &material);
      });
    },
    || {
      dispatch_indirect(finalize_args, |t| {
        if t >= triangle_count {
          return;
        }
        let Some(tri) = inputs.triangles.get(t) else {
          return;
        };
        let base = 3 * t as usize;
        for corner in 0..3u8 {
          let source = tri.indices[corner as usize];
          indices[base + corner as usize].store(source, Ordering::Relaxed);
          if tri.hard_corners & (1 << corner) != 0 {
            // Overflow keeps the shared vertex.
            let _ = intermediates.append(IntermediateRequest {
              source,
              triangle: t,
              corner,
            });
          }
        }
      });
    },
  );
}

#[tracing::instrument(skip_all, name = "pipeline::finalize_pass_two")]
pub fn pass_two(
  intermediate_args: &DispatchArgs,
  intermediates: &AppendBuffer<IntermediateRequest>,
  final_vertices: &mut [OutputVertex],
  indices: &[AtomicU32],
  vertex_count: u32,
  intermediate_count: u32,
) {
  let (primaries, extras) = final_vertices.split_at_mut(vertex_count as usize);
  let primaries = &*primaries;

  dispatch_indirect_mut(intermediate_args, extras, |r, slot| {
    if r >= intermediate_count {
      return;
    }
    let Some(request) = intermediates.get(r) else {
      return;
    };
    let Some(source) = primaries.get(request.source as usize) else {
      return;
    };
    *slot = *source;
    let at = 3 * request.triangle as usize + request.corner as usize;
    indices[at].store(vertex_count + r, Ordering::Relaxed);
  });
}

#[cfg(test)]
mod tests {
  use glam::Vec4;

  use super::*;
  use crate::sdf::Material;

  #[test]
  fn test_output_vertex_packs_material() {
    let m = Material::color(Vec4::new(0.2, 0.4, 0.6, 1.0))
      .with_metallic(0.7)
      .with_smoothness(0.3)
      .resolve();
    let v = output_vertex(Vec3A::new(1.0, 2.0, 3.0), Vec3A::Z, &m);
    assert_eq!(v.position, [1.0, 2.0, 3.0]);
    assert_eq!(v.normal, [0.0, 0.0, 1.0]);
    assert_eq!(v.color, [0.2, 0.4, 0.6, 1.0]);
    assert_eq!(v.metallic, 0.7);
    assert_eq!(v.smoothness, 0.3);
  }

  #[test]
  fn test_pass_two_rewrites_flagged_corners() {
    let mut final_vertices = vec![OutputVertex::default(); 6];
    final_vertices[0].position = [1.0, 0.0, 0.0];
    final_vertices[1].position = [0.0, 1.0, 0.0];
    final_vertices[2].position = [0.0, 0.0, 1.0];

    let indices: Vec<AtomicU32> = [0u32, 1, 2].into_iter().map(AtomicU32::new).collect();
    let intermediates = AppendBuffer::with_capacity(3);
    intermediates.append(IntermediateRequest {
      source: 2,
      triangle: 0,
      corner: 2,
    });

    pass_two(&DispatchArgs::for_count(1), &intermediates, &mut final_vertices, &indices, 3, 1);

    assert_eq!(indices[2].load(Ordering::Relaxed), 3);
    assert_eq!(final_vertices[3].position, [0.0, 0.0, 1.0]);
    assert_eq!(indices[0].load(Ordering::Relaxed), 0);
  }
}
