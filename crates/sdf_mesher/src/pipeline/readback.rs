//! Getting results out of the device buffers.
//!
//! Device-resident output hands out borrowed views plus the draw record.
//! Host output copies into `HostMesh` arrays, adds triplanar UVs, and
//! optionally rebuilds normals from the triangles.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Vec2, Vec3A};

use super::buffers::PipelineBuffers;
use super::process::{self, RunOutput};
use crate::device::DrawIndexedArgs;
use crate::error::PipelineError;
use crate::sdf::SceneBuffers;
use crate::surface::gradient::recalculate_from_geometry;
use crate::threading::{TaskExecutor, TaskHandle};
use crate::types::{HostMesh, MeshData, MeshSettings, MinMaxAABB, NormalSource, OutputMode, OutputVertex};

/// Borrowed view of the finalized device buffers.
pub struct DeviceMesh<'a> {
  pub vertices: &'a [OutputVertex],
  pub indices: &'a [AtomicU32],
  pub draw: DrawIndexedArgs,
}

impl DeviceMesh<'_> {
  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn index_count(&self) -> usize {
    self.indices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }

  pub fn load_indices(&self) -> Vec<u32> {
    self.indices.iter().map(|i| i.load(Ordering::Relaxed)).collect()
  }

  pub fn bounds(&self) -> MinMaxAABB {
    let mut bounds = MinMaxAABB::empty();
    for v in self.vertices {
      bounds.encapsulate(v.position);
    }
    bounds
  }

  /// Copy into byte buffers for hand-off across an FFI boundary.
  pub fn to_mesh_data(&self) -> MeshData {
    MeshData::from_slices(self.vertices, &self.load_indices(), self.bounds())
  }
}

impl PipelineBuffers {
  /// View of the last completed run, sized by the draw record.
  pub fn device_mesh(&self) -> DeviceMesh<'_> {
    let draw = self.counters.draw;
    let vertex_count = (self.counters.final_vertex_count as usize).min(self.final_vertices.len());
    let index_count = (draw.index_count as usize).min(self.indices.len());
    DeviceMesh {
      vertices: &self.final_vertices[..vertex_count],
      indices: &self.indices[..index_count],
      draw,
    }
  }
}

/// Planar UV on the axis plane the normal faces most.
#[inline]
pub fn triplanar_uv(position: Vec3A, normal: Vec3A, scale: f32) -> Vec2 {
  let n = normal.abs();
  let inv = if scale > 0.0 { scale.recip() } else { 1.0 };
  if n.x >= n.y && n.x >= n.z {
    Vec2::new(position.y, position.z) * inv
  } else if n.y >= n.z {
    Vec2::new(position.x, position.z) * inv
  } else {
    Vec2::new(position.x, position.y) * inv
  }
}

/// Copy the finalized buffers into host arrays.
#[tracing::instrument(skip_all, name = "pipeline::readback")]
pub fn read_host_mesh(buffers: &PipelineBuffers, settings: &MeshSettings) -> Result<HostMesh, PipelineError> {
  buffers.check_device("reading back")?;
  let view = buffers.device_mesh();
  let vertex_count = view.vertex_count() as u32;

  let indices = view.load_indices();
  if let Some((index, &vertex)) = indices.iter().enumerate().find(|(_, &v)| v >= vertex_count) {
    return Err(PipelineError::CorruptOutput {
      index,
      vertex,
      vertex_count,
    });
  }

  let mut mesh = HostMesh::new();
  mesh.positions.reserve(view.vertex_count());
  mesh.colors.reserve(view.vertex_count());
  for v in view.vertices {
    mesh.positions.push(v.position);
    mesh.normals.push(v.normal);
    mesh.colors.push(v.color);
    mesh.bounds.encapsulate(v.position);
  }
  mesh.indices = indices;

  if settings.normal_source == NormalSource::Geometry {
    recalculate_from_geometry(&mesh.positions, &mesh.indices, &mut mesh.normals);
  }

  mesh.uvs = mesh
    .positions
    .iter()
    .zip(&mesh.normals)
    .map(|(p, n)| {
      triplanar_uv(Vec3A::from_array(*p), Vec3A::from_array(*n), settings.uv_scale).to_array()
    })
    .collect();

  Ok(mesh)
}

/// A run plus readback executing on the pool. The buffers travel with the
/// task and come back with its result.
pub type ReadbackTask = TaskHandle<(PipelineBuffers, Result<RunOutput, PipelineError>)>;

/// Start `process::run` in the background, taking ownership of `buffers`.
pub fn spawn_run(
  executor: &TaskExecutor,
  mut buffers: PipelineBuffers,
  scene: SceneBuffers,
  settings: MeshSettings,
  output: OutputMode,
) -> ReadbackTask {
  executor.spawn(move || {
    let result = process::run(&mut buffers, &scene, &settings, output);
    (buffers, result)
  })
}
