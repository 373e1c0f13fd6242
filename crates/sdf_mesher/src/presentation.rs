//! MeshSink - callback interface for engine bridges.
//!
//! A mesh instance notifies its sink whenever a run commits. The sink decides
//! what to do with the mesh (upload, draw with the indirect record, store).

use crate::instance::InstanceId;
use crate::pipeline::DeviceMesh;
use crate::types::HostMesh;

/// Callback interface for engine bridges.
///
/// Must be thread-safe: asynchronous runs complete on worker threads, though
/// callbacks themselves are only made from `MeshInstance::advance`.
///
/// # Example
///
/// ```ignore
/// struct Uploader { queue: Mutex<Vec<MeshData>> }
///
/// impl MeshSink for Uploader {
///     fn on_device_mesh(&self, _id: InstanceId, mesh: &DeviceMesh<'_>) {
///         self.queue.lock().unwrap().push(mesh.to_mesh_data());
///     }
///     // ...
/// }
/// ```
pub trait MeshSink: Send + Sync {
  /// A host-mode run committed new arrays.
  fn on_host_mesh(&self, id: InstanceId, mesh: &HostMesh);

  /// A device-resident run committed. The view is valid for the call only.
  fn on_device_mesh(&self, id: InstanceId, mesh: &DeviceMesh<'_>);

  /// The instance has nothing to draw: the surface left the grid, or the
  /// instance was disabled.
  fn on_mesh_cleared(&self, id: InstanceId);
}

/// No-op implementation for testing and headless operation.
pub struct NullSink;

impl MeshSink for NullSink {
  fn on_host_mesh(&self, _id: InstanceId, _mesh: &HostMesh) {}

  fn on_device_mesh(&self, _id: InstanceId, _mesh: &DeviceMesh<'_>) {}

  fn on_mesh_cleared(&self, _id: InstanceId) {}
}
