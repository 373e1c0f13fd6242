//! Mesh instance lifecycle.
//!
//! ```text
//!            enable()                         advance(), task done
//! Disabled ───────────► Idle ──advance()──► InFlight ──────────────► Idle
//!     ▲                  │  ▲    (async)        │                      │
//!     │      disable()   │  └───────────────────┘   request while     │
//!     └──────────────────┘       drain            in flight: coalesced │
//!                        └── advance() (sync) runs and commits ────────┘
//! ```
//!
//! An instance owns one `PipelineBuffers`. Asynchronous runs move the buffers
//! into the task and get them back with the result, so nothing can resize,
//! free or read them while a run is in flight. Disabling, changing the buffer
//! shape, and dropping all drain the in-flight task first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::PipelineError;
use crate::metrics::PipelineMetrics;
use crate::pipeline::{run, spawn_run, DeviceMesh, DeviceToken, PipelineBuffers, ReadbackTask, RunOutput, RunStats};
use crate::presentation::MeshSink;
use crate::sdf::SceneBuffers;
use crate::threading::{TaskExecutor, TaskPoll};
use crate::types::{HostMesh, MeshSettings, OutputMode, ReadbackMode};

/// Unique identifier for a mesh instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl InstanceId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }
}

/// How an instance delivers its meshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstanceConfig {
  pub output: OutputMode,
  pub readback: ReadbackMode,
  /// Run on every `advance`, not only when something changed.
  pub auto_update: bool,
}

impl InstanceConfig {
  pub fn with_output(mut self, output: OutputMode) -> Self {
    self.output = output;
    self
  }

  pub fn with_readback(mut self, readback: ReadbackMode) -> Self {
    self.readback = readback;
    self
  }

  pub fn with_auto_update(mut self, auto_update: bool) -> Self {
    self.auto_update = auto_update;
    self
  }
}

/// What a call to `advance` did.
#[derive(Clone, Debug, PartialEq)]
pub enum AdvanceOutcome {
  /// The instance is disabled.
  Disabled,
  /// Nothing changed and auto-update is off.
  Idle,
  /// A run finished and its mesh was committed.
  Completed(RunStats),
  /// An asynchronous run was started.
  Submitted,
  /// An asynchronous run is still going.
  InFlight,
  /// A run is in flight and an update was requested meanwhile. The request
  /// was folded into the running one and does not start another run.
  Coalesced,
  /// The run was abandoned. The previously committed mesh is kept.
  Failed(PipelineError),
}

/// One meshed SDF group.
pub struct MeshInstance {
  id: InstanceId,
  config: InstanceConfig,
  settings: MeshSettings,
  sink: Arc<dyn MeshSink>,
  executor: TaskExecutor,

  buffers: Option<PipelineBuffers>,
  device: Option<DeviceToken>,
  in_flight: Option<ReadbackTask>,

  enabled: bool,
  bound_generation: Option<u64>,
  dirty: bool,
  /// An update was requested while the current run was in flight.
  coalesced: bool,

  committed: Option<HostMesh>,
  last_stats: Option<RunStats>,
  metrics: PipelineMetrics,
}

impl MeshInstance {
  pub fn new(
    settings: MeshSettings,
    config: InstanceConfig,
    sink: Arc<dyn MeshSink>,
  ) -> Result<Self, PipelineError> {
    settings.validate()?;
    Ok(Self {
      id: InstanceId::next(),
      config,
      settings,
      sink,
      executor: TaskExecutor::new(),
      buffers: None,
      device: None,
      in_flight: None,
      enabled: true,
      bound_generation: None,
      dirty: true,
      coalesced: false,
      committed: None,
      last_stats: None,
      metrics: PipelineMetrics::new(),
    })
  }

  pub fn id(&self) -> InstanceId {
    self.id
  }

  pub fn settings(&self) -> &MeshSettings {
    &self.settings
  }

  pub fn config(&self) -> &InstanceConfig {
    &self.config
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  pub fn is_in_flight(&self) -> bool {
    self.in_flight.is_some()
  }

  /// Scene generation the instance last bound to.
  pub fn bound_generation(&self) -> Option<u64> {
    self.bound_generation
  }

  /// Last committed host mesh (host output mode only).
  pub fn mesh(&self) -> Option<&HostMesh> {
    self.committed.as_ref()
  }

  pub fn last_stats(&self) -> Option<&RunStats> {
    self.last_stats.as_ref()
  }

  pub fn metrics(&self) -> &PipelineMetrics {
    &self.metrics
  }

  /// Device-resident output of the last run, unless a run is in flight.
  pub fn device_mesh(&self) -> Option<DeviceMesh<'_>> {
    self.buffers.as_ref().map(PipelineBuffers::device_mesh)
  }

  /// Ask for a run on the next `advance`. Ignored while a run is in flight:
  /// the in-flight run is the answer to it.
  pub fn request_update(&mut self) {
    if self.in_flight.is_some() {
      self.metrics.record_coalesced();
      self.coalesced = true;
    } else {
      self.dirty = true;
    }
  }

  pub fn set_config(&mut self, config: InstanceConfig) {
    if config != self.config {
      self.config = config;
      self.dirty = true;
    }
  }

  /// Replace the settings. Buffers are recreated on the next run if their
  /// shape changes.
  pub fn set_settings(&mut self, settings: MeshSettings) -> Result<(), PipelineError> {
    settings.validate()?;
    if settings == self.settings {
      return Ok(());
    }
    if settings.buffer_shape() != self.settings.buffer_shape() {
      self.drain();
      if self.buffers.take().is_some() {
        tracing::info!(
          instance = self.id.0,
          resolution = settings.grid.resolution,
          "buffer shape changed, releasing buffers"
        );
      }
      self.device = None;
    }
    self.settings = settings;
    self.dirty = true;
    Ok(())
  }

  pub fn enable(&mut self) {
    if !self.enabled {
      self.enabled = true;
      self.dirty = true;
    }
  }

  /// Stop meshing: wait out any in-flight run, release the buffers and clear
  /// the committed mesh.
  pub fn disable(&mut self) {
    if !self.enabled {
      return;
    }
    self.drain();
    self.buffers = None;
    self.device = None;
    self.committed = None;
    self.enabled = false;
    self.sink.on_mesh_cleared(self.id);
  }

  /// Simulate losing the device behind the current buffers, in flight or not.
  pub fn invalidate_device(&mut self) {
    if let Some(device) = &self.device {
      device.invalidate();
    }
  }

  /// Block until the in-flight run finishes and discard its result.
  pub fn drain(&mut self) {
    let Some(task) = self.in_flight.take() else {
      return;
    };
    self.coalesced = false;
    tracing::debug!(instance = self.id.0, task = ?task.id(), "draining in-flight run");
    match task.wait() {
      Ok((buffers, _discarded)) if !buffers.is_lost() => self.buffers = Some(buffers),
      _ => {
        self.buffers = None;
        self.device = None;
      }
    }
    self.dirty = true;
  }

  /// Drive the instance one step against the current scene.
  pub fn advance(&mut self, scene: &SceneBuffers) -> AdvanceOutcome {
    if !self.enabled {
      return AdvanceOutcome::Disabled;
    }

    if let Some(task) = self.in_flight.as_mut() {
      match task.poll() {
        TaskPoll::Ready((buffers, result)) => {
          self.in_flight = None;
          self.coalesced = false;
          return self.commit(buffers, result);
        }
        TaskPoll::Lost => {
          self.in_flight = None;
          self.coalesced = false;
          self.buffers = None;
          self.device = None;
          self.dirty = true;
          return self.fail(PipelineError::ReadbackDisconnected);
        }
        // Scene changes are picked up by the rebind after commit.
        TaskPoll::Pending => {
          return if self.coalesced {
            AdvanceOutcome::Coalesced
          } else {
            AdvanceOutcome::InFlight
          };
        }
      }
    }

    self.rebind(scene);
    if !(self.dirty || self.config.auto_update) {
      return AdvanceOutcome::Idle;
    }
    self.dirty = false;

    let mut buffers = match self.buffers.take() {
      Some(b) if b.fits(&self.settings) => b,
      _ => {
        let b = PipelineBuffers::new(&self.settings);
        self.device = Some(b.device_token());
        b
      }
    };

    match self.config.readback {
      ReadbackMode::Synchronous => {
        let result = run(&mut buffers, scene, &self.settings, self.config.output);
        self.commit(buffers, result)
      }
      ReadbackMode::Asynchronous => {
        self.in_flight = Some(spawn_run(
          &self.executor,
          buffers,
          scene.clone(),
          self.settings.clone(),
          self.config.output,
        ));
        AdvanceOutcome::Submitted
      }
    }
  }

  fn rebind(&mut self, scene: &SceneBuffers) {
    let generation = scene.generation();
    if self.bound_generation != Some(generation) {
      tracing::info!(
        instance = self.id.0,
        from = ?self.bound_generation,
        to = generation,
        "rebinding scene buffers"
      );
      self.bound_generation = Some(generation);
      self.dirty = true;
    }
  }

  fn commit(
    &mut self,
    buffers: PipelineBuffers,
    result: Result<RunOutput, PipelineError>,
  ) -> AdvanceOutcome {
    let output = match result {
      Ok(output) => output,
      Err(err) => {
        if buffers.is_lost() {
          // Reallocate and retry on the next advance.
          self.device = None;
          self.dirty = true;
        } else {
          self.buffers = Some(buffers);
        }
        return self.fail(err);
      }
    };

    let stats = output.stats;
    self.metrics.record_run(&stats);
    self.last_stats = Some(stats);

    if stats.is_empty() {
      self.committed = None;
      self.sink.on_mesh_cleared(self.id);
    } else if let Some(mesh) = output.mesh {
      self.sink.on_host_mesh(self.id, &mesh);
      self.committed = Some(mesh);
    } else {
      self.sink.on_device_mesh(self.id, &buffers.device_mesh());
    }

    self.buffers = Some(buffers);
    AdvanceOutcome::Completed(stats)
  }

  fn fail(&mut self, err: PipelineError) -> AdvanceOutcome {
    tracing::warn!(instance = self.id.0, error = %err, "run abandoned, keeping previous mesh");
    self.metrics.record_failure();
    AdvanceOutcome::Failed(err)
  }
}

impl Drop for MeshInstance {
  fn drop(&mut self) {
    self.drain();
  }
}

impl std::fmt::Debug for MeshInstance {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MeshInstance")
      .field("id", &self.id)
      .field("config", &self.config)
      .field("enabled", &self.enabled)
      .field("in_flight", &self.in_flight.is_some())
      .field("bound_generation", &self.bound_generation)
      .field("dirty", &self.dirty)
      .field("coalesced", &self.coalesced)
      .finish()
  }
}

#[cfg(test)]
#[path = "instance_test.rs"]
mod instance_test;
