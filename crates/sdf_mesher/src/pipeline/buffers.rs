//! Device buffer set owned by one mesh instance.
//!
//! ```text
//! grid-sized (realloc on resolution change)   append (cleared every run)
//! ─────────────────────────────────────────   ──────────────────────────
//! samples        N³   FieldSample             vertices       RawVertex
//! cells       (N-1)³  CellRecord              triangles      Triangle
//! vertex_order  ≤cap  numbered → append idx   intermediates  IntermediateRequest
//!
//! final (overwritten every run)
//! ──────────────────────────────
//! final_vertices  cap_v + cap_i  OutputVertex
//! indices         3·cap_t        u32
//! counters + indirect records
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use glam::Vec3A;

use crate::constants::NO_VERTEX;
use crate::device::{AppendBuffer, Counters};
use crate::error::PipelineError;
use crate::sdf::FieldSample;
use crate::types::{MeshSettings, OutputVertex, ResolvedCapacity};

/// Per-cell record: where its vertex landed in the append buffer, and its
/// numbered index once stage 3 ran.
#[derive(Debug)]
pub struct CellRecord {
  append: AtomicU32,
  vertex: AtomicU32,
}

impl Default for CellRecord {
  fn default() -> Self {
    Self {
      append: AtomicU32::new(NO_VERTEX),
      vertex: AtomicU32::new(NO_VERTEX),
    }
  }
}

impl CellRecord {
  /// Written once per run by the placement stage for every cell.
  #[inline]
  pub fn place(&self, append_index: Option<u32>) {
    self.append.store(append_index.unwrap_or(NO_VERTEX), Ordering::Relaxed);
    self.vertex.store(NO_VERTEX, Ordering::Relaxed);
  }

  #[inline]
  pub fn append_index(&self) -> Option<u32> {
    match self.append.load(Ordering::Relaxed) {
      NO_VERTEX => None,
      i => Some(i),
    }
  }

  #[inline]
  pub fn number(&self, vertex_index: u32) {
    self.vertex.store(vertex_index, Ordering::Relaxed);
  }

  #[inline]
  pub fn vertex_index(&self) -> Option<u32> {
    match self.vertex.load(Ordering::Relaxed) {
      NO_VERTEX => None,
      i => Some(i),
    }
  }
}

/// Vertex as emitted by the placement stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawVertex {
  pub position: Vec3A,
  pub normal: Vec3A,
  /// Owning cell id.
  pub cell: u32,
}

/// Triangle over numbered vertex indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triangle {
  pub indices: [u32; 3],
  /// Bit `i` set: corner `i` sits on a hard edge and needs its own vertex.
  pub hard_corners: u8,
}

/// Request for a duplicate of `source` to serve corner `corner` of
/// `triangle`. The duplicate's index is `vertex_count + r`, where `r` is the
/// request's slot in the append buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntermediateRequest {
  pub source: u32,
  pub triangle: u32,
  pub corner: u8,
}

/// Shared flag standing in for the device behind a buffer set. Invalidating
/// it makes every later stage and readback fail with `DeviceLost`.
#[derive(Clone, Debug, Default)]
pub struct DeviceToken(Arc<AtomicBool>);

impl DeviceToken {
  pub fn invalidate(&self) {
    self.0.store(true, Ordering::Release);
  }

  pub fn is_lost(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }
}

/// All buffers a run touches.
pub struct PipelineBuffers {
  resolution: u32,
  capacity: ResolvedCapacity,

  pub(crate) samples: Vec<FieldSample>,
  pub(crate) cells: Box<[CellRecord]>,
  pub(crate) vertices: AppendBuffer<RawVertex>,
  pub(crate) vertex_order: Vec<u32>,
  pub(crate) triangles: AppendBuffer<Triangle>,
  pub(crate) intermediates: AppendBuffer<IntermediateRequest>,
  pub(crate) final_vertices: Vec<OutputVertex>,
  pub(crate) indices: Box<[AtomicU32]>,
  pub(crate) counters: Counters,

  device: DeviceToken,
}

impl PipelineBuffers {
  /// Allocate buffers sized for `settings`.
  pub fn new(settings: &MeshSettings) -> Self {
    let (resolution, capacity) = settings.buffer_shape();
    let grid = &settings.grid;
    let final_len = capacity.vertices as usize + capacity.intermediates as usize;

    tracing::info!(
      resolution,
      vertices = capacity.vertices,
      triangles = capacity.triangles,
      intermediates = capacity.intermediates,
      "allocating pipeline buffers"
    );

    Self {
      resolution,
      capacity,
      samples: vec![FieldSample::empty(); grid.sample_count()],
      cells: (0..grid.cell_count()).map(|_| CellRecord::default()).collect(),
      vertices: AppendBuffer::with_capacity(capacity.vertices),
      vertex_order: Vec::with_capacity(capacity.vertices as usize),
      triangles: AppendBuffer::with_capacity(capacity.triangles),
      intermediates: AppendBuffer::with_capacity(capacity.intermediates),
      final_vertices: vec![OutputVertex::default(); final_len],
      indices: (0..capacity.triangles as usize * 3)
        .map(|_| AtomicU32::new(0))
        .collect(),
      counters: Counters::default(),
      device: DeviceToken::default(),
    }
  }

  pub fn resolution(&self) -> u32 {
    self.resolution
  }

  pub fn capacity(&self) -> ResolvedCapacity {
    self.capacity
  }

  /// True when these buffers can serve `settings` without reallocation.
  pub fn fits(&self, settings: &MeshSettings) -> bool {
    settings.buffer_shape() == (self.resolution, self.capacity)
  }

  /// Clear counters and append cursors before a run.
  pub fn reset(&mut self) {
    self.counters.reset();
    self.vertices.reset();
    self.triangles.reset();
    self.intermediates.reset();
    self.vertex_order.clear();
  }

  /// Mark the buffers unusable, as if the device was removed.
  pub fn invalidate(&self) {
    self.device.invalidate();
  }

  pub fn is_lost(&self) -> bool {
    self.device.is_lost()
  }

  /// Handle that can invalidate these buffers from elsewhere, including while
  /// they are owned by a background run.
  pub fn device_token(&self) -> DeviceToken {
    self.device.clone()
  }

  pub(crate) fn check_device(&self, during: &'static str) -> Result<(), PipelineError> {
    if self.is_lost() {
      Err(PipelineError::DeviceLost(during))
    } else {
      Ok(())
    }
  }

  pub fn counters(&self) -> &Counters {
    &self.counters
  }
}

impl std::fmt::Debug for PipelineBuffers {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PipelineBuffers")
      .field("resolution", &self.resolution)
      .field("capacity", &self.capacity)
      .field("counters", &self.counters.snapshot())
      .field("lost", &self.is_lost())
      .finish()
  }
}
