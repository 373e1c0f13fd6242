//! Error type shared by the pipeline, readback and instance layers.

use thiserror::Error;

/// Failures surfaced by a meshing run.
///
/// Degenerate inputs (tiny smoothing widths, empty scenes, surfaces outside the
/// grid) are not errors; they produce clamped or empty output instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
  #[error("invalid mesh settings: {0}")]
  InvalidSettings(String),

  #[error("invalid scene: {0}")]
  InvalidScene(String),

  /// The device buffers were invalidated mid-run.
  #[error("device lost while {0}")]
  DeviceLost(&'static str),

  /// The worker running an asynchronous readback went away without a result.
  #[error("readback worker disconnected")]
  ReadbackDisconnected,

  #[error("corrupt output: index {index} references vertex {vertex} of {vertex_count}")]
  CorruptOutput {
    index: usize,
    vertex: u32,
    vertex_count: u32,
  },
}
