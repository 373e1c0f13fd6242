//! Pipeline Orchestrator
//!
//! Issues the six stages in order on one "command stream". Stages 3 to 6 are
//! sized from the dispatch records published after the stage that produced
//! their input; no host-side collection length is consulted.
//!
//! ```text
//! reset ─► 1 sample ─► 2 place ──publish_vertices──► 3 number ─► 4 triangles
//!                                                                   │
//!        draw record ◄── 6 finalize pass 2 ◄──publish_intermediates─┤
//!                                             5 finalize pass 1 ◄───┘ publish_triangles
//! ```

use web_time::Instant;

use super::buffers::PipelineBuffers;
use super::readback::read_host_mesh;
use super::triangles::TriangleInputs;
use super::{finalize, number, place, sample, triangles};
use crate::device::CounterSnapshot;
use crate::error::PipelineError;
use crate::sdf::{LocalField, SceneBuffers};
use crate::surface::PlacementParams;
use crate::types::{HostMesh, MeshSettings, OutputMode};

/// Pipeline stages in issue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
  Sample,
  Place,
  Number,
  Triangles,
  FinalizeCopy,
  FinalizeMerge,
}

impl Stage {
  pub const ALL: [Stage; 6] = [
    Stage::Sample,
    Stage::Place,
    Stage::Number,
    Stage::Triangles,
    Stage::FinalizeCopy,
    Stage::FinalizeMerge,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Stage::Sample => "sample",
      Stage::Place => "place",
      Stage::Number => "number",
      Stage::Triangles => "triangles",
      Stage::FinalizeCopy => "finalize_copy",
      Stage::FinalizeMerge => "finalize_merge",
    }
  }
}

/// Appends rejected because a buffer was full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overflow {
  pub vertices: u32,
  pub triangles: u32,
  pub intermediates: u32,
}

impl Overflow {
  pub fn any(&self) -> bool {
    self.vertices + self.triangles + self.intermediates > 0
  }
}

/// What one run produced and how long each stage took.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunStats {
  pub counters: CounterSnapshot,
  pub overflow: Overflow,
  /// Microseconds per stage, indexed like `Stage::ALL`.
  pub stage_us: [u64; 6],
  pub total_us: u64,
}

impl RunStats {
  pub fn stage_us(&self, stage: Stage) -> u64 {
    self.stage_us[stage as usize]
  }

  pub fn is_empty(&self) -> bool {
    self.counters.vertex_count == 0 || self.counters.index_count == 0
  }
}

/// Result of `run`: stats, plus the host mesh when one was requested.
#[derive(Clone, Debug, Default)]
pub struct RunOutput {
  pub stats: RunStats,
  pub mesh: Option<HostMesh>,
}

/// Execute all six stages against `scene`.
///
/// On success the final vertex buffer, index buffer and draw record in
/// `buffers` describe a complete mesh.
#[tracing::instrument(skip_all, name = "pipeline::execute")]
pub fn execute(
  buffers: &mut PipelineBuffers,
  scene: &SceneBuffers,
  settings: &MeshSettings,
) -> Result<RunStats, PipelineError> {
  settings.validate()?;
  if !buffers.fits(settings) {
    return Err(PipelineError::InvalidSettings(format!(
      "buffers sized for resolution {} cannot run resolution {}",
      buffers.resolution(),
      settings.grid.resolution
    )));
  }
  buffers.check_device("reset")?;

  let total = Instant::now();
  let mut stage_us = [0u64; 6];
  let mut timed = |stage: Stage, start: Instant| {
    stage_us[stage as usize] = start.elapsed().as_micros() as u64;
  };

  let grid = settings.grid;
  let field = LocalField::new(scene, settings.group_to_world, settings.time);
  let params = PlacementParams::from(settings);

  buffers.reset();

  // 1. Sample
  let start = Instant::now();
  sample::run(&mut buffers.samples, &grid, &field);
  timed(Stage::Sample, start);
  buffers.check_device("sample")?;

  // 2. Place vertices
  let start = Instant::now();
  place::run(
    &buffers.samples,
    &buffers.cells,
    &buffers.vertices,
    &grid,
    &field,
    &params,
  );
  buffers.counters.publish_vertices(buffers.vertices.len());
  timed(Stage::Place, start);
  buffers.check_device("place")?;

  // 3. Number vertices
  let start = Instant::now();
  let vertex_args = buffers.counters.vertex_args;
  let vertex_count = buffers.counters.vertex_count;
  number::run(
    &buffers.cells,
    &buffers.vertices,
    &mut buffers.vertex_order,
    &vertex_args,
    vertex_count,
  );
  timed(Stage::Number, start);
  buffers.check_device("number")?;

  // 4. Triangles
  let start = Instant::now();
  let inputs = TriangleInputs {
    samples: &buffers.samples,
    cells: &buffers.cells,
    vertices: &buffers.vertices,
    vertex_order: &buffers.vertex_order,
    grid: &grid,
    extraction: settings.extraction,
    hard_edge_cosine: settings.hard_edge_cosine,
  };
  triangles::run(
    &inputs,
    &buffers.triangles,
    &buffers.counters,
    &vertex_args,
    vertex_count,
  );
  let triangle_count = buffers.triangles.len();
  buffers.counters.publish_triangles(triangle_count);
  timed(Stage::Triangles, start);
  buffers.check_device("triangles")?;

  // 5. Finalize pass 1
  let start = Instant::now();
  let finalize_args = buffers.counters.finalize_args;
  let inputs = finalize::FinalizeInputs {
    samples: &buffers.samples,
    vertices: &buffers.vertices,
    vertex_order: &buffers.vertex_order,
    triangles: &buffers.triangles,
    grid: &grid,
    vertex_count,
    triangle_count,
  };
  finalize::pass_one(
    &inputs,
    &finalize_args,
    &mut buffers.final_vertices,
    &buffers.indices,
    &buffers.intermediates,
  );
  buffers
    .counters
    .publish_intermediates(buffers.intermediates.len());
  timed(Stage::FinalizeCopy, start);
  buffers.check_device("finalize")?;

  // 6. Finalize pass 2
  let start = Instant::now();
  let intermediate_args = buffers.counters.intermediate_args;
  let intermediate_count = buffers.counters.intermediate_count;
  finalize::pass_two(
    &intermediate_args,
    &buffers.intermediates,
    &mut buffers.final_vertices,
    &buffers.indices,
    vertex_count,
    intermediate_count,
  );
  buffers.counters.publish_draw();
  timed(Stage::FinalizeMerge, start);
  buffers.check_device("finalize")?;

  let overflow = Overflow {
    vertices: buffers.vertices.dropped(),
    triangles: buffers.triangles.dropped(),
    intermediates: buffers.intermediates.dropped(),
  };
  if overflow.any() {
    tracing::warn!(
      dropped_vertices = overflow.vertices,
      dropped_triangles = overflow.triangles,
      dropped_intermediates = overflow.intermediates,
      "append buffer capacity reached, output clamped"
    );
  }

  let counters = buffers.counters.snapshot();
  tracing::debug!(?counters, "pipeline run complete");

  Ok(RunStats {
    counters,
    overflow,
    stage_us,
    total_us: total.elapsed().as_micros() as u64,
  })
}

/// `execute`, followed by host readback when `output` asks for it.
pub fn run(
  buffers: &mut PipelineBuffers,
  scene: &SceneBuffers,
  settings: &MeshSettings,
  output: OutputMode,
) -> Result<RunOutput, PipelineError> {
  let stats = execute(buffers, scene, settings)?;
  let mesh = match output {
    OutputMode::DeviceResident => None,
    OutputMode::HostMesh => Some(read_host_mesh(buffers, settings)?),
  };
  Ok(RunOutput { stats, mesh })
}

#[cfg(test)]
#[path = "process_test.rs"]
mod process_test;
