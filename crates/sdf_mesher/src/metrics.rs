//! Per-instance pipeline statistics.
//!
//! Only collected with the `metrics` feature, and only while
//! `COLLECT_METRICS` is set.
//!
//! ```ignore
//! let m = instance.metrics();
//! println!("{:.1} us per run, {} coalesced", m.avg_run_us(), m.requests_coalesced);
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::pipeline::{RunStats, Stage};

/// Cleared to pause collection without rebuilding.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Feature compiled in and toggle set.
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Last `capacity` timings in microseconds, with a running total so the
/// average is constant time.
#[derive(Debug, Clone)]
pub struct TimingWindow {
  samples: VecDeque<u64>,
  capacity: usize,
  total: u64,
}

impl TimingWindow {
  pub fn new(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity: capacity.max(1),
      total: 0,
    }
  }

  pub fn record(&mut self, micros: u64) {
    if self.samples.len() == self.capacity {
      if let Some(evicted) = self.samples.pop_front() {
        self.total -= evicted;
      }
    }
    self.samples.push_back(micros);
    self.total += micros;
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn latest(&self) -> Option<u64> {
    self.samples.back().copied()
  }

  pub fn mean(&self) -> f64 {
    match self.samples.len() {
      0 => 0.0,
      n => self.total as f64 / n as f64,
    }
  }

  /// Slowest timing still in the window.
  pub fn peak(&self) -> u64 {
    self.samples.iter().copied().max().unwrap_or(0)
  }
}

impl Default for TimingWindow {
  fn default() -> Self {
    Self::new(64)
  }
}

/// Run history of one mesh instance.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
  /// Whole-run time in microseconds.
  pub run_timings: TimingWindow,
  /// Per-stage times, indexed like `Stage::ALL`.
  pub stage_timings: [TimingWindow; 6],

  pub last_vertex_count: u32,
  pub last_triangle_count: u32,
  pub last_intermediate_count: u32,

  pub runs_completed: u64,
  pub runs_failed: u64,
  /// Requests folded into an in-flight asynchronous run.
  pub requests_coalesced: u64,
  /// Runs that hit an append buffer capacity.
  pub runs_overflowed: u64,
}

impl PipelineMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record_run(&mut self, stats: &RunStats) {
    if !is_enabled() {
      return;
    }
    self.run_timings.record(stats.total_us);
    for stage in Stage::ALL {
      self.stage_timings[stage as usize].record(stats.stage_us(stage));
    }
    self.last_vertex_count = stats.counters.vertex_count;
    self.last_triangle_count = stats.counters.triangle_count;
    self.last_intermediate_count = stats.counters.intermediate_count;
    self.runs_completed += 1;
    if stats.overflow.any() {
      self.runs_overflowed += 1;
    }
  }

  pub fn record_failure(&mut self) {
    if is_enabled() {
      self.runs_failed += 1;
    }
  }

  pub fn record_coalesced(&mut self) {
    if is_enabled() {
      self.requests_coalesced += 1;
    }
  }

  pub fn avg_run_us(&self) -> f64 {
    self.run_timings.mean()
  }

  pub fn avg_stage_us(&self, stage: Stage) -> f64 {
    self.stage_timings[stage as usize].mean()
  }

  /// Approximate size of the last mesh: final vertex records plus indices.
  pub fn last_mesh_bytes(&self) -> u64 {
    let vertices = (self.last_vertex_count + self.last_intermediate_count) as u64;
    vertices * std::mem::size_of::<crate::types::OutputVertex>() as u64
      + self.last_triangle_count as u64 * 12
  }
}
