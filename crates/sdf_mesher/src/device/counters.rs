//! Pipeline counters and the indirect records derived from them.
//!
//! Element counts live in the append buffers' cursors. Between stages the
//! pipeline publishes each count here together with its dispatch record;
//! later stages size themselves from these records only.

use std::sync::atomic::{AtomicU32, Ordering};

use super::{DispatchArgs, DrawIndexedArgs};

#[derive(Debug, Default)]
pub struct Counters {
  pub vertex_count: u32,
  pub triangle_count: u32,
  pub intermediate_count: u32,

  /// Covers stage 3 (numbering) and stage 4 (triangles).
  pub vertex_args: DispatchArgs,
  /// Covers `max(vertex_count, triangle_count)` for finalize pass 1.
  pub finalize_args: DispatchArgs,
  /// Covers finalize pass 2.
  pub intermediate_args: DispatchArgs,

  /// Indices emitted by the triangle stage (3 per triangle).
  index_tally: AtomicU32,

  pub draw: DrawIndexedArgs,
  /// Primary plus intermediate vertices in the final buffer.
  pub final_vertex_count: u32,
}

/// Plain copy of the counters, for logging and readback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
  pub vertex_count: u32,
  pub triangle_count: u32,
  pub intermediate_count: u32,
  pub index_count: u32,
  pub final_vertex_count: u32,
}

impl Counters {
  pub fn reset(&mut self) {
    *self = Self::default();
  }

  pub fn publish_vertices(&mut self, count: u32) {
    self.vertex_count = count;
    self.vertex_args = DispatchArgs::for_count(count);
  }

  pub fn publish_triangles(&mut self, count: u32) {
    self.triangle_count = count;
    self.finalize_args = DispatchArgs::for_count(count.max(self.vertex_count));
  }

  pub fn publish_intermediates(&mut self, count: u32) {
    self.intermediate_count = count;
    self.intermediate_args = DispatchArgs::for_count(count);
  }

  pub fn add_indices(&self, count: u32) {
    self.index_tally.fetch_add(count, Ordering::Relaxed);
  }

  pub fn index_count(&self) -> u32 {
    self.index_tally.load(Ordering::Acquire)
  }

  /// Build the draw record from the finalized counts.
  pub fn publish_draw(&mut self) {
    // Triangles dropped on overflow never tallied, so the tally and the
    // stored triangle count agree; the min guards a partially written record.
    let index_count = self.index_count().min(self.triangle_count * 3);
    self.final_vertex_count = self.vertex_count + self.intermediate_count;
    self.draw = DrawIndexedArgs {
      index_count,
      instance_count: 1,
      first_index: 0,
      base_vertex: 0,
      first_instance: 0,
    };
  }

  pub fn snapshot(&self) -> CounterSnapshot {
    CounterSnapshot {
      vertex_count: self.vertex_count,
      triangle_count: self.triangle_count,
      intermediate_count: self.intermediate_count,
      index_count: self.draw.index_count,
      final_vertex_count: self.final_vertex_count,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_publish_sequence() {
    let mut c = Counters::default();
    c.publish_vertices(100);
    assert_eq!(c.vertex_args.groups(), 2);
    c.publish_triangles(150);
    assert_eq!(c.finalize_args.groups(), 3);
    for _ in 0..150 {
      c.add_indices(3);
    }
    c.publish_intermediates(7);
    assert_eq!(c.intermediate_args.groups(), 1);
    c.publish_draw();
    let snap = c.snapshot();
    assert_eq!(snap.index_count, 450);
    assert_eq!(snap.final_vertex_count, 107);
    assert_eq!(c.draw.instance_count, 1);
  }

  #[test]
  fn test_finalize_covers_vertices_when_larger() {
    let mut c = Counters::default();
    c.publish_vertices(200);
    c.publish_triangles(10);
    assert_eq!(c.finalize_args, DispatchArgs::for_count(200));
  }

  #[test]
  fn test_reset_clears_everything() {
    let mut c = Counters::default();
    c.publish_vertices(5);
    c.add_indices(3);
    c.reset();
    assert_eq!(c.snapshot(), CounterSnapshot::default());
    assert_eq!(c.index_count(), 0);
  }
}
