//! Stage 3: Number vertices
//!
//! Append order depends on scheduling, so vertices are renumbered by the rank
//! of their cell among occupied cells. The result is a bijection onto
//! `[0, vertex_count)` that is identical for identical inputs.
//!
//! The rank comes from a compaction over all `(N-1)³` cell records, the same
//! grid-sized scan a prefix sum over cell occupancy would do on a GPU. Only
//! the write-back pass is dispatched indirectly from the vertex count.

use rayon::prelude::*;

use crate::device::{dispatch_indirect, AppendBuffer, DispatchArgs};

use super::buffers::{CellRecord, RawVertex};

#[tracing::instrument(skip_all, name = "pipeline::number")]
pub fn run(
  cells: &[CellRecord],
  vertices: &AppendBuffer<RawVertex>,
  vertex_order: &mut Vec<u32>,
  vertex_args: &DispatchArgs,
  vertex_count: u32,
) {
  // Full-grid compaction, keeps cell-id order.
  vertex_order.clear();
  vertex_order.par_extend(cells.par_iter().filter_map(CellRecord::append_index));

  let order = &vertex_order[..];
  dispatch_indirect(vertex_args, |n| {
    if n >= vertex_count {
      return;
    }
    let Some(vertex) = order.get(n as usize).and_then(|&a| vertices.get(a)) else {
      return;
    };
    cells[vertex.cell as usize].number(n);
  });
}
