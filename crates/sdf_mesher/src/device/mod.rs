//! In-process compute device.
//!
//! Models the parts of a GPU compute queue the pipeline depends on:
//!
//! ```text
//! dispatch(groups)          → rayon parallel loop over groups × WORKGROUP_SIZE ids
//! dispatch_indirect(args)   → same, with `groups` read from a DispatchArgs record
//! storage buffer + atomic   → AppendBuffer<T> (fixed capacity, atomic cursor)
//! indirect draw record      → DrawIndexedArgs
//! ```
//!
//! Invocations past the logical count still run, exactly as padded workgroup
//! lanes do, so every kernel bounds-checks its id against the count it was
//! sized from.

mod append;
mod counters;

pub use append::AppendBuffer;
pub use counters::{CounterSnapshot, Counters};

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;

use crate::constants::{group_count, WORKGROUP_SIZE};

/// Indirect compute dispatch record (`x·y·z` workgroups).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DispatchArgs {
  pub x: u32,
  pub y: u32,
  pub z: u32,
}

impl DispatchArgs {
  /// Enough groups to cover `count` invocations.
  pub fn for_count(count: u32) -> Self {
    Self {
      x: group_count(count),
      y: 1,
      z: 1,
    }
  }

  pub fn groups(&self) -> u32 {
    self.x * self.y * self.z
  }

  /// Invocations the dispatch launches, padding lanes included.
  pub fn invocations(&self) -> u32 {
    self.groups() * WORKGROUP_SIZE
  }
}

/// Indexed indirect draw record.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArgs {
  pub index_count: u32,
  pub instance_count: u32,
  pub first_index: u32,
  pub base_vertex: i32,
  pub first_instance: u32,
}

/// Launch `kernel` once per invocation of `groups` workgroups.
pub fn dispatch<K>(groups: u32, kernel: K)
where
  K: Fn(u32) + Send + Sync,
{
  (0..groups * WORKGROUP_SIZE).into_par_iter().for_each(kernel);
}

/// Launch `kernel` with the group count taken from `args`.
pub fn dispatch_indirect<K>(args: &DispatchArgs, kernel: K)
where
  K: Fn(u32) + Send + Sync,
{
  dispatch(args.groups(), kernel);
}

/// Indirect dispatch where invocation `i` owns element `i` of `slots`.
///
/// Invocations beyond `slots.len()` have nothing to write and are skipped.
pub fn dispatch_indirect_mut<T, K>(args: &DispatchArgs, slots: &mut [T], kernel: K)
where
  T: Send,
  K: Fn(u32, &mut T) + Send + Sync,
{
  let n = (args.invocations() as usize).min(slots.len());
  slots[..n]
    .par_iter_mut()
    .enumerate()
    .for_each(|(i, slot)| kernel(i as u32, slot));
}
