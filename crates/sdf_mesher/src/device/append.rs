//! Fixed-capacity append buffer with an atomic cursor.
//!
//! Any number of invocations may append concurrently. The slot an element
//! lands in depends on scheduling; consumers must not assume order.
//! Appends past capacity are dropped and counted, and `len()` never exceeds
//! capacity.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

pub struct AppendBuffer<T> {
  slots: Box<[OnceLock<T>]>,
  cursor: AtomicU32,
  dropped: AtomicU32,
}

impl<T> AppendBuffer<T> {
  pub fn with_capacity(capacity: u32) -> Self {
    Self {
      slots: (0..capacity).map(|_| OnceLock::new()).collect(),
      cursor: AtomicU32::new(0),
      dropped: AtomicU32::new(0),
    }
  }

  pub fn capacity(&self) -> u32 {
    self.slots.len() as u32
  }

  /// Reserve the next slot and store `value` in it.
  ///
  /// Returns the slot index, or `None` when the buffer is full.
  pub fn append(&self, value: T) -> Option<u32> {
    let index = self.cursor.fetch_add(1, Ordering::Relaxed);
    match self.slots.get(index as usize) {
      Some(slot) => {
        // Reserved indices are unique and slots are emptied by `reset`, so
        // the slot is always vacant here.
        let _ = slot.set(value);
        Some(index)
      }
      None => {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        None
      }
    }
  }

  /// Number of stored elements (clamped to capacity).
  pub fn len(&self) -> u32 {
    self.cursor.load(Ordering::Acquire).min(self.capacity())
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Appends rejected since the last reset.
  pub fn dropped(&self) -> u32 {
    self.dropped.load(Ordering::Relaxed)
  }

  pub fn get(&self, index: u32) -> Option<&T> {
    if index < self.len() {
      self.slots[index as usize].get()
    } else {
      None
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
    self.slots[..self.len() as usize].iter().filter_map(OnceLock::get)
  }

  /// Empty the used slots and rewind the cursor.
  pub fn reset(&mut self) {
    let used = self.len() as usize;
    for slot in &mut self.slots[..used] {
      slot.take();
    }
    *self.cursor.get_mut() = 0;
    *self.dropped.get_mut() = 0;
  }
}

impl<T> std::fmt::Debug for AppendBuffer<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppendBuffer")
      .field("len", &self.len())
      .field("capacity", &self.capacity())
      .field("dropped", &self.dropped())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use rayon::prelude::*;

  use super::*;

  #[test]
  fn test_append_and_get() {
    let buf = AppendBuffer::with_capacity(4);
    assert!(buf.is_empty());
    assert_eq!(buf.append(10), Some(0));
    assert_eq!(buf.append(20), Some(1));
    assert_eq!(buf.len(), 2);
    assert_eq!(buf.get(1), Some(&20));
    assert_eq!(buf.get(2), None);
  }

  #[test]
  fn test_overflow_is_clamped_and_counted() {
    let buf = AppendBuffer::with_capacity(3);
    for i in 0..5 {
      buf.append(i);
    }
    assert_eq!(buf.len(), 3);
    assert_eq!(buf.dropped(), 2);
    assert_eq!(buf.iter().count(), 3);
  }

  #[test]
  fn test_concurrent_appends_fill_distinct_slots() {
    let buf = AppendBuffer::with_capacity(10_000);
    (0..10_000u32).into_par_iter().for_each(|i| {
      buf.append(i);
    });
    assert_eq!(buf.len(), 10_000);
    let mut values: Vec<u32> = buf.iter().copied().collect();
    values.sort_unstable();
    assert!(values.iter().enumerate().all(|(i, &v)| i as u32 == v));
  }

  #[test]
  fn test_reset_allows_reuse() {
    let mut buf = AppendBuffer::with_capacity(2);
    buf.append("a");
    buf.append("b");
    buf.append("c");
    buf.reset();
    assert_eq!(buf.len(), 0);
    assert_eq!(buf.dropped(), 0);
    assert_eq!(buf.append("d"), Some(0));
    assert_eq!(buf.get(0), Some(&"d"));
  }
}
