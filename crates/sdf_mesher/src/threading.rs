//! Background work on rayon's pool.
//!
//! `rayon::spawn` runs the closure; the result comes back over a one-slot
//! crossbeam channel owned by the returned handle.
//!
//! ```ignore
//! let executor = TaskExecutor::new();
//! let mut handle = executor.spawn(move || expensive_computation());
//!
//! // Each frame:
//! match handle.poll() {
//!     TaskPoll::Ready(result) => { /* use result */ }
//!     TaskPoll::Pending => {}
//!     TaskPoll::Lost => { /* worker panicked */ }
//! }
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::error::PipelineError;

/// Unique identifier for a spawned task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }
}

/// State of a task seen from its handle.
#[derive(Debug)]
pub enum TaskPoll<T> {
  Pending,
  Ready(T),
  /// The worker died without producing a result.
  Lost,
}

/// Receiving end of one spawned task.
#[derive(Debug)]
pub struct TaskHandle<T> {
  id: TaskId,
  rx: Receiver<T>,
}

impl<T> TaskHandle<T> {
  pub fn id(&self) -> TaskId {
    self.id
  }

  /// Non-blocking check for the result.
  pub fn poll(&mut self) -> TaskPoll<T> {
    match self.rx.try_recv() {
      Ok(value) => TaskPoll::Ready(value),
      Err(TryRecvError::Empty) => TaskPoll::Pending,
      Err(TryRecvError::Disconnected) => TaskPoll::Lost,
    }
  }

  /// Block until the task finishes.
  pub fn wait(self) -> Result<T, PipelineError> {
    self.rx.recv().map_err(|_| PipelineError::ReadbackDisconnected)
  }
}

/// Spawns work on rayon's global pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskExecutor;

impl TaskExecutor {
  pub fn new() -> Self {
    Self
  }

  /// Queue `work` without blocking.
  pub fn spawn<F, T>(&self, work: F) -> TaskHandle<T>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    let id = TaskId::next();
    let (tx, rx) = bounded(1);

    rayon::spawn(move || match catch_unwind(AssertUnwindSafe(work)) {
      Ok(result) => {
        // The handle may have been dropped; nobody wants the result then.
        let _ = tx.send(result);
      }
      Err(_) => {
        tracing::warn!(task = id.0, "background task panicked");
      }
    });

    TaskHandle { id, rx }
  }

  /// Worker threads in rayon's pool.
  pub fn num_threads(&self) -> usize {
    rayon::current_num_threads()
  }
}
