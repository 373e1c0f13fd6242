//! Six-stage meshing pipeline.
//!
//! ```text
//! ┌────────┐   ┌───────┐   ┌────────┐   ┌───────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Sample ├──►│ Place ├──►│ Number ├──►│ Triangles ├──►│ Finalize (1) ├──►│ Finalize (2) │
//! └────────┘   └───────┘   └────────┘   └───────────┘   └──────────────┘   └──────────────┘
//!  N³ points    (N-1)³      vertex       vertex          max(vertex,        intermediate
//!               cells       args         args            triangle) args     args
//! ```
//!
//! Stage 1 and 2 are sized by the grid. Everything after reads its dispatch
//! record from `Counters`, written between stages from the append cursors.
//!
//! Output is either left in the device buffers (`PipelineBuffers::device_mesh`)
//! or copied into a `HostMesh` by `readback::read_host_mesh`.

pub mod buffers;
pub mod finalize;
pub mod number;
pub mod place;
pub mod process;
pub mod readback;
pub mod sample;
pub mod triangles;

pub use buffers::{CellRecord, DeviceToken, IntermediateRequest, PipelineBuffers, RawVertex, Triangle};
pub use process::{execute, run, Overflow, RunOutput, RunStats, Stage};
pub use readback::{read_host_mesh, spawn_run, DeviceMesh, ReadbackTask};
