//! sdf_mesher - Engine independent meshing of blended SDF primitives
//!
//! Turns an ordered list of signed distance primitives, combined with smooth
//! union, subtraction and intersection, into a triangle mesh through a
//! six-stage data-parallel pipeline modelled on GPU compute:
//!
//! - **Smooth CSG**: distance and material blended with independent widths
//! - **Surface Nets / Dual Contouring**: one vertex per surface cell, with
//!   optional bisection and gradient descent refinement
//! - **Append buffers + indirect dispatch**: stages after placement are sized
//!   from counters, never from host-side collection lengths
//! - **Hard edges**: triangle corners across sharp creases get their own
//!   vertices so normals can split
//! - **Async readback**: one run in flight per instance, later requests
//!   coalesced
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sdf_mesher::{presets, InstanceConfig, MeshInstance, MeshSettings, NullSink, OutputMode};
//!
//! let scene = presets::blended_pair().publish()?;
//! let config = InstanceConfig::default().with_output(OutputMode::HostMesh);
//! let mut instance = MeshInstance::new(MeshSettings::default(), config, Arc::new(NullSink))?;
//!
//! instance.advance(&scene);
//! let mesh = instance.mesh().unwrap();
//! println!("{} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
//! ```

pub mod constants;
pub mod edge_table;
pub mod error;
pub mod types;

pub use constants::{coord_to_index, index_to_coord, CORNER_OFFSETS, WORKGROUP_SIZE};
pub use edge_table::{EDGE_CORNERS, EDGE_TABLE};
pub use error::PipelineError;
pub use types::{
  BufferCapacity, ExtractionMode, GridLayout, HostMesh, MeshData, MeshSettings, MinMaxAABB,
  NormalSource, OutputMode, OutputVertex, ReadbackMode,
};

// Signed distance scene and smooth CSG
pub mod sdf;
pub use sdf::{CombineOp, Material, MaterialKind, NoiseParams, Primitive, SceneAggregator, SceneBuffers, Shape};

// Per-cell placement kernels
pub mod surface;

// Emulated compute device
pub mod device;

// Six-stage pipeline
pub mod pipeline;
pub use pipeline::{PipelineBuffers, RunStats, Stage};

// Background tasks
pub mod threading;
pub use threading::{TaskExecutor, TaskHandle, TaskPoll};

// Instance lifecycle and hosting
pub mod driver;
pub mod instance;
pub mod presentation;
pub use driver::Cadence;
pub use instance::{AdvanceOutcome, InstanceConfig, InstanceId, MeshInstance};
pub use presentation::{MeshSink, NullSink};

pub mod metrics;
pub mod presets;
