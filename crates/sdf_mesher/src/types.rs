//! Core data types: mesh settings, output vertex layout and host mesh arrays.

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Vec3, Vec3A};

use crate::constants::{
  coord_to_index, index_to_coord, DEFAULT_HARD_EDGE_COSINE, MAX_RESOLUTION, MIN_RESOLUTION,
};
use crate::error::PipelineError;

// =============================================================================
// Grid layout
// =============================================================================

/// Sample grid placement in group-local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
  /// Samples per axis (N). The grid holds N³ samples and (N-1)³ cells.
  pub resolution: u32,

  /// Distance between neighbouring samples.
  pub cell_size: f32,

  /// Group-local position of sample (0,0,0).
  pub origin: Vec3,
}

impl Default for GridLayout {
  fn default() -> Self {
    Self::centered(32, 1.0 / 16.0)
  }
}

impl GridLayout {
  pub fn new(resolution: u32, cell_size: f32, origin: Vec3) -> Self {
    Self {
      resolution,
      cell_size,
      origin,
    }
  }

  /// Grid centered on the group origin.
  pub fn centered(resolution: u32, cell_size: f32) -> Self {
    let half = (resolution.saturating_sub(1)) as f32 * cell_size * 0.5;
    Self::new(resolution, cell_size, Vec3::splat(-half))
  }

  #[inline(always)]
  pub fn samples_per_axis(&self) -> usize {
    self.resolution as usize
  }

  #[inline(always)]
  pub fn cells_per_axis(&self) -> usize {
    self.resolution.saturating_sub(1) as usize
  }

  pub fn sample_count(&self) -> usize {
    self.samples_per_axis().pow(3)
  }

  pub fn cell_count(&self) -> usize {
    self.cells_per_axis().pow(3)
  }

  /// Side length of the sampled region.
  pub fn extent(&self) -> f32 {
    self.cells_per_axis() as f32 * self.cell_size
  }

  #[inline(always)]
  pub fn sample_index(&self, x: usize, y: usize, z: usize) -> usize {
    coord_to_index(x, y, z, self.samples_per_axis())
  }

  #[inline(always)]
  pub fn sample_coord(&self, index: usize) -> [usize; 3] {
    index_to_coord(index, self.samples_per_axis())
  }

  #[inline(always)]
  pub fn cell_index(&self, x: usize, y: usize, z: usize) -> usize {
    coord_to_index(x, y, z, self.cells_per_axis())
  }

  #[inline(always)]
  pub fn cell_coord(&self, index: usize) -> [usize; 3] {
    index_to_coord(index, self.cells_per_axis())
  }

  /// Group-local position of a grid point.
  #[inline(always)]
  pub fn sample_position(&self, x: usize, y: usize, z: usize) -> Vec3A {
    Vec3A::from(self.origin) + Vec3A::new(x as f32, y as f32, z as f32) * self.cell_size
  }

  /// Group-local bounds of a cell.
  pub fn cell_bounds(&self, cell: [usize; 3]) -> (Vec3A, Vec3A) {
    let min = self.sample_position(cell[0], cell[1], cell[2]);
    (min, min + Vec3A::splat(self.cell_size))
  }
}

// =============================================================================
// Settings
// =============================================================================

/// Vertex placement strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtractionMode {
  /// Mean of the edge crossings. Quads split along the shorter diagonal.
  #[default]
  SurfaceNets,

  /// Crossing mean pulled toward sharp features. Quads split along the
  /// diagonal whose endpoint normals agree best.
  DualContouring,
}

/// Where output normals come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalSource {
  /// Field gradient at the refined vertex position.
  #[default]
  Sampled,

  /// Angle-weighted face normals, recomputed on host readback.
  Geometry,
}

/// Where finished meshes go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
  /// Keep vertices and indices in device buffers; draw with the indirect
  /// record.
  #[default]
  DeviceResident,
  /// Copy arrays back to the host after every run.
  HostMesh,
}

/// How host readback completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadbackMode {
  /// The run and the copy finish before `advance` returns.
  #[default]
  Synchronous,
  /// The run and copy happen on a worker; a later `advance` commits them.
  Asynchronous,
}

/// Append buffer sizes. `None` derives a size from the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferCapacity {
  pub max_vertices: Option<u32>,
  pub max_triangles: Option<u32>,
  pub max_intermediates: Option<u32>,
}

/// Capacities after defaults have been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedCapacity {
  pub vertices: u32,
  pub triangles: u32,
  pub intermediates: u32,
}

impl BufferCapacity {
  /// Surfaces occupy O(N²) cells, so the default vertex budget is a multiple
  /// of one grid face, capped at the cell count. A closed surface has about
  /// two triangles per vertex; four leaves headroom for folds.
  pub fn resolve(&self, grid: &GridLayout) -> ResolvedCapacity {
    let cells = grid.cell_count().min(u32::MAX as usize / 8);
    let face = grid.cells_per_axis().pow(2);
    let default_vertices = cells.min(face.saturating_mul(12)).max(1) as u32;
    let vertices = self.max_vertices.unwrap_or(default_vertices);
    let triangles = self.max_triangles.unwrap_or(vertices.saturating_mul(4));
    let intermediates = self.max_intermediates.unwrap_or(vertices);
    ResolvedCapacity {
      vertices,
      triangles,
      intermediates,
    }
  }
}

/// Per-run meshing parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSettings {
  pub grid: GridLayout,
  pub extraction: ExtractionMode,

  /// Bisection steps on each crossing edge before averaging (0 = linear
  /// interpolation only).
  pub binary_search_iterations: u32,

  /// `p -= n·d` steps on the averaged position (0 = off).
  pub gradient_descent_iterations: u32,

  /// Endpoint normals with a cosine below this form a hard edge.
  pub hard_edge_cosine: f32,

  /// Group-local to world transform applied before evaluating the scene.
  pub group_to_world: Affine3A,

  /// Animation time fed to noise displacement.
  pub time: f32,

  /// Triplanar UV scale for host meshes.
  pub uv_scale: f32,

  pub normal_source: NormalSource,
  pub capacity: BufferCapacity,
}

impl Default for MeshSettings {
  fn default() -> Self {
    Self {
      grid: GridLayout::default(),
      extraction: ExtractionMode::default(),
      binary_search_iterations: 0,
      gradient_descent_iterations: 0,
      hard_edge_cosine: DEFAULT_HARD_EDGE_COSINE,
      group_to_world: Affine3A::IDENTITY,
      time: 0.0,
      uv_scale: 1.0,
      normal_source: NormalSource::default(),
      capacity: BufferCapacity::default(),
    }
  }
}

impl MeshSettings {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_grid(mut self, grid: GridLayout) -> Self {
    self.grid = grid;
    self
  }

  pub fn with_extraction(mut self, mode: ExtractionMode) -> Self {
    self.extraction = mode;
    self
  }

  pub fn with_binary_search_iterations(mut self, iterations: u32) -> Self {
    self.binary_search_iterations = iterations;
    self
  }

  pub fn with_gradient_descent_iterations(mut self, iterations: u32) -> Self {
    self.gradient_descent_iterations = iterations;
    self
  }

  pub fn with_hard_edge_cosine(mut self, cosine: f32) -> Self {
    self.hard_edge_cosine = cosine;
    self
  }

  pub fn with_group_to_world(mut self, transform: Affine3A) -> Self {
    self.group_to_world = transform;
    self
  }

  pub fn with_time(mut self, time: f32) -> Self {
    self.time = time;
    self
  }

  pub fn with_uv_scale(mut self, scale: f32) -> Self {
    self.uv_scale = scale;
    self
  }

  pub fn with_normal_source(mut self, source: NormalSource) -> Self {
    self.normal_source = source;
    self
  }

  pub fn with_capacity(mut self, capacity: BufferCapacity) -> Self {
    self.capacity = capacity;
    self
  }

  /// Reject settings no run can satisfy.
  pub fn validate(&self) -> Result<(), PipelineError> {
    let res = self.grid.resolution;
    if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&res) {
      return Err(PipelineError::InvalidSettings(format!(
        "resolution {} outside {}..={}",
        res, MIN_RESOLUTION, MAX_RESOLUTION
      )));
    }
    if !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0) {
      return Err(PipelineError::InvalidSettings(format!(
        "cell size must be positive, got {}",
        self.grid.cell_size
      )));
    }
    if !self.grid.origin.is_finite() {
      return Err(PipelineError::InvalidSettings("grid origin is not finite".into()));
    }
    if !self.hard_edge_cosine.is_finite() {
      return Err(PipelineError::InvalidSettings("hard edge cosine is not finite".into()));
    }
    if !self.group_to_world.is_finite() || self.group_to_world.matrix3.determinant().abs() < 1e-12
    {
      return Err(PipelineError::InvalidSettings(
        "group-to-world transform is singular".into(),
      ));
    }
    Ok(())
  }

  /// Changing these requires new buffers.
  pub fn buffer_shape(&self) -> (u32, ResolvedCapacity) {
    (self.grid.resolution, self.capacity.resolve(&self.grid))
  }
}

// =============================================================================
// Output vertex (device layout)
// =============================================================================

/// Final vertex record, laid out for direct upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct OutputVertex {
  pub position: [f32; 3],
  pub normal: [f32; 3],
  pub color: [f32; 4],
  pub emission: [f32; 3],
  pub metallic: f32,
  pub smoothness: f32,
  /// RGB subsurface color, subsurface power in `w`.
  pub subsurface: [f32; 4],
  pub splat_weights: [f32; 4],
}

impl Default for OutputVertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
      color: [1.0; 4],
      emission: [0.0; 3],
      metallic: 0.0,
      smoothness: 0.5,
      subsurface: [0.0; 4],
      splat_weights: [1.0, 0.0, 0.0, 0.0],
    }
  }
}

// =============================================================================
// Host mesh
// =============================================================================

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Inverted extents, ready for encapsulation.
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Mesh arrays copied back to the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostMesh {
  pub positions: Vec<[f32; 3]>,
  pub normals: Vec<[f32; 3]>,
  pub uvs: Vec<[f32; 2]>,
  pub colors: Vec<[f32; 4]>,
  pub indices: Vec<u32>,
  pub bounds: MinMaxAABB,
}

impl HostMesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all arrays, preserving capacity.
  pub fn clear(&mut self) {
    self.positions.clear();
    self.normals.clear();
    self.uvs.clear();
    self.colors.clear();
    self.indices.clear();
    self.bounds = MinMaxAABB::empty();
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Iterate triangles as index triples.
  pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
    self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
  }
}

/// Byte-level mesh data ready for FFI to engines.
#[derive(Clone)]
pub struct MeshData {
  /// `OutputVertex` records as raw bytes.
  pub vertices: Vec<u8>,

  /// `u32` indices as raw bytes.
  pub indices: Vec<u8>,

  pub vertex_count: u32,
  pub index_count: u32,
  pub bounds: MinMaxAABB,
}

impl MeshData {
  pub fn from_slices(vertices: &[OutputVertex], indices: &[u32], bounds: MinMaxAABB) -> Self {
    Self {
      vertices: bytemuck::cast_slice(vertices).to_vec(),
      indices: bytemuck::cast_slice(indices).to_vec(),
      vertex_count: vertices.len() as u32,
      index_count: indices.len() as u32,
      bounds,
    }
  }
}

impl std::fmt::Debug for MeshData {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MeshData")
      .field("vertex_count", &self.vertex_count)
      .field("index_count", &self.index_count)
      .field("bounds", &self.bounds)
      .finish()
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
