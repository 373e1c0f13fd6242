//! Scene description: ordered primitives, materials and the published buffer
//! set every run reads from.
//!
//! ```text
//! SceneAggregator (mutable, host side)
//!   │ publish() when dirty: validate, freeze, generation += 1
//!   ▼
//! SceneBuffers (Arc slices, read-only during a run)
//!   │ evaluate(world point)
//!   ▼
//! fold over primitives ──► FieldSample { distance, material }
//! ```

use std::sync::Arc;

use glam::{Affine3A, Vec3A};

use super::combine::{combine, CombineOp, FieldSample};
use super::material::{BlendedMaterial, Material};
use super::noise;
use super::shape::Shape;
use crate::constants::MIN_SMOOTHING;
use crate::error::PipelineError;

// =============================================================================
// Primitive
// =============================================================================

/// One shape placed in the world, with the operation that folds it in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive {
  pub shape: Shape,
  pub operation: CombineOp,
  /// Distance smoothing width `k`.
  pub smoothing: f32,
  /// Index into the scene's material list.
  pub material: u32,
  transform: Affine3A,
  world_to_local: Affine3A,
  /// Smallest axis scale of `transform`; keeps distances conservative.
  scale: f32,
}

impl Primitive {
  pub fn new(shape: Shape) -> Self {
    Self {
      shape,
      operation: CombineOp::Union,
      smoothing: MIN_SMOOTHING,
      material: 0,
      transform: Affine3A::IDENTITY,
      world_to_local: Affine3A::IDENTITY,
      scale: 1.0,
    }
  }

  /// Local-to-world placement.
  pub fn with_transform(mut self, transform: Affine3A) -> Self {
    self.transform = transform;
    self.world_to_local = transform.inverse();
    let m = transform.matrix3;
    self.scale = m.x_axis.length().min(m.y_axis.length()).min(m.z_axis.length());
    self
  }

  pub fn with_translation(self, translation: glam::Vec3) -> Self {
    self.with_transform(Affine3A::from_translation(translation))
  }

  pub fn with_operation(mut self, operation: CombineOp) -> Self {
    self.operation = operation;
    self
  }

  pub fn with_smoothing(mut self, k: f32) -> Self {
    self.smoothing = k;
    self
  }

  pub fn with_material(mut self, material: u32) -> Self {
    self.material = material;
    self
  }

  pub fn transform(&self) -> Affine3A {
    self.transform
  }

  /// Undisplaced world-space distance.
  #[inline]
  pub fn distance(&self, world: Vec3A) -> f32 {
    self.shape.distance(self.world_to_local.transform_point3a(world)) * self.scale
  }
}

// =============================================================================
// Published buffers
// =============================================================================

/// Immutable scene snapshot shared with running passes.
#[derive(Clone, Debug)]
pub struct SceneBuffers {
  primitives: Arc<[Primitive]>,
  materials: Arc<[BlendedMaterial]>,
  generation: u64,
}

impl Default for SceneBuffers {
  fn default() -> Self {
    Self {
      primitives: Arc::from(Vec::new()),
      materials: Arc::from(Vec::new()),
      generation: 0,
    }
  }
}

impl SceneBuffers {
  /// Validate and freeze a primitive/material list.
  pub fn build(
    primitives: &[Primitive],
    materials: &[Material],
    generation: u64,
  ) -> Result<Self, PipelineError> {
    for (i, prim) in primitives.iter().enumerate() {
      if prim.material as usize >= materials.len() {
        return Err(PipelineError::InvalidScene(format!(
          "primitive {} uses material {} but only {} exist",
          i,
          prim.material,
          materials.len()
        )));
      }
      if !prim.shape.is_valid() {
        return Err(PipelineError::InvalidScene(format!(
          "primitive {} has invalid shape {:?}",
          i, prim.shape
        )));
      }
      if !prim.smoothing.is_finite() || !prim.transform.is_finite() || !(prim.scale > 0.0) {
        return Err(PipelineError::InvalidScene(format!(
          "primitive {} has a non-finite transform or smoothing",
          i
        )));
      }
    }
    if let Some(i) = materials.iter().position(|m| !m.is_finite()) {
      return Err(PipelineError::InvalidScene(format!(
        "material {} has non-finite parameters",
        i
      )));
    }

    Ok(Self {
      primitives: primitives.iter().copied().collect(),
      materials: materials.iter().map(Material::resolve).collect(),
      generation,
    })
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn primitives(&self) -> &[Primitive] {
    &self.primitives
  }

  pub fn primitive_count(&self) -> usize {
    self.primitives.len()
  }

  pub fn is_empty(&self) -> bool {
    self.primitives.is_empty()
  }

  /// Distance and material at a world-space point.
  pub fn evaluate(&self, world: Vec3A, time: f32) -> FieldSample {
    let mut acc = FieldSample::empty();
    for prim in self.primitives.iter() {
      let material = self.materials[prim.material as usize];
      let distance = prim.distance(world) + noise::displacement(&material.noise, world, time);
      acc = combine(
        prim.operation,
        prim.smoothing,
        &FieldSample { distance, material },
        &acc,
      );
    }
    acc
  }

  /// Distance only; skips material blending.
  pub fn distance(&self, world: Vec3A, time: f32) -> f32 {
    let mut acc = f32::INFINITY;
    for prim in self.primitives.iter() {
      let noise_params = &self.materials[prim.material as usize].noise;
      let a = prim.distance(world) + noise::displacement(noise_params, world, time);
      acc = super::combine::blend_distance(prim.operation, a, acc, prim.smoothing);
    }
    acc
  }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Host-side editable scene. Publishes a new `SceneBuffers` generation only
/// when something changed.
#[derive(Debug, Default)]
pub struct SceneAggregator {
  primitives: Vec<Primitive>,
  materials: Vec<Material>,
  published: SceneBuffers,
  dirty: bool,
}

impl SceneAggregator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a material, returning its index.
  pub fn add_material(&mut self, material: Material) -> u32 {
    self.materials.push(material);
    self.dirty = true;
    (self.materials.len() - 1) as u32
  }

  /// Append a primitive to the fold, returning its position.
  pub fn add_primitive(&mut self, primitive: Primitive) -> usize {
    self.primitives.push(primitive);
    self.dirty = true;
    self.primitives.len() - 1
  }

  /// Replace a primitive in place. Returns false if out of range.
  pub fn set_primitive(&mut self, index: usize, primitive: Primitive) -> bool {
    match self.primitives.get_mut(index) {
      Some(slot) => {
        if *slot != primitive {
          *slot = primitive;
          self.dirty = true;
        }
        true
      }
      None => false,
    }
  }

  pub fn set_material(&mut self, index: usize, material: Material) -> bool {
    match self.materials.get_mut(index) {
      Some(slot) => {
        if *slot != material {
          *slot = material;
          self.dirty = true;
        }
        true
      }
      None => false,
    }
  }

  pub fn remove_primitive(&mut self, index: usize) -> Option<Primitive> {
    if index < self.primitives.len() {
      self.dirty = true;
      Some(self.primitives.remove(index))
    } else {
      None
    }
  }

  pub fn clear(&mut self) {
    self.dirty |= !self.primitives.is_empty() || !self.materials.is_empty();
    self.primitives.clear();
    self.materials.clear();
  }

  pub fn primitives(&self) -> &[Primitive] {
    &self.primitives
  }

  pub fn materials(&self) -> &[Material] {
    &self.materials
  }

  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Rebuild the published buffers if anything changed, and return them.
  ///
  /// On validation failure the previous generation stays published.
  pub fn publish(&mut self) -> Result<SceneBuffers, PipelineError> {
    if self.dirty {
      let next = self.published.generation + 1;
      self.published = SceneBuffers::build(&self.primitives, &self.materials, next)?;
      self.dirty = false;
      tracing::debug!(
        generation = next,
        primitives = self.primitives.len(),
        "published scene buffers"
      );
    }
    Ok(self.published.clone())
  }

  /// Last published buffers, without rebuilding.
  pub fn published(&self) -> &SceneBuffers {
    &self.published
  }
}

// =============================================================================
// Group-local view
// =============================================================================

/// The scene seen from the grid's group-local frame.
///
/// Distances are returned in local units so steps like `p -= n·d` move the
/// right amount under a scaled group transform.
#[derive(Clone, Copy)]
pub struct LocalField<'a> {
  scene: &'a SceneBuffers,
  group_to_world: Affine3A,
  inv_scale: f32,
  time: f32,
}

impl<'a> LocalField<'a> {
  pub fn new(scene: &'a SceneBuffers, group_to_world: Affine3A, time: f32) -> Self {
    let m = group_to_world.matrix3;
    let scale = m.x_axis.length().max(m.y_axis.length()).max(m.z_axis.length());
    Self {
      scene,
      group_to_world,
      inv_scale: if scale > 0.0 { scale.recip() } else { 1.0 },
      time,
    }
  }

  #[inline]
  pub fn to_world(&self, local: Vec3A) -> Vec3A {
    self.group_to_world.transform_point3a(local)
  }

  #[inline]
  pub fn distance(&self, local: Vec3A) -> f32 {
    self.scene.distance(self.to_world(local), self.time) * self.inv_scale
  }

  #[inline]
  pub fn sample(&self, local: Vec3A) -> FieldSample {
    let mut s = self.scene.evaluate(self.to_world(local), self.time);
    s.distance *= self.inv_scale;
    s
  }
}

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;
