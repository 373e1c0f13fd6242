//! Signed distance scene: shapes, materials and the smooth CSG fold.

pub mod combine;
pub mod material;
pub mod noise;
pub mod scene;
pub mod shape;

pub use combine::{
  combine, fold, smooth_intersection, smooth_subtraction, smooth_union, CombineOp, FieldSample,
};
pub use material::{BlendedMaterial, Material, MaterialKind, NoiseParams};
pub use scene::{LocalField, Primitive, SceneAggregator, SceneBuffers};
pub use shape::Shape;
