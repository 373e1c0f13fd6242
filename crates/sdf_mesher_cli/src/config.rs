//! Scene file parsing.
//!
//! A scene file is TOML with an optional `[settings]` table, a list of
//! `[[materials]]` and a list of `[[primitives]]`. Primitives refer to
//! materials by position in the list.

use anyhow::{Context, Result};
use glam::{Affine3A, EulerRot, Quat, Vec3, Vec4};
use serde::Deserialize;
use std::path::Path;

use sdf_mesher::{
	CombineOp, ExtractionMode, GridLayout, Material, MeshSettings, NoiseParams, NormalSource,
	Primitive, SceneAggregator, Shape,
};

/// Root of a scene file.
#[derive(Debug, Deserialize)]
pub struct SceneConfig {
	#[serde(default)]
	pub settings: SettingsConfig,
	#[serde(default)]
	pub materials: Vec<MaterialConfig>,
	pub primitives: Vec<PrimitiveConfig>,
}

/// Meshing settings. Anything left out keeps the library default.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsConfig {
	pub resolution: Option<u32>,
	pub cell_size: Option<f32>,
	/// Grid origin; the grid is centered on zero when absent.
	pub origin: Option<[f32; 3]>,
	pub extraction: Option<ExtractionConfig>,
	pub binary_search_iterations: Option<u32>,
	pub gradient_descent_iterations: Option<u32>,
	pub hard_edge_cosine: Option<f32>,
	pub uv_scale: Option<f32>,
	pub geometry_normals: Option<bool>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionConfig {
	SurfaceNets,
	DualContouring,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationConfig {
	#[default]
	Union,
	Subtraction,
	Intersection,
}

/// One surface material. Plain color unless `texture_layer` or `layers` is
/// set; `color` tints either.
#[derive(Debug, Deserialize)]
pub struct MaterialConfig {
	#[serde(default = "default_color")]
	pub color: [f32; 4],
	/// Texture array layer, 0 to 3.
	pub texture_layer: Option<u8>,
	/// Explicit splat weights.
	pub layers: Option<[f32; 4]>,
	#[serde(default)]
	pub emission: [f32; 3],
	#[serde(default)]
	pub metallic: f32,
	#[serde(default = "default_smoothness")]
	pub smoothness: f32,
	#[serde(default)]
	pub subsurface_color: [f32; 3],
	#[serde(default)]
	pub subsurface_power: f32,
	/// Width of the material transition.
	#[serde(default = "default_smoothing")]
	pub smoothing: f32,
	pub noise: Option<NoiseConfig>,
}

#[derive(Debug, Deserialize)]
pub struct NoiseConfig {
	#[serde(default)]
	pub seed: u32,
	#[serde(default = "default_octaves")]
	pub octaves: u32,
	#[serde(default = "default_frequency")]
	pub frequency: f32,
	pub amplitude: f32,
	#[serde(default)]
	pub time_scale: f32,
}

/// Shape parameters, tagged by `shape = "..."`.
#[derive(Debug, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeConfig {
	Sphere { radius: f32 },
	Box { half_extents: [f32; 3] },
	RoundedBox { half_extents: [f32; 3], radius: f32 },
	Torus { major_radius: f32, minor_radius: f32 },
	Capsule { half_height: f32, radius: f32 },
	Cylinder { half_height: f32, radius: f32 },
	Plane { normal: [f32; 3], offset: f32 },
}

/// One primitive in evaluation order.
#[derive(Debug, Deserialize)]
pub struct PrimitiveConfig {
	#[serde(flatten)]
	pub shape: ShapeConfig,
	#[serde(default)]
	pub translation: [f32; 3],
	/// XYZ euler angles in degrees.
	#[serde(default)]
	pub rotation: [f32; 3],
	#[serde(default = "default_scale")]
	pub scale: f32,
	#[serde(default)]
	pub operation: OperationConfig,
	/// Distance smoothing width.
	#[serde(default)]
	pub smoothing: f32,
	#[serde(default)]
	pub material: u32,
}

fn default_color() -> [f32; 4] {
	[1.0, 1.0, 1.0, 1.0]
}

fn default_smoothness() -> f32 {
	0.5
}

fn default_smoothing() -> f32 {
	0.1
}

fn default_octaves() -> u32 {
	3
}

fn default_frequency() -> f32 {
	1.0
}

fn default_scale() -> f32 {
	1.0
}

impl SceneConfig {
	/// Load a scene from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read scene file: {}", path.display()))?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> Result<Self> {
		let config: SceneConfig =
			toml::from_str(content).with_context(|| "Failed to parse scene TOML")?;

		if config.primitives.is_empty() {
			anyhow::bail!("Scene must have at least one primitive");
		}
		for (i, material) in config.materials.iter().enumerate() {
			if material.texture_layer.is_some() && material.layers.is_some() {
				anyhow::bail!("Material {} sets both texture_layer and layers", i);
			}
			if let Some(layer) = material.texture_layer.filter(|&l| l > 3) {
				anyhow::bail!("Material {} uses texture layer {}, max is 3", i, layer);
			}
		}

		let material_count = config.materials.len().max(1) as u32;
		for (i, primitive) in config.primitives.iter().enumerate() {
			if primitive.material >= material_count {
				anyhow::bail!(
					"Primitive {} uses material {}, only {} defined",
					i,
					primitive.material,
					material_count
				);
			}
		}

		Ok(config)
	}

	/// Build the scene aggregator. A scene without materials gets one default.
	pub fn to_aggregator(&self) -> SceneAggregator {
		let mut scene = SceneAggregator::new();
		if self.materials.is_empty() {
			scene.add_material(Material::default());
		}
		for material in &self.materials {
			scene.add_material(material.to_material());
		}
		for primitive in &self.primitives {
			scene.add_primitive(primitive.to_primitive());
		}
		scene
	}
}

impl SettingsConfig {
	/// Apply onto `base`. A resolution override keeps the grid's world extent
	/// unless a cell size is also given.
	pub fn apply(&self, base: MeshSettings) -> MeshSettings {
		let mut settings = base;

		let resolution = self.resolution.unwrap_or(settings.grid.resolution);
		let cell_size = self.cell_size.unwrap_or_else(|| {
			settings.grid.extent() / resolution.saturating_sub(1).max(1) as f32
		});
		settings.grid = match self.origin {
			Some(origin) => GridLayout::new(resolution, cell_size, Vec3::from(origin)),
			None => GridLayout::centered(resolution, cell_size),
		};

		if let Some(extraction) = self.extraction {
			settings = settings.with_extraction(match extraction {
				ExtractionConfig::SurfaceNets => ExtractionMode::SurfaceNets,
				ExtractionConfig::DualContouring => ExtractionMode::DualContouring,
			});
		}
		if let Some(n) = self.binary_search_iterations {
			settings = settings.with_binary_search_iterations(n);
		}
		if let Some(n) = self.gradient_descent_iterations {
			settings = settings.with_gradient_descent_iterations(n);
		}
		if let Some(cosine) = self.hard_edge_cosine {
			settings = settings.with_hard_edge_cosine(cosine);
		}
		if let Some(scale) = self.uv_scale {
			settings = settings.with_uv_scale(scale);
		}
		if self.geometry_normals == Some(true) {
			settings = settings.with_normal_source(NormalSource::Geometry);
		}
		settings
	}
}

impl MaterialConfig {
	fn to_material(&self) -> Material {
		let mut material = match (self.texture_layer, self.layers) {
			(Some(layer), _) => Material::texture(layer),
			(None, Some(weights)) => Material::layered(Vec4::from(weights)),
			(None, None) => Material::color(Vec4::from(self.color)),
		};
		material.base_color = Vec4::from(self.color);
		material = material
			.with_emission(Vec3::from(self.emission))
			.with_metallic(self.metallic)
			.with_smoothness(self.smoothness)
			.with_subsurface(Vec3::from(self.subsurface_color), self.subsurface_power)
			.with_smoothing(self.smoothing);
		if let Some(noise) = &self.noise {
			material = material.with_noise(NoiseParams {
				seed: noise.seed,
				octaves: noise.octaves,
				frequency: noise.frequency,
				amplitude: noise.amplitude,
				time_scale: noise.time_scale,
			});
		}
		material
	}
}

impl PrimitiveConfig {
	fn to_primitive(&self) -> Primitive {
		let shape = match self.shape {
			ShapeConfig::Sphere { radius } => Shape::Sphere { radius },
			ShapeConfig::Box { half_extents } => Shape::Box {
				half_extents: Vec3::from(half_extents),
			},
			ShapeConfig::RoundedBox {
				half_extents,
				radius,
			} => Shape::RoundedBox {
				half_extents: Vec3::from(half_extents),
				radius,
			},
			ShapeConfig::Torus {
				major_radius,
				minor_radius,
			} => Shape::Torus {
				major_radius,
				minor_radius,
			},
			ShapeConfig::Capsule {
				half_height,
				radius,
			} => Shape::Capsule {
				half_height,
				radius,
			},
			ShapeConfig::Cylinder {
				half_height,
				radius,
			} => Shape::Cylinder {
				half_height,
				radius,
			},
			ShapeConfig::Plane { normal, offset } => Shape::Plane {
				normal: Vec3::from(normal),
				offset,
			},
		};
		let [rx, ry, rz] = self.rotation.map(f32::to_radians);
		let transform = Affine3A::from_scale_rotation_translation(
			Vec3::splat(self.scale),
			Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
			Vec3::from(self.translation),
		);
		let operation = match self.operation {
			OperationConfig::Union => CombineOp::Union,
			OperationConfig::Subtraction => CombineOp::Subtraction,
			OperationConfig::Intersection => CombineOp::Intersection,
		};

		Primitive::new(shape)
			.with_transform(transform)
			.with_operation(operation)
			.with_smoothing(self.smoothing)
			.with_material(self.material)
	}
}
