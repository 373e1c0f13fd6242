//! Blended SDF scene mesher.
//!
//! Loads a scene from TOML (or a built-in preset), drives a mesh instance at
//! a fixed cadence for a number of frames and reports what each frame did.
//! The last committed mesh can be written out as Wavefront OBJ.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sdf_mesher::{
	metrics, presets, AdvanceOutcome, Cadence, HostMesh, InstanceConfig, MeshInstance,
	MeshSettings, NullSink, OutputMode, ReadbackMode, RunStats, SceneAggregator, Stage,
};

use config::SceneConfig;

/// Meshes blended SDF scenes.
#[derive(Parser, Debug)]
#[command(name = "mesh_scene")]
#[command(about = "Meshes a blended SDF scene and reports pipeline stats")]
struct Args {
	/// Path to a scene TOML file.
	#[arg(short, long, conflicts_with = "preset")]
	scene: Option<PathBuf>,

	/// Built-in scene: sphere, blended_pair or carved_box.
	#[arg(short, long, default_value = "blended_pair")]
	preset: String,

	/// Number of driver ticks.
	#[arg(short, long, default_value_t = 1)]
	frames: u32,

	/// Minimum time between runs.
	#[arg(long, default_value_t = 16)]
	interval_ms: u64,

	/// Run on a worker and commit on a later tick.
	#[arg(long = "async")]
	asynchronous: bool,

	/// Keep output in device buffers instead of reading it back.
	#[arg(long)]
	device: bool,

	/// Override the grid resolution, keeping its extent.
	#[arg(short, long)]
	resolution: Option<u32>,

	/// Seconds of animation time per frame. Rebuilds every frame when set.
	#[arg(long)]
	animate: Option<f32>,

	/// Write the final mesh as OBJ.
	#[arg(short, long, conflicts_with = "device")]
	output: Option<PathBuf>,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let (mut aggregator, mut settings) = load_scene(&args)?;
	if let Some(resolution) = args.resolution {
		let extent = settings.grid.extent();
		settings.grid.resolution = resolution;
		settings.grid.cell_size = extent / resolution.saturating_sub(1).max(1) as f32;
	}

	let scene = aggregator.publish().context("Scene failed validation")?;
	println!(
		"Scene: {} primitives, resolution {}, cell size {:.4}",
		scene.primitive_count(),
		settings.grid.resolution,
		settings.grid.cell_size
	);

	let config = InstanceConfig::default()
		.with_output(if args.device {
			OutputMode::DeviceResident
		} else {
			OutputMode::HostMesh
		})
		.with_readback(if args.asynchronous {
			ReadbackMode::Asynchronous
		} else {
			ReadbackMode::Synchronous
		});
	let mut instance = MeshInstance::new(settings.clone(), config, Arc::new(NullSink))
		.context("Invalid mesh settings")?;

	let interval = Duration::from_millis(args.interval_ms);
	let mut cadence = Cadence::new(interval);
	let mut frame = 0;
	while frame < args.frames || instance.is_in_flight() {
		if let Some(dt) = args.animate {
			instance.set_settings(settings.clone().with_time(frame as f32 * dt))?;
		}
		let now = Instant::now();
		if let Some(outcome) = cadence.tick(&mut instance, &scene, now) {
			report(frame, &outcome);
			if let AdvanceOutcome::Failed(err) = outcome {
				anyhow::bail!("Run failed: {}", err);
			}
			frame += 1;
		}
		std::thread::sleep(interval / 4);
	}
	instance.drain();

	print_summary(&instance);

	if let Some(path) = &args.output {
		let mesh = instance
			.mesh()
			.context("No mesh to write, the scene produced no surface")?;
		write_obj(mesh, path)?;
		println!("Wrote {}", path.display());
	}

	Ok(())
}

fn load_scene(args: &Args) -> Result<(SceneAggregator, MeshSettings)> {
	match &args.scene {
		Some(path) => {
			println!("Loading scene from: {}", path.display());
			let config = SceneConfig::load(path)?;
			let settings = config.settings.apply(MeshSettings::default());
			Ok((config.to_aggregator(), settings))
		}
		None => {
			let aggregator = presets::by_name(&args.preset)
				.with_context(|| format!("Unknown preset: {}", args.preset))?;
			Ok((aggregator, MeshSettings::default()))
		}
	}
}

fn report(frame: u32, outcome: &AdvanceOutcome) {
	match outcome {
		AdvanceOutcome::Completed(stats) => print_stats(frame, stats),
		other => println!("  [frame {:>3}] {:?}", frame, other),
	}
}

fn print_stats(frame: u32, stats: &RunStats) {
	let c = &stats.counters;
	println!(
		"  [frame {:>3}] {} vertices ({} final), {} triangles, {} intermediates in {:.2}ms",
		frame,
		c.vertex_count,
		c.final_vertex_count,
		c.triangle_count,
		c.intermediate_count,
		stats.total_us as f64 / 1000.0
	);
	if stats.overflow.any() {
		println!("              capacity reached: {:?}", stats.overflow);
	}
	for stage in Stage::ALL {
		println!(
			"              {:<14} {:>8}us",
			stage.name(),
			stats.stage_us(stage)
		);
	}
}

fn print_summary(instance: &MeshInstance) {
	if !metrics::is_enabled() {
		return;
	}
	let m = instance.metrics();
	println!(
		"Runs: {} completed, {} failed, {} coalesced, average {:.2}ms",
		m.runs_completed,
		m.runs_failed,
		m.requests_coalesced,
		m.avg_run_us() / 1000.0
	);
	println!("Last mesh: {} bytes", m.last_mesh_bytes());
}

/// Positions, normals, UVs and faces. OBJ indices are 1-based.
fn write_obj(mesh: &HostMesh, path: &Path) -> Result<()> {
	let file = std::fs::File::create(path)
		.with_context(|| format!("Failed to create {}", path.display()))?;
	let mut out = BufWriter::new(file);

	for p in &mesh.positions {
		writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
	}
	for n in &mesh.normals {
		writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
	}
	for uv in &mesh.uvs {
		writeln!(out, "vt {} {}", uv[0], uv[1])?;
	}
	for tri in mesh.indices.chunks_exact(3) {
		let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
		writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
	}
	out.flush()?;
	Ok(())
}
