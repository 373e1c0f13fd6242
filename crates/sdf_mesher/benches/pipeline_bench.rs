//! Full pipeline benchmarks.
//!
//! - **resolution**: blended pair at increasing grid resolutions
//! - **extraction**: surface nets against dual contouring on the carved box
//! - **refinement**: cost of bisection and gradient descent steps
//! - **stages**: sampling alone, to separate field cost from meshing cost

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sdf_mesher::pipeline::{execute, sample};
use sdf_mesher::sdf::{FieldSample, LocalField};
use sdf_mesher::{presets, ExtractionMode, GridLayout, MeshSettings, PipelineBuffers};

fn settings(resolution: u32) -> MeshSettings {
  MeshSettings::default().with_grid(GridLayout::centered(resolution, 2.0 / (resolution - 1) as f32))
}

fn bench_resolution(c: &mut Criterion) {
  let scene = presets::blended_pair().publish().unwrap();
  let mut group = c.benchmark_group("pipeline_resolution");

  for resolution in [16u32, 32, 64] {
    let settings = settings(resolution);
    let mut buffers = PipelineBuffers::new(&settings);
    group.throughput(Throughput::Elements(settings.grid.sample_count() as u64));
    group.bench_with_input(BenchmarkId::from_parameter(resolution), &settings, |b, s| {
      b.iter(|| black_box(execute(&mut buffers, &scene, s).unwrap()))
    });
  }

  group.finish();
}

fn bench_extraction(c: &mut Criterion) {
  let scene = presets::carved_box().publish().unwrap();
  let mut group = c.benchmark_group("pipeline_extraction");

  for (name, mode) in [
    ("surface_nets", ExtractionMode::SurfaceNets),
    ("dual_contouring", ExtractionMode::DualContouring),
  ] {
    let settings = settings(48).with_extraction(mode);
    let mut buffers = PipelineBuffers::new(&settings);
    group.bench_function(name, |b| {
      b.iter(|| black_box(execute(&mut buffers, &scene, &settings).unwrap()))
    });
  }

  group.finish();
}

fn bench_refinement(c: &mut Criterion) {
  let scene = presets::single_sphere(0.8).publish().unwrap();
  let mut group = c.benchmark_group("pipeline_refinement");

  for (name, bisect, descend) in [("none", 0, 0), ("bisect_4", 4, 0), ("descend_4", 0, 4), ("both", 4, 4)] {
    let settings = settings(48)
      .with_binary_search_iterations(bisect)
      .with_gradient_descent_iterations(descend);
    let mut buffers = PipelineBuffers::new(&settings);
    group.bench_function(name, |b| {
      b.iter(|| black_box(execute(&mut buffers, &scene, &settings).unwrap()))
    });
  }

  group.finish();
}

fn bench_sample_stage(c: &mut Criterion) {
  let scene = presets::carved_box().publish().unwrap();
  let settings = settings(64);
  let field = LocalField::new(&scene, settings.group_to_world, 0.0);
  let mut samples = vec![FieldSample::empty(); settings.grid.sample_count()];

  let mut group = c.benchmark_group("stage_sample");
  group.throughput(Throughput::Elements(samples.len() as u64));
  group.bench_function("carved_box_64", |b| {
    b.iter(|| {
      sample::run(&mut samples, &settings.grid, &field);
      black_box(samples[0].distance)
    })
  });
  group.finish();
}

criterion_group!(
  benches,
  bench_resolution,
  bench_extraction,
  bench_refinement,
  bench_sample_stage
);
criterion_main!(benches);
