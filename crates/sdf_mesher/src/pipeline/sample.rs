//! Stage 1: Sample
//!
//! Evaluates the blended scene at every grid point. One invocation per
//! sample, no cross-sample dependency.

use rayon::prelude::*;

use crate::sdf::{FieldSample, LocalField};
use crate::types::GridLayout;

#[tracing::instrument(skip_all, name = "pipeline::sample")]
pub fn run(samples: &mut [FieldSample], grid: &GridLayout, field: &LocalField<'_>) {
  samples.par_iter_mut().enumerate().for_each(|(i, out)| {
    let [x, y, z] = grid.sample_coord(i);
    *out = field.sample(grid.sample_position(x, y, z));
  });
}
