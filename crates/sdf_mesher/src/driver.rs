//! Fixed-interval driver for mesh instances.
//!
//! Hosts without their own frame loop call `Cadence::tick` as often as they
//! like; the instance is advanced at most once per interval, except that an
//! in-flight run is always polled so it commits as soon as it is ready.

use web_time::{Duration, Instant};

use crate::instance::{AdvanceOutcome, MeshInstance};
use crate::sdf::SceneBuffers;

#[derive(Clone, Copy, Debug)]
pub struct Cadence {
  interval: Duration,
  last: Option<Instant>,
}

impl Cadence {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      last: None,
    }
  }

  pub fn interval(&self) -> Duration {
    self.interval
  }

  /// True when an interval has passed since the last advance at `now`.
  pub fn is_due(&self, now: Instant) -> bool {
    match self.last {
      None => true,
      Some(last) => now.saturating_duration_since(last) >= self.interval,
    }
  }

  /// Advance `instance` if due. Returns `None` when skipped.
  pub fn tick(
    &mut self,
    instance: &mut MeshInstance,
    scene: &SceneBuffers,
    now: Instant,
  ) -> Option<AdvanceOutcome> {
    if !(instance.is_in_flight() || self.is_due(now)) {
      return None;
    }
    let outcome = instance.advance(scene);
    if !matches!(outcome, AdvanceOutcome::InFlight | AdvanceOutcome::Coalesced) {
      self.last = Some(now);
    }
    Some(outcome)
  }
}

impl Default for Cadence {
  fn default() -> Self {
    Self::new(Duration::from_millis(16))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::instance::InstanceConfig;
  use crate::presentation::NullSink;
  use crate::sdf::{Material, Primitive, Shape};
  use crate::types::{GridLayout, MeshSettings, OutputMode};

  fn setup() -> (MeshInstance, SceneBuffers) {
    let settings = MeshSettings::default().with_grid(GridLayout::centered(10, 0.2));
    let config = InstanceConfig::default()
      .with_output(OutputMode::HostMesh)
      .with_auto_update(true);
    let instance = MeshInstance::new(settings, config, Arc::new(NullSink)).unwrap();
    let scene = SceneBuffers::build(
      &[Primitive::new(Shape::sphere(0.6))],
      &[Material::default()],
      1,
    )
    .unwrap();
    (instance, scene)
  }

  #[test]
  fn test_tick_respects_interval() {
    let (mut instance, scene) = setup();
    let mut cadence = Cadence::new(Duration::from_millis(100));
    let t0 = Instant::now();

    assert!(matches!(
      cadence.tick(&mut instance, &scene, t0),
      Some(AdvanceOutcome::Completed(_))
    ));
    assert!(cadence.tick(&mut instance, &scene, t0 + Duration::from_millis(50)).is_none());
    assert!(cadence.tick(&mut instance, &scene, t0 + Duration::from_millis(100)).is_some());
  }

  #[test]
  fn test_first_tick_is_always_due() {
    let cadence = Cadence::default();
    assert!(cadence.is_due(Instant::now()));
    assert_eq!(cadence.interval(), Duration::from_millis(16));
  }
}
