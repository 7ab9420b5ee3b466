use traffic_core::{DeterministicRng, Interval};
use traffic_graph::{WaypointGraph, WaypointId};

/// Interval-gated, population-capped spawn scheduling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConfig {
    /// Simulated seconds between spawn attempts.
    pub period_seconds: f32,
    /// Maximum live population; waves while at the cap are skipped.
    pub limit: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            period_seconds: 3.0,
            limit: 10,
        }
    }
}

/// Picks a spawn waypoint for each wave.
///
/// The spawner only schedules: it hands back a waypoint id and the driver
/// seats a new agent there. A spawn point that has despawned by the time it
/// is drawn skips that wave rather than erroring.
#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnConfig,
    interval: Interval,
    spawn_points: Vec<WaypointId>,
}

impl Spawner {
    pub fn new(config: SpawnConfig, spawn_points: Vec<WaypointId>) -> Self {
        Self {
            config,
            interval: Interval::new(config.period_seconds),
            spawn_points,
        }
    }

    pub fn config(&self) -> SpawnConfig {
        self.config
    }

    pub fn spawn_points(&self) -> &[WaypointId] {
        &self.spawn_points
    }

    /// Advance simulated time; returns a uniformly random live spawn point
    /// when a wave is due and `population` is under the cap.
    pub fn tick(
        &mut self,
        dt_seconds: f32,
        population: usize,
        graph: &WaypointGraph,
        rng: &mut impl DeterministicRng,
    ) -> Option<WaypointId> {
        if !self.interval.fire(dt_seconds) {
            return None;
        }
        if population >= self.config.limit || self.spawn_points.is_empty() {
            return None;
        }
        let pick = self.spawn_points[rng.next_index(self.spawn_points.len())];
        graph.is_live(pick).then_some(pick)
    }
}
