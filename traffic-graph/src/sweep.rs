use std::collections::BTreeSet;

use traffic_core::Interval;

use crate::graph::WaypointGraph;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What one maintenance pass reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepStats {
    /// Dangling ids dropped from the roster.
    pub roster: usize,
    /// Dangling link targets dropped across all live nodes.
    pub links: usize,
    /// Dangling ids dropped from spatial index buckets.
    pub buckets: usize,
}

impl SweepStats {
    pub fn total(&self) -> usize {
        self.roster + self.links + self.buckets
    }
}

impl WaypointGraph {
    /// Single maintenance pass: drop dangling ids from the roster, then from
    /// every live node's link list (cache entries go with the links), then
    /// from the spatial index buckets.
    ///
    /// Running twice in a row with no despawns in between is a no-op.
    pub fn sweep(&mut self) -> SweepStats {
        let mut stats = SweepStats::default();
        let live: BTreeSet<_> = self.nodes.keys().copied().collect();

        let before = self.roster.len();
        self.roster.retain(|id| live.contains(id));
        stats.roster = before - self.roster.len();

        for node in self.nodes.values_mut() {
            stats.links += node.retain_links(|target| live.contains(&target));
        }

        self.buckets.retain(|_, bucket| {
            let before = bucket.len();
            bucket.retain(|id| live.contains(id));
            stats.buckets += before - bucket.len();
            !bucket.is_empty()
        });

        stats
    }
}

/// Interval wrapper driving [`WaypointGraph::sweep`] at a low frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweeper {
    interval: Interval,
}

impl Sweeper {
    pub const DEFAULT_PERIOD_SECONDS: f32 = 5.0;

    pub fn new(period_seconds: f32) -> Self {
        Self {
            interval: Interval::new(period_seconds),
        }
    }

    /// Advance simulated time; sweeps when the period elapses.
    pub fn tick(&mut self, dt_seconds: f32, graph: &mut WaypointGraph) -> Option<SweepStats> {
        if self.interval.fire(dt_seconds) {
            Some(graph.sweep())
        } else {
            None
        }
    }
}

impl Default for Sweeper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD_SECONDS)
    }
}
