use std::collections::VecDeque;

use traffic_core::{DeterministicRng, Interval};
use traffic_graph::{Vec3, WaypointGraph, WaypointId};

use crate::motion::MotionAgent;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavConfig {
    /// Distance at which the current waypoint counts as reached.
    pub arrival_distance: f32,
    /// Simulated seconds between navigation re-evaluations. Decoupled from
    /// the render/step rate for cost control.
    pub reeval_period_seconds: f32,
    /// Lookahead queue depth: how many upcoming waypoints to pre-pick.
    pub lookahead: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            arrival_distance: 3.0,
            reeval_period_seconds: 0.3,
            lookahead: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NavState {
    /// No waypoint acquired yet (or none reachable); the controller idles
    /// and retries acquisition every gated tick.
    Uninitialized,
    /// Steering toward `current` with a pre-picked lookahead queue.
    Tracking,
    /// Path lost (empty queue, dangling target, or off-path); the next
    /// gated tick re-runs acquisition.
    Recovering,
}

/// Progress heuristic: the agent is judged off-path when the distance still
/// to cover is more than twice the distance put behind it since the target
/// was set. An agent that has barely moved relative to what remains is
/// flagged; this is not exact path-deviation detection.
pub fn off_path(distance_to_waypoint: f32, distance_moved: f32) -> bool {
    distance_to_waypoint > distance_moved * 2.0
}

/// Drives one agent along the waypoint graph.
///
/// Every failure mode degrades: no node found idles, an empty queue or a
/// dangling reference recovers via a fresh nearest-node query. Nothing here
/// returns an error.
#[derive(Debug, Clone)]
pub struct NavController {
    config: NavConfig,
    interval: Interval,
    state: NavState,
    current: Option<WaypointId>,
    queue: VecDeque<WaypointId>,
    last_target_position: Vec3,
}

impl NavController {
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            // Due immediately so a freshly spawned agent acquires a waypoint
            // on its first tick instead of one period later.
            interval: Interval::due(config.reeval_period_seconds),
            state: NavState::Uninitialized,
            current: None,
            queue: VecDeque::with_capacity(config.lookahead),
            last_target_position: Vec3::ZERO,
        }
    }

    pub fn config(&self) -> NavConfig {
        self.config
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn current_waypoint(&self) -> Option<WaypointId> {
        self.current
    }

    pub fn lookahead_queue(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.queue.iter().copied()
    }

    /// Advance simulated time and, when the re-evaluation period elapses,
    /// run one navigation step against the graph and motion backend.
    pub fn tick(
        &mut self,
        dt_seconds: f32,
        graph: &WaypointGraph,
        motion: &mut impl MotionAgent,
        rng: &mut impl DeterministicRng,
    ) {
        if !self.interval.fire(dt_seconds) {
            return;
        }
        match self.state {
            NavState::Uninitialized | NavState::Recovering => self.acquire(graph, motion, rng),
            NavState::Tracking => self.track(graph, motion, rng),
        }
    }

    /// Forcibly seat the controller on `waypoint`, bypassing the nearest
    /// search: refills the queue and issues a move command. Used for
    /// spawn-time placement.
    pub fn set_current_waypoint(
        &mut self,
        waypoint: WaypointId,
        graph: &WaypointGraph,
        motion: &mut impl MotionAgent,
        rng: &mut impl DeterministicRng,
    ) {
        self.seat(waypoint, graph, motion, rng);
    }

    /// Fresh nearest-node query and queue fill. On a miss the controller
    /// goes idle and retries on the next gated tick.
    fn acquire(
        &mut self,
        graph: &WaypointGraph,
        motion: &mut impl MotionAgent,
        rng: &mut impl DeterministicRng,
    ) {
        match graph.find_nearest(motion.position()) {
            Some(id) => self.seat(id, graph, motion, rng),
            None => self.idle(),
        }
    }

    fn seat(
        &mut self,
        waypoint: WaypointId,
        graph: &WaypointGraph,
        motion: &mut impl MotionAgent,
        rng: &mut impl DeterministicRng,
    ) {
        let Some(target) = graph.position(waypoint) else {
            self.idle();
            return;
        };
        self.current = Some(waypoint);
        self.refill_queue(waypoint, graph, rng);
        motion.set_destination(target);
        self.last_target_position = target;
        self.state = NavState::Tracking;
    }

    fn idle(&mut self) {
        self.state = NavState::Uninitialized;
        self.current = None;
        self.queue.clear();
    }

    /// Pre-pick up to `lookahead` upcoming waypoints by walking random
    /// links from `from`. Read-only on the graph; stops at a dead end.
    fn refill_queue(
        &mut self,
        from: WaypointId,
        graph: &WaypointGraph,
        rng: &mut impl DeterministicRng,
    ) {
        self.queue.clear();
        let mut cursor = from;
        for _ in 0..self.config.lookahead {
            let Some(next) = graph.pick_random_next(cursor, rng) else {
                break;
            };
            self.queue.push_back(next);
            cursor = next;
        }
    }

    fn track(
        &mut self,
        graph: &WaypointGraph,
        motion: &mut impl MotionAgent,
        rng: &mut impl DeterministicRng,
    ) {
        let Some(target) = self.current.and_then(|id| graph.position(id)) else {
            // Current waypoint despawned mid-flight.
            self.state = NavState::Recovering;
            return;
        };

        if motion.position().distance(target) < self.config.arrival_distance {
            self.advance(graph, motion, rng);
            if self.state != NavState::Tracking {
                return;
            }
        }

        let lost = match self.current.and_then(|id| graph.position(id)) {
            Some(target) => self.queue.is_empty() || self.is_off_path(motion, target),
            None => true,
        };
        if lost {
            self.state = NavState::Recovering;
        }
    }

    /// Pop the next queued waypoint, steer toward it, and opportunistically
    /// extend the queue by one. An exhausted queue or a dangling entry
    /// flips to recovery.
    fn advance(
        &mut self,
        graph: &WaypointGraph,
        motion: &mut impl MotionAgent,
        rng: &mut impl DeterministicRng,
    ) {
        let Some(next) = self.queue.pop_front() else {
            self.state = NavState::Recovering;
            return;
        };
        let Some(target) = graph.position(next) else {
            self.state = NavState::Recovering;
            return;
        };

        self.current = Some(next);
        motion.set_destination(target);
        self.last_target_position = target;

        if let Some(extend) = graph.pick_random_next(next, rng) {
            self.queue.push_back(extend);
        }
    }

    /// Only judged while the backend holds a committed, fully computed path.
    fn is_off_path(&self, motion: &impl MotionAgent, target: Vec3) -> bool {
        if !motion.has_path() || motion.path_pending() {
            return false;
        }
        let position = motion.position();
        off_path(
            position.distance(target),
            position.distance(self.last_target_position),
        )
    }
}

impl Default for NavController {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}
