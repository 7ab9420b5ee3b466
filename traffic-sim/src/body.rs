use traffic_agent::MotionAgent;
use traffic_graph::Vec3;

/// Straight-line constant-speed motion backend.
///
/// Stands in for an engine navigation agent: a destination request "commits"
/// a path immediately (pending for exactly one step), and the body then
/// integrates toward the destination at `speed`, stopping within
/// `stopping_distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    position: Vec3,
    destination: Option<Vec3>,
    pending: bool,
    speed: f32,
    stopping_distance: f32,
    velocity: Vec3,
}

impl KinematicBody {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            pending: false,
            speed: speed.max(0.0),
            stopping_distance: 0.5,
            velocity: Vec3::ZERO,
        }
    }

    pub fn with_stopping_distance(mut self, stopping_distance: f32) -> Self {
        self.stopping_distance = stopping_distance.max(0.0);
        self
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Integrate one step toward the destination, if any.
    pub fn step(&mut self, dt_seconds: f32) {
        self.pending = false;

        let Some(destination) = self.destination else {
            self.velocity = Vec3::ZERO;
            return;
        };

        let to_target = destination - self.position;
        let dist = to_target.length();
        if dist <= self.stopping_distance.max(f32::EPSILON) {
            self.velocity = Vec3::ZERO;
            return;
        }

        let dt = dt_seconds.max(0.0);
        let step_len = (self.speed * dt).min(dist);
        let dir = to_target / dist;
        self.position = self.position + dir * step_len;
        self.velocity = if dt > 0.0 {
            dir * (step_len / dt)
        } else {
            Vec3::ZERO
        };
    }
}

impl MotionAgent for KinematicBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_destination(&mut self, target: Vec3) {
        self.destination = Some(target);
        self.pending = true;
    }

    fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    fn path_pending(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(f32::INFINITY, |d| self.position.distance(d))
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}
