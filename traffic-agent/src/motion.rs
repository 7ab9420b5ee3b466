use traffic_graph::Vec3;

/// Host-provided motion and pathing service for one agent body.
///
/// This is the boundary to the engine's navigation backend (a navmesh agent,
/// a character controller, a physics body). The controller only ever calls
/// [`set_destination`](Self::set_destination) and reads state; it never
/// computes paths itself. Implementations must keep `position` current every
/// simulation step.
pub trait MotionAgent {
    /// Current world-space position of the body.
    fn position(&self) -> Vec3;

    /// Ask the backend to start moving toward `target`.
    fn set_destination(&mut self, target: Vec3);

    /// Whether the backend currently holds a committed path.
    fn has_path(&self) -> bool;

    /// Whether a requested path is still being computed.
    fn path_pending(&self) -> bool;

    /// Distance left along the committed path, or infinity when unknown.
    fn remaining_distance(&self) -> f32;

    /// Backend's own arrival slack; bodies stop within this of the target.
    fn stopping_distance(&self) -> f32;

    fn velocity(&self) -> Vec3;

    /// Whether the body has come to rest at its destination.
    fn arrived(&self) -> bool {
        self.has_path()
            && !self.path_pending()
            && self.remaining_distance() <= self.stopping_distance()
    }
}
