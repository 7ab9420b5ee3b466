use std::collections::BTreeMap;

use thiserror::Error;
use traffic_core::DeterministicRng;

use crate::math::Vec3;
use crate::waypoint::{Waypoint, WaypointId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphConfig {
    /// Edge length of one spatial index cell, in world units.
    ///
    /// Tune to scene scale; there is no dynamic resizing. Nearest-node
    /// queries only examine the 3x3x3 block of cells around the query, so
    /// nodes further than one cell away in any axis are never candidates.
    pub cell_size: f32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { cell_size: 10.0 }
    }
}

/// Authoring-time topology errors.
///
/// Runtime query paths never fail; only explicit wiring requests against an
/// id that no longer resolves are reported, since silently dropping them
/// would hide a scene-authoring bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown waypoint {0:?}")]
    UnknownWaypoint(WaypointId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Cell(i32, i32, i32);

pub(crate) fn cell_for(p: Vec3, cell_size: f32) -> Cell {
    let cs = cell_size.max(1e-6);
    Cell(
        (p.x / cs).floor() as i32,
        (p.y / cs).floor() as i32,
        (p.z / cs).floor() as i32,
    )
}

/// Registry of live waypoint nodes plus a derived uniform-grid index.
///
/// The graph owns node storage; the host "destroys" a node with
/// [`despawn`](Self::despawn), which deliberately leaves the roster, buckets,
/// and other nodes' link lists untouched. Queries skip dangling ids on
/// encounter and the periodic [`sweep`](Self::sweep) reclaims them.
#[derive(Debug, Clone, Default)]
pub struct WaypointGraph {
    pub(crate) config: GraphConfig,
    pub(crate) nodes: BTreeMap<WaypointId, Waypoint>,
    pub(crate) roster: Vec<WaypointId>,
    pub(crate) buckets: BTreeMap<Cell, Vec<WaypointId>>,
    next_id: u32,
}

impl WaypointGraph {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> GraphConfig {
        self.config
    }

    /// Number of registered waypoints (dangling roster entries included
    /// until the next sweep).
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Whether `id` still resolves to a stored node.
    pub fn is_live(&self, id: WaypointId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn is_registered(&self, id: WaypointId) -> bool {
        self.roster.contains(&id)
    }

    pub fn waypoint(&self, id: WaypointId) -> Option<&Waypoint> {
        self.nodes.get(&id)
    }

    pub fn waypoint_mut(&mut self, id: WaypointId) -> Option<&mut Waypoint> {
        self.nodes.get_mut(&id)
    }

    pub fn position(&self, id: WaypointId) -> Option<Vec3> {
        self.nodes.get(&id).map(|n| n.position())
    }

    /// Move a node. The spatial index is not updated; callers that relocate
    /// nodes across cell boundaries must re-register or rebuild the index.
    pub fn set_position(&mut self, id: WaypointId, position: Vec3) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn registered(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.roster.iter().copied()
    }

    /// Create a node and register it.
    pub fn insert(&mut self, position: Vec3) -> WaypointId {
        let id = WaypointId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Waypoint::new(position));
        self.register(id);
        id
    }

    /// Add a stored node to the roster and its grid bucket.
    ///
    /// Idempotent; returns true only when the node was newly registered.
    pub fn register(&mut self, id: WaypointId) -> bool {
        let Some(pos) = self.nodes.get(&id).map(|n| n.position()) else {
            return false;
        };
        if self.roster.contains(&id) {
            return false;
        }
        self.roster.push(id);
        let cell = cell_for(pos, self.config.cell_size);
        self.buckets.entry(cell).or_default().push(id);
        true
    }

    /// Remove a node from the roster and its grid bucket; no-op if absent.
    ///
    /// The bucket is recomputed from the node's *current* position. If the
    /// node moved since registration without an index update, this targets
    /// the wrong bucket and the stale entry survives until the next sweep.
    pub fn unregister(&mut self, id: WaypointId) -> bool {
        let before = self.roster.len();
        self.roster.retain(|&r| r != id);
        if self.roster.len() == before {
            return false;
        }
        if let Some(pos) = self.nodes.get(&id).map(|n| n.position()) {
            let cell = cell_for(pos, self.config.cell_size);
            if let Some(bucket) = self.buckets.get_mut(&cell) {
                bucket.retain(|&b| b != id);
                if bucket.is_empty() {
                    self.buckets.remove(&cell);
                }
            }
        }
        true
    }

    /// Drop a node's storage, modeling external destruction.
    ///
    /// Roster, buckets, and other nodes' link lists keep the now-dangling id
    /// until the next sweep; queries skip it on encounter.
    pub fn despawn(&mut self, id: WaypointId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    /// Re-bucket every roster node. Called once after scene load; O(n).
    pub fn rebuild_index(&mut self) {
        let Self {
            config,
            nodes,
            roster,
            buckets,
            ..
        } = self;
        buckets.clear();
        for &id in roster.iter() {
            if let Some(node) = nodes.get(&id) {
                let cell = cell_for(node.position(), config.cell_size);
                buckets.entry(cell).or_default().push(id);
            }
        }
    }

    /// Nearest live node to `query` within the 3x3x3 cell block around the
    /// query's cell.
    ///
    /// A deliberate locality approximation, not a global nearest-neighbor
    /// search: nodes outside the block are never considered, and an empty
    /// block yields `None` even when the graph is non-empty. Ties break to
    /// the first candidate in fixed x,y,z offset order then bucket order.
    pub fn find_nearest(&self, query: Vec3) -> Option<WaypointId> {
        let Cell(cx, cy, cz) = cell_for(query, self.config.cell_size);
        let mut best: Option<(WaypointId, f32)> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = Cell(cx + dx, cy + dy, cz + dz);
                    let Some(bucket) = self.buckets.get(&cell) else {
                        continue;
                    };
                    for &id in bucket.iter() {
                        let Some(node) = self.nodes.get(&id) else {
                            continue;
                        };
                        let dist2 = query.distance_squared(node.position());
                        if best.map_or(true, |(_, b)| dist2 < b) {
                            best = Some((id, dist2));
                        }
                    }
                }
            }
        }

        best.map(|(id, _)| id)
    }

    /// Wire a directed link `from -> to`, caching the Euclidean distance.
    ///
    /// Returns false when the link already exists.
    pub fn link(&mut self, from: WaypointId, to: WaypointId) -> Result<bool, GraphError> {
        let from_pos = self
            .position(from)
            .ok_or(GraphError::UnknownWaypoint(from))?;
        let to_pos = self.position(to).ok_or(GraphError::UnknownWaypoint(to))?;
        let distance = from_pos.distance(to_pos);
        let node = self
            .nodes
            .get_mut(&from)
            .ok_or(GraphError::UnknownWaypoint(from))?;
        Ok(node.add_link(to, distance))
    }

    /// Remove a directed link; `to` need not be live.
    pub fn unlink(&mut self, from: WaypointId, to: WaypointId) -> Result<bool, GraphError> {
        let node = self
            .nodes
            .get_mut(&from)
            .ok_or(GraphError::UnknownWaypoint(from))?;
        Ok(node.remove_link(to))
    }

    pub fn clear_links(&mut self, from: WaypointId) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&from)
            .ok_or(GraphError::UnknownWaypoint(from))?;
        node.clear_links();
        Ok(())
    }

    /// Link each id to its successor: A->B, B->C, ...
    pub fn link_chain(&mut self, ids: &[WaypointId]) -> Result<(), GraphError> {
        for pair in ids.windows(2) {
            self.link(pair[0], pair[1])?;
        }
        Ok(())
    }

    /// Link every id after the first back to the first.
    pub fn link_all_to_first(&mut self, ids: &[WaypointId]) -> Result<(), GraphError> {
        let Some((&first, rest)) = ids.split_first() else {
            return Ok(());
        };
        for &id in rest {
            self.link(first, id)?;
        }
        Ok(())
    }

    /// Create `count` nodes stepped out from `from`, auto-linking each to
    /// the next. Returns the created ids in chain order.
    pub fn insert_chain(
        &mut self,
        from: WaypointId,
        count: usize,
        step: Vec3,
    ) -> Result<Vec<WaypointId>, GraphError> {
        let mut cursor = from;
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let base = self
                .position(cursor)
                .ok_or(GraphError::UnknownWaypoint(cursor))?;
            let id = self.insert(base + step);
            self.link(cursor, id)?;
            created.push(id);
            cursor = id;
        }
        Ok(created)
    }

    /// Uniformly random outgoing link of `from`, or `None` when `from` is
    /// dangling or has no links. Read-only; may return a dangling target,
    /// which callers skip on encounter.
    pub fn pick_random_next(
        &self,
        from: WaypointId,
        rng: &mut impl DeterministicRng,
    ) -> Option<WaypointId> {
        self.nodes.get(&from)?.pick_random_next(rng)
    }

    /// Outgoing link of `from` whose node lies closest to `reference`.
    ///
    /// Linear scan over the link list minimizing squared distance; dangling
    /// targets are skipped and ties break to the first link in list order.
    pub fn pick_nearest_next(&self, from: WaypointId, reference: Vec3) -> Option<WaypointId> {
        let node = self.nodes.get(&from)?;
        let mut best: Option<(WaypointId, f32)> = None;
        for &target in node.links() {
            let Some(pos) = self.position(target) else {
                continue;
            };
            let dist2 = reference.distance_squared(pos);
            if best.map_or(true, |(_, b)| dist2 < b) {
                best = Some((target, dist2));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Distance from `from` to `to`: the cached value when present (even if
    /// `to` has since despawned), otherwise recomputed from live positions.
    pub fn distance_between(&self, from: WaypointId, to: WaypointId) -> Option<f32> {
        let node = self.nodes.get(&from)?;
        if let Some(cached) = node.cached_distance(to) {
            return Some(cached);
        }
        let to_pos = self.position(to)?;
        Some(node.position().distance(to_pos))
    }
}
