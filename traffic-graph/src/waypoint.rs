use std::collections::BTreeMap;

use traffic_core::DeterministicRng;

use crate::math::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable handle for a waypoint node.
///
/// Ids are allocated by [`crate::WaypointGraph`] and never reused within a
/// graph. A dangling id (node despawned by the host) resolves to nothing and
/// is skipped wherever it is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaypointId(pub u32);

/// One node in the directed waypoint graph.
///
/// Outgoing links are kept in insertion order alongside a distance cache in
/// lock-step: every link has exactly one cache entry. The cache is an
/// optimization only; graph-level distance queries recompute on a miss.
#[derive(Debug, Clone)]
pub struct Waypoint {
    position: Vec3,
    links: Vec<WaypointId>,
    distances: BTreeMap<WaypointId, f32>,
}

impl Waypoint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            links: Vec::new(),
            distances: BTreeMap::new(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn links(&self) -> &[WaypointId] {
        &self.links
    }

    pub fn has_link(&self, target: WaypointId) -> bool {
        self.links.contains(&target)
    }

    /// Append an outgoing link with its precomputed distance.
    ///
    /// Set-like: returns false (and changes nothing) when the link already
    /// exists. Membership check is a linear scan over the link list.
    pub fn add_link(&mut self, target: WaypointId, distance: f32) -> bool {
        if self.has_link(target) {
            return false;
        }
        self.links.push(target);
        self.distances.insert(target, distance);
        true
    }

    /// Remove a link and its cache entry; no-op when absent.
    pub fn remove_link(&mut self, target: WaypointId) -> bool {
        let before = self.links.len();
        self.links.retain(|&id| id != target);
        self.distances.remove(&target);
        self.links.len() != before
    }

    pub fn clear_links(&mut self) {
        self.links.clear();
        self.distances.clear();
    }

    /// Drop every link rejected by `keep`, cache entries included.
    ///
    /// Returns the number of links removed.
    pub fn retain_links<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(WaypointId) -> bool,
    {
        let before = self.links.len();
        self.links.retain(|&id| keep(id));
        let links = &self.links;
        self.distances.retain(|id, _| links.contains(id));
        before - self.links.len()
    }

    /// Uniformly random link target, or `None` when there are no links.
    pub fn pick_random_next(&self, rng: &mut impl DeterministicRng) -> Option<WaypointId> {
        if self.links.is_empty() {
            return None;
        }
        Some(self.links[rng.next_index(self.links.len())])
    }

    /// Cached distance to `target`, if this node links to it.
    pub fn cached_distance(&self, target: WaypointId) -> Option<f32> {
        self.distances.get(&target).copied()
    }

    pub fn cached_distances(&self) -> impl Iterator<Item = (WaypointId, f32)> + '_ {
        self.distances.iter().map(|(&id, &d)| (id, d))
    }
}
