//! Waypoint graph primitives: nodes with cached link distances, a uniform
//! grid spatial index for nearest-node queries, and a maintenance sweep that
//! reclaims dangling references.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod graph;
pub mod math;
pub mod sweep;
pub mod waypoint;

pub use graph::{GraphConfig, GraphError, WaypointGraph};
pub use math::Vec3;
pub use sweep::{SweepStats, Sweeper};
pub use waypoint::{Waypoint, WaypointId};
