//! Per-agent navigation over a waypoint graph: a current target, a bounded
//! lookahead queue, periodic re-validation, and recovery from path loss.
//!
//! Movement itself is delegated outward through [`MotionAgent`]; this crate
//! never computes paths.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod controller;
pub mod motion;

pub use controller::{off_path, NavConfig, NavController, NavState};
pub use motion::MotionAgent;
