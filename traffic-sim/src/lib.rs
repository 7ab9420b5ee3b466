//! Reference host for the traffic crates: a single-threaded cooperative
//! tick driver, a straight-line kinematic motion backend, and an
//! interval-gated spawner.
//!
//! Real engines replace everything here: the driver becomes the game loop
//! and [`KinematicBody`] becomes the engine's navigation agent behind the
//! same [`traffic_agent::MotionAgent`] trait.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod body;
pub mod simulation;
pub mod spawn;

pub use body::KinematicBody;
pub use simulation::{SimAgent, SimConfig, Simulation};
pub use spawn::{SpawnConfig, Spawner};
