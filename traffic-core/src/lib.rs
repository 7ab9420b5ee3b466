//! Deterministic, engine-agnostic traffic simulation kernel primitives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod rng;
pub mod tick;

pub use agent::AgentId;
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::{Interval, TickContext};
