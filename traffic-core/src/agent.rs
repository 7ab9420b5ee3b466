#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for a simulated agent.
///
/// Deterministic simulation requires a stable ordering across ticks (agents
/// are always advanced in `AgentId` order) and a stable numeric value for
/// seeding per-agent RNG streams and for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentId(pub u64);

impl AgentId {
    pub fn stable_id(self) -> u64 {
        self.0
    }
}

impl From<u64> for AgentId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
