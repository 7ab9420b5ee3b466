use crate::{rng, AgentId, SplitMix64};

/// Per-step context handed to every periodic component by the tick driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    /// Per-agent RNG stream for this tick.
    ///
    /// The tick is folded into the derivation: successive ticks draw from
    /// independent sequences, while the same (seed, tick, agent, stream)
    /// always yields the same one.
    pub fn rng_for_agent(&self, agent: AgentId, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(
            self.seed ^ rng::mix64(self.tick),
            agent.stable_id(),
            stream,
        );
        SplitMix64::new(seed)
    }
}

/// Simulated-time gate for periodic behaviors.
///
/// Components that should not re-evaluate every frame (navigation
/// re-validation, graph sweeps, spawn waves) accumulate `dt` into an
/// `Interval` and only act when it fires. Firing resets the accumulator to
/// zero rather than carrying the remainder, matching a "last fired at"
/// timestamp check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    period_seconds: f32,
    elapsed: f32,
}

impl Interval {
    /// An interval that first fires after one full period.
    pub fn new(period_seconds: f32) -> Self {
        Self {
            period_seconds: period_seconds.max(0.0),
            elapsed: 0.0,
        }
    }

    /// An interval that is already due: the first `fire` call returns true.
    ///
    /// Used by components that must act immediately on creation, e.g. a
    /// navigation controller acquiring its first waypoint at spawn.
    pub fn due(period_seconds: f32) -> Self {
        let period = period_seconds.max(0.0);
        Self {
            period_seconds: period,
            elapsed: period,
        }
    }

    pub fn period_seconds(&self) -> f32 {
        self.period_seconds
    }

    /// Advance by `dt` seconds; returns true (and resets) when the period
    /// has elapsed.
    pub fn fire(&mut self, dt_seconds: f32) -> bool {
        self.elapsed += dt_seconds.max(0.0);
        if self.elapsed >= self.period_seconds {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}
