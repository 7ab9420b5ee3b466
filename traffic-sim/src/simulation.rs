use tracing::{debug, trace};

use traffic_agent::{NavConfig, NavController, NavState};
use traffic_core::{rng, AgentId, SplitMix64, TickContext};
use traffic_graph::{Sweeper, Vec3, WaypointGraph, WaypointId};

use crate::body::KinematicBody;
use crate::spawn::Spawner;

/// RNG stream tags, one per randomized concern.
const NAV_STREAM: u64 = 0;
const SPAWN_STREAM: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Global seed; all agent decisions derive from it.
    pub seed: u64,
    pub nav: NavConfig,
    /// Movement speed for spawned bodies, world units per second.
    pub agent_speed: f32,
    pub sweep_period_seconds: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            nav: NavConfig::default(),
            agent_speed: 8.0,
            sweep_period_seconds: Sweeper::DEFAULT_PERIOD_SECONDS,
        }
    }
}

/// One simulated agent: its controller plus the motion body it drives.
#[derive(Debug, Clone)]
pub struct SimAgent {
    pub id: AgentId,
    pub controller: NavController,
    pub body: KinematicBody,
}

/// Single-threaded cooperative tick driver.
///
/// Owns the graph and every agent; `step` advances controllers in stable
/// agent-id order, then bodies, then the spawner and the sweeper, each gated
/// by its own interval. There is no parallelism anywhere, which is what
/// makes the lock-free shared graph sound.
pub struct Simulation {
    config: SimConfig,
    graph: WaypointGraph,
    sweeper: Sweeper,
    spawner: Option<Spawner>,
    agents: Vec<SimAgent>,
    tick: u64,
    next_agent_id: u64,
}

impl Simulation {
    pub fn new(graph: WaypointGraph, config: SimConfig) -> Self {
        Self {
            config,
            graph,
            sweeper: Sweeper::new(config.sweep_period_seconds),
            spawner: None,
            agents: Vec::new(),
            tick: 0,
            next_agent_id: 1,
        }
    }

    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn config(&self) -> SimConfig {
        self.config
    }

    pub fn graph(&self) -> &WaypointGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut WaypointGraph {
        &mut self.graph
    }

    pub fn agents(&self) -> &[SimAgent] {
        &self.agents
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Add an agent at an arbitrary position; it acquires its first waypoint
    /// through the nearest-node query on its first step.
    pub fn spawn_agent_at(&mut self, position: Vec3) -> AgentId {
        let id = self.alloc_agent_id();
        self.agents.push(SimAgent {
            id,
            controller: NavController::new(self.config.nav),
            body: KinematicBody::new(position, self.config.agent_speed),
        });
        id
    }

    /// Add an agent seated directly on `waypoint` (spawn-time placement),
    /// or `None` when the waypoint no longer resolves.
    pub fn spawn_agent_on(&mut self, waypoint: WaypointId) -> Option<AgentId> {
        let position = self.graph.position(waypoint)?;
        let id = self.alloc_agent_id();

        let mut controller = NavController::new(self.config.nav);
        let mut body = KinematicBody::new(position, self.config.agent_speed);
        let mut rng = SplitMix64::new(rng::derive_seed(
            self.config.seed,
            id.stable_id(),
            NAV_STREAM,
        ));
        controller.set_current_waypoint(waypoint, &self.graph, &mut body, &mut rng);

        self.agents.push(SimAgent {
            id,
            controller,
            body,
        });
        debug!(agent = id.stable_id(), waypoint = waypoint.0, "agent spawned");
        Some(id)
    }

    /// Advance the whole world by `dt` seconds of simulated time.
    pub fn step(&mut self, dt_seconds: f32) {
        let ctx = TickContext {
            tick: self.tick,
            dt_seconds,
            seed: self.config.seed,
        };

        self.agents.sort_by_key(|a| a.id);
        for agent in &mut self.agents {
            let mut agent_rng = ctx.rng_for_agent(agent.id, NAV_STREAM);
            let before = agent.controller.state();
            agent
                .controller
                .tick(dt_seconds, &self.graph, &mut agent.body, &mut agent_rng);
            let after = agent.controller.state();
            if after != before {
                match after {
                    NavState::Recovering => {
                        debug!(agent = agent.id.stable_id(), "agent lost its path")
                    }
                    NavState::Tracking => trace!(
                        agent = agent.id.stable_id(),
                        waypoint = ?agent.controller.current_waypoint(),
                        "agent tracking"
                    ),
                    NavState::Uninitialized => {
                        trace!(agent = agent.id.stable_id(), "no reachable waypoint")
                    }
                }
            }
            agent.body.step(dt_seconds);
        }

        let spawn_pick = self.spawner.as_mut().and_then(|spawner| {
            let mut spawn_rng = SplitMix64::new(rng::derive_seed(
                self.config.seed,
                self.tick,
                SPAWN_STREAM,
            ));
            spawner.tick(dt_seconds, self.agents.len(), &self.graph, &mut spawn_rng)
        });
        if let Some(waypoint) = spawn_pick {
            self.spawn_agent_on(waypoint);
        }

        if let Some(stats) = self.sweeper.tick(dt_seconds, &mut self.graph) {
            if stats.total() > 0 {
                debug!(
                    roster = stats.roster,
                    links = stats.links,
                    buckets = stats.buckets,
                    "graph sweep reclaimed dangling references"
                );
            }
        }

        self.tick += 1;
    }

    fn alloc_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }
}
