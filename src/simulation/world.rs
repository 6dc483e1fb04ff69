//! World state container

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::city::building::{BuildingArchetype, BuildingId, BuildingState, BuildingType, ContributionResult};
use crate::city::construction::apply_construction_work;
use crate::core::clock::{IntervalGate, SimClock};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Tick, Vec2};
use crate::economy::market::Market;
use crate::entity::agent::{Agent, AgentSnapshot};
use crate::simulation::behavior::DestinationRequest;
use crate::simulation::consumption::{serve_visit, ArrivalOutcome};
use crate::simulation::context::SimContext;
use crate::simulation::registry::AgentRegistry;
use crate::simulation::tick::{run_simulation_tick, SimulationEvent};
use crate::society::aggregator::{SocietyAggregator, SocietyStats};
use crate::society::events::SocialEventLog;
use crate::spatial::sparse_hash::SparseHashGrid;

/// Buildings laid out by [`World::found_town`]
const TOWN_PLAN: [BuildingType; 17] = [
    BuildingType::House,
    BuildingType::House,
    BuildingType::Restaurant,
    BuildingType::Theater,
    BuildingType::SocialCenter,
    BuildingType::Hospital,
    BuildingType::Library,
    BuildingType::Farm,
    BuildingType::Farm,
    BuildingType::Well,
    BuildingType::WoodCutter,
    BuildingType::PowerPlant,
    BuildingType::Mine,
    BuildingType::Workshop,
    BuildingType::Factory,
    BuildingType::Market,
    BuildingType::School,
];

/// Gates for the phases that run coarser than every tick
#[derive(Debug, Clone)]
pub(crate) struct PhaseGates {
    pub interaction: IntervalGate,
    pub market: IntervalGate,
    pub trade: IntervalGate,
    pub career_review: IntervalGate,
    pub workers: IntervalGate,
    pub aggregator: IntervalGate,
}

impl PhaseGates {
    fn new(config: &SimulationConfig) -> Self {
        Self {
            interaction: IntervalGate::new(config.interaction_interval),
            market: IntervalGate::new(config.market_update_interval),
            trade: IntervalGate::new(config.trade_interval),
            career_review: IntervalGate::new(config.promotion_check_interval),
            workers: IntervalGate::primed(config.worker_assignment_interval),
            aggregator: IntervalGate::new(config.aggregator_interval),
        }
    }
}

/// The simulated society: agents, buildings, market and history
pub struct World {
    pub ctx: SimContext,
    pub clock: SimClock,
    pub agents: AgentRegistry,
    pub buildings: BuildingArchetype,
    pub market: Market,
    pub social_events: SocialEventLog,
    pub aggregator: SocietyAggregator,
    /// Serial stream for creation, pairing and market noise
    pub(crate) rng: ChaCha8Rng,
    pub(crate) gates: PhaseGates,
    pub(crate) grid: SparseHashGrid,
    outbox: Vec<DestinationRequest>,
}

impl World {
    pub fn new(ctx: SimContext) -> Self {
        let config = &ctx.config;
        Self {
            clock: SimClock::new(),
            agents: AgentRegistry::new(),
            buildings: BuildingArchetype::new(),
            market: Market::new(&ctx.resources, config.market_volatility),
            social_events: SocialEventLog::new(config.social_event_capacity),
            aggregator: SocietyAggregator::new(config.stats_history_capacity),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            gates: PhaseGates::new(config),
            grid: SparseHashGrid::new(config.interaction_radius.max(1.0)),
            outbox: Vec::new(),
            ctx,
        }
    }

    /// Validate the configuration and build a world from it
    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(SimContext::new(config)))
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.ctx.config
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.tick
    }

    /// Spawn the configured initial population around the origin
    pub fn populate(&mut self) -> Vec<AgentId> {
        let count = self.ctx.config.initial_population;
        let ids: Vec<AgentId> = (0..count)
            .map(|_| {
                let position = self.random_position();
                self.agents.create(&self.ctx, position, &mut self.rng)
            })
            .collect();
        tracing::info!(population = ids.len(), "population spawned");
        ids
    }

    fn random_position(&mut self) -> Vec2 {
        let range = self.ctx.config.spawn_range;
        Vec2::new(
            self.rng.gen_range(-range..=range),
            self.rng.gen_range(-range..=range),
        )
    }

    /// Generate one agent at `position`
    pub fn spawn_agent(&mut self, position: Vec2) -> AgentId {
        self.agents.create(&self.ctx, position, &mut self.rng)
    }

    /// Register a prepared agent; a colliding id is regenerated
    pub fn insert_agent(&mut self, agent: Agent) -> AgentId {
        self.agents.insert(agent, &mut self.rng)
    }

    /// Remove an agent and release its workplace
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.agents.remove(id)?;
        if let Some(idx) = agent.workplace.and_then(|b| self.buildings.index_of(b)) {
            self.buildings.unassign_worker(idx, id);
        }
        for peer in agent.network.peers() {
            if let Some(other) = self.agents.get_mut(peer) {
                other.network.remove(id);
            }
        }
        Some(agent)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn agent_snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.list().iter().map(Agent::snapshot).collect()
    }

    /// Place a new construction site
    pub fn spawn_building(&mut self, building_type: BuildingType, position: Vec2) -> BuildingId {
        let id = self.fresh_building_id();
        self.buildings.spawn(
            id,
            building_type,
            position,
            self.clock.tick,
            &self.ctx.resources,
            self.ctx.config.building_starting_funds,
        );
        tracing::debug!(?building_type, %id, "building placed");
        id
    }

    /// Place a building that is already finished, stocked with its service reserve
    pub fn spawn_operating_building(&mut self, building_type: BuildingType, position: Vec2) -> BuildingId {
        let id = self.spawn_building(building_type, position);
        if let Some(idx) = self.buildings.index_of(id) {
            self.buildings
                .advance_construction(idx, building_type.construction_time(), self.clock.tick);
            self.buildings.stock_service_reserve(idx);
        }
        id
    }

    fn fresh_building_id(&mut self) -> BuildingId {
        loop {
            let id = BuildingId::from_rng(&mut self.rng);
            if self.buildings.index_of(id).is_none() {
                return id;
            }
        }
    }

    /// Lay out an operating starter town on a grid around the origin
    pub fn found_town(&mut self) -> Vec<BuildingId> {
        const COLUMNS: usize = 5;
        let spacing = (self.ctx.config.spawn_range / 2.0).max(1.0);
        let offset = spacing * (COLUMNS as f32 - 1.0) / 2.0;

        let ids = TOWN_PLAN
            .iter()
            .enumerate()
            .map(|(i, building_type)| {
                let position = Vec2::new(
                    (i % COLUMNS) as f32 * spacing - offset,
                    (i / COLUMNS) as f32 * spacing - offset,
                );
                self.spawn_operating_building(*building_type, position)
            })
            .collect::<Vec<_>>();
        tracing::info!(buildings = ids.len(), "town founded");
        ids
    }

    pub fn building_index(&self, id: BuildingId) -> Result<usize> {
        self.buildings.index_of(id).ok_or(SimError::BuildingNotFound(id))
    }

    /// Move a building to a new lifecycle state
    ///
    /// Abandoning a building lets its workers go.
    pub fn transition_building(&mut self, id: BuildingId, to: BuildingState) -> Result<()> {
        let idx = self.building_index(id)?;
        let workers = self.buildings.workers[idx].clone();
        self.buildings.transition(idx, to)?;
        if to == BuildingState::Abandoned {
            for worker in workers {
                if let Some(agent) = self.agents.get_mut(worker) {
                    agent.workplace = None;
                }
            }
        }
        Ok(())
    }

    /// Contribute construction work to a site from outside the tick
    pub fn contribute_construction(&mut self, id: BuildingId, work: f32) -> Result<ContributionResult> {
        let idx = self.building_index(id)?;
        let result = apply_construction_work(&mut self.buildings, idx, work, self.clock.tick);
        if result == ContributionResult::Completed {
            self.buildings.stock_service_reserve(idx);
        }
        Ok(result)
    }

    /// Employ an agent at a building, leaving any previous workplace
    pub fn assign_worker(&mut self, building: BuildingId, agent: AgentId) -> Result<()> {
        let idx = self.building_index(building)?;
        let worker = self.agents.get(agent).ok_or(SimError::AgentNotFound(agent))?;
        if !worker.skills.meets(&self.buildings.building_types[idx].required_skills()) {
            return Err(crate::city::building::BuildingError::Unqualified.into());
        }
        let previous = worker.workplace;

        self.buildings.assign_worker(idx, agent)?;
        if let Some(old) = previous.and_then(|b| self.buildings.index_of(b)) {
            self.buildings.unassign_worker(old, agent);
        }
        if let Some(worker) = self.agents.get_mut(agent) {
            worker.workplace = Some(building);
        }
        Ok(())
    }

    /// Release an agent from a building; false if it was not employed there
    pub fn unassign_worker(&mut self, building: BuildingId, agent: AgentId) -> Result<bool> {
        let idx = self.building_index(building)?;
        let removed = self.buildings.unassign_worker(idx, agent);
        if removed {
            if let Some(worker) = self.agents.get_mut(agent) {
                worker.workplace = None;
            }
        }
        Ok(removed)
    }

    /// The movement layer reports that an agent reached a building
    pub fn notify_arrival(&mut self, agent: AgentId, building: BuildingId) -> Result<ArrivalOutcome> {
        let idx = self.building_index(building)?;
        let tick = self.clock.tick;
        let visitor = self.agents.get_mut(agent).ok_or(SimError::AgentNotFound(agent))?;
        Ok(serve_visit(visitor, &mut self.buildings, idx, &mut self.market, tick))
    }

    /// Take the destination requests emitted since the last drain
    pub fn drain_destination_requests(&mut self) -> Vec<DestinationRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn push_request(&mut self, request: DestinationRequest) {
        self.outbox.push(request);
    }

    /// Advance the simulation by `dt`
    pub fn tick(&mut self, dt: f32) -> Vec<SimulationEvent> {
        run_simulation_tick(self, dt)
    }

    /// Advance by the configured tick interval
    pub fn step(&mut self) -> Vec<SimulationEvent> {
        let dt = self.ctx.config.tick_interval;
        self.tick(dt)
    }

    /// Most recent aggregator snapshot
    pub fn stats(&self) -> Option<&SocietyStats> {
        self.aggregator.latest()
    }

    /// Statistics for the current population, computed now
    pub fn collect_stats(&self) -> SocietyStats {
        SocietyStats::collect(self.clock.tick, self.agents.list())
    }
}
