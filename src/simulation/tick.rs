//! Tick system - orchestrates simulation updates
//!
//! Per-agent phases touch only the agent itself (plus shared read-only
//! state) and run in parallel above the configured threshold. Phases that
//! pair agents or draw from the world stream run serially in id order, so
//! a seed reproduces the same run either way.

use rand::Rng;
use rayon::prelude::*;

use crate::career::catalog::CareerId;
use crate::career::progression::update_career;
use crate::career::promotion::{try_promote, PromotionOffer};
use crate::city::building::{BuildingArchetype, BuildingId, BuildingState};
use crate::city::construction::tick_construction;
use crate::city::production::{distribute_inputs, restock_services, tick_production, Delivery, Restock};
use crate::core::types::{AgentId, Tick};
use crate::economy::catalog::ResourceType;
use crate::economy::conversion::convert_resources;
use crate::economy::trade::{collect_intents, execute_trade, match_intents, TradeIntent, TradeSide};
use crate::entity::agent::Agent;
use crate::entity::needs::NeedType;
use crate::entity::skills::SkillType;
use crate::entity::social::memory::MemoryKind;
use crate::simulation::behavior::{update_behavior, BehaviorOutcome};
use crate::simulation::context::SimContext;
use crate::simulation::interaction::{interact, interaction_probability};
use crate::simulation::registry::AgentRegistry;
use crate::simulation::world::World;
use crate::society::events::{SocialEvent, SocialEventKind};

/// Prestige gap to the new career's status closed on promotion
const PROMOTION_PRESTIGE_PULL: f32 = 0.5;

/// Events generated during a simulation tick
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    /// An agent set off for a facility; the request is also queued for the movement layer
    DestinationRequested { agent: AgentId, building: BuildingId, need: NeedType },
    AteAtHome { agent: AgentId },
    GaveUpSeeking { agent: AgentId, need: NeedType },
    Converted { agent: AgentId, rule: String },
    Promoted { agent: AgentId, from: CareerId, to: CareerId },
    Traded { seller: AgentId, buyer: AgentId, resource: ResourceType, amount: f32, total: f32 },
    Interacted { a: AgentId, b: AgentId, notable: bool },
    ConstructionCompleted { building: BuildingId },
    MaintenanceMissed { building: BuildingId },
    Produced { building: BuildingId, produced: Vec<(ResourceType, f32)> },
    Delivered(Delivery),
    /// A facility bought served units to refill its reserve
    Restocked(Restock),
    WorkerAssigned { agent: AgentId, building: BuildingId },
    WorkerReleased { agent: AgentId, building: BuildingId },
    StatsRecorded { tick: Tick },
}

/// Run a single simulation tick
///
/// Phases, in order:
/// 1. Needs decay, happiness and health
/// 2. Behavior: need checks, destination requests, home meals
/// 3. Relation decay
/// 4. Ideology drift
/// 5. Careers: income, skill growth; on review also conversions and promotions
/// 6. Resource deterioration
/// 7. Trade pass (gated)
/// 8. Social pass (gated)
/// 9. Market drift (gated)
/// 10. Buildings: construction, maintenance, efficiency, production, restocking
/// 11. Worker assignment (gated)
/// 12. Society statistics (gated)
/// 13. Advance the clock
pub fn run_simulation_tick(world: &mut World, dt: f32) -> Vec<SimulationEvent> {
    let mut events = Vec::new();

    update_needs(world, dt);
    update_behaviors(world, dt, &mut events);
    decay_relations(world, dt);
    drift_ideologies(world, dt);
    update_careers(world, dt, &mut events);
    deteriorate_inventories(world, dt);

    if world.gates.trade.ready(dt) {
        run_trade_pass(world, &mut events);
    }
    if world.gates.interaction.ready(dt) {
        run_social_pass(world, &mut events);
    }
    if world.gates.market.ready(dt) {
        world.market.drift(&mut world.rng);
    }

    update_buildings(world, dt, &mut events);

    if world.gates.workers.ready(dt) {
        assign_workers(world, &mut events);
    }
    if world.gates.aggregator.ready(dt) {
        let tick = world.clock.tick;
        world.aggregator.record(tick, world.agents.list());
        events.push(SimulationEvent::StatsRecorded { tick });
    }

    world.clock.advance(dt);
    events
}

/// Apply `f` to every agent, in parallel for large populations
fn for_each_agent<F>(agents: &mut [Agent], threshold: usize, f: F)
where
    F: Fn(&mut Agent) + Send + Sync,
{
    if agents.len() >= threshold {
        agents.par_iter_mut().for_each(f);
    } else {
        agents.iter_mut().for_each(f);
    }
}

/// Like [`for_each_agent`] but collects one result per agent, in arena order
fn map_agents<T, F>(agents: &mut [Agent], threshold: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&mut Agent) -> T + Send + Sync,
{
    if agents.len() >= threshold {
        agents.par_iter_mut().map(f).collect()
    } else {
        agents.iter_mut().map(f).collect()
    }
}

fn update_needs(world: &mut World, dt: f32) {
    let threshold = world.ctx.config.parallel_threshold;
    for_each_agent(world.agents.list_mut(), threshold, |agent| agent.update_needs(dt));
}

fn update_behaviors(world: &mut World, dt: f32, events: &mut Vec<SimulationEvent>) {
    let tick = world.clock.tick;
    let threshold = world.ctx.config.parallel_threshold;
    let buildings = &world.buildings;
    let config = &world.ctx.config;

    let outcomes = map_agents(world.agents.list_mut(), threshold, |agent| {
        (agent.id, update_behavior(agent, buildings, config, dt, tick))
    });

    for (agent, outcome) in outcomes {
        match outcome {
            BehaviorOutcome::Nothing => {}
            BehaviorOutcome::Seek(request) => {
                events.push(SimulationEvent::DestinationRequested {
                    agent,
                    building: request.building,
                    need: request.need,
                });
                world.push_request(request);
            }
            BehaviorOutcome::AteAtHome => events.push(SimulationEvent::AteAtHome { agent }),
            BehaviorOutcome::GaveUp(need) => {
                events.push(SimulationEvent::GaveUpSeeking { agent, need })
            }
        }
    }
}

fn decay_relations(world: &mut World, dt: f32) {
    let threshold = world.ctx.config.parallel_threshold;
    let prune = world.ctx.config.prune_stale_relations;
    let pruned: usize = map_agents(world.agents.list_mut(), threshold, |agent| {
        agent.decay_relations(dt, prune)
    })
    .into_iter()
    .sum();
    if pruned > 0 {
        tracing::trace!(pruned, "stale relations pruned");
    }
}

fn drift_ideologies(world: &mut World, dt: f32) {
    let threshold = world.ctx.config.parallel_threshold;
    for_each_agent(world.agents.list_mut(), threshold, |agent| agent.drift_ideology(dt));
}

fn deteriorate_inventories(world: &mut World, dt: f32) {
    let threshold = world.ctx.config.parallel_threshold;
    let resources = &world.ctx.resources;
    for_each_agent(world.agents.list_mut(), threshold, |agent| {
        agent.inventory.deteriorate(resources, dt)
    });
}

#[derive(Debug, Default)]
struct CareerStep {
    conversions: Vec<String>,
    promotion: Option<PromotionOffer>,
}

/// One agent's career update; conversions and promotions only on review
fn career_step(agent: &mut Agent, ctx: &SimContext, dt: f32, review: bool, tick: Tick) -> CareerStep {
    let mut step = CareerStep::default();
    let Some(career) = agent.career.career.clone() else {
        return step;
    };
    let Some(record) = ctx.careers.lookup(&career) else {
        return step;
    };

    let income = update_career(
        &mut agent.career,
        &mut agent.skills,
        &agent.personality,
        record,
        &ctx.config,
        dt,
    );
    agent.inventory.add(ResourceType::Money, income);

    if !review {
        return step;
    }

    for rule in ctx.conversions.for_career(&career) {
        match convert_resources(rule, &mut agent.inventory, &agent.skills, Some(&career), &mut agent.rng) {
            Ok(outcome) => {
                agent.career.experience += outcome.experience;
                agent.skills.practice(rule.required_skill.0, outcome.experience);
                step.conversions.push(outcome.rule_id);
            }
            Err(e) => tracing::trace!(agent = %agent.id, rule = %rule.id, error = %e, "conversion skipped"),
        }
    }

    step.promotion = try_promote(
        &mut agent.career,
        &ctx.careers,
        &agent.skills,
        &agent.personality,
        agent.demographics.prestige,
        ctx.config.promotion_experience_threshold,
        &mut agent.rng,
    );
    if let Some(offer) = &step.promotion {
        if let Some(status) = ctx.careers.get(&offer.to).map(|c| c.social_status) {
            let prestige = &mut agent.demographics.prestige;
            *prestige = (*prestige + (status - *prestige) * PROMOTION_PRESTIGE_PULL).clamp(0.0, 100.0);
        }
        agent.memory.push(
            tick,
            MemoryKind::Promotion { from: Some(offer.from.clone()), to: offer.to.clone() },
        );
        agent.refresh_influence();
        tracing::debug!(agent = %agent.id, from = %offer.from, to = %offer.to, "promoted");
    }
    step
}

fn update_careers(world: &mut World, dt: f32, events: &mut Vec<SimulationEvent>) {
    let tick = world.clock.tick;
    let threshold = world.ctx.config.parallel_threshold;
    let review = world.gates.career_review.ready(dt);
    let ctx = &world.ctx;

    let steps = map_agents(world.agents.list_mut(), threshold, |agent| {
        career_step(agent, ctx, dt, review, tick)
    });

    for (idx, step) in steps.into_iter().enumerate() {
        let agent = &mut world.agents.list_mut()[idx];
        let id = agent.id;
        for rule in step.conversions {
            events.push(SimulationEvent::Converted { agent: id, rule });
        }
        let Some(offer) = step.promotion else {
            continue;
        };

        // Leave a workplace the new career does not work at
        if let Some(building) = agent.workplace {
            let keeps = world.buildings.index_of(building).map_or(false, |b| {
                world
                    .ctx
                    .careers
                    .get(&offer.to)
                    .map_or(false, |c| c.works_at(world.buildings.building_types[b]))
            });
            if !keeps {
                if let Some(b) = world.buildings.index_of(building) {
                    world.buildings.unassign_worker(b, id);
                }
                agent.workplace = None;
                events.push(SimulationEvent::WorkerReleased { agent: id, building });
            }
        }

        world.social_events.record(SocialEvent {
            tick,
            participants: vec![id],
            kind: SocialEventKind::Promotion { from: offer.from.to_string(), to: offer.to.to_string() },
        });
        events.push(SimulationEvent::Promoted { agent: id, from: offer.from, to: offer.to });
    }
}

/// Collect intents in id order, match them and settle each match
fn run_trade_pass(world: &mut World, events: &mut Vec<SimulationEvent>) {
    let tick = world.clock.tick;
    let intents: Vec<TradeIntent> = world
        .agents
        .sorted_indices()
        .into_iter()
        .flat_map(|i| {
            let agent = &world.agents.list()[i];
            collect_intents(agent.id, &agent.inventory)
        })
        .collect();

    for intent in intents.iter().filter(|i| i.side == TradeSide::Buy) {
        world.market.record_demand(intent.resource, intent.amount);
    }

    for m in match_intents(&intents) {
        let (Some(s), Some(b)) = (world.agents.index_of(m.seller), world.agents.index_of(m.buyer)) else {
            continue;
        };
        let Some((seller, buyer)) = world.agents.pair_mut(s, b) else {
            continue;
        };
        match execute_trade(&mut seller.inventory, &mut buyer.inventory, &mut world.market, m.resource, m.amount) {
            Ok(receipt) => {
                seller.memory.push(
                    tick,
                    MemoryKind::Trade { peer: m.buyer, resource: m.resource, amount: receipt.amount, sold: true },
                );
                buyer.memory.push(
                    tick,
                    MemoryKind::Trade { peer: m.seller, resource: m.resource, amount: receipt.amount, sold: false },
                );
                events.push(SimulationEvent::Traded {
                    seller: m.seller,
                    buyer: m.buyer,
                    resource: m.resource,
                    amount: receipt.amount,
                    total: receipt.total,
                });
            }
            Err(e) => {
                tracing::debug!(seller = %m.seller, buyer = %m.buyer, error = %e, "trade rejected")
            }
        }
    }
}

/// Pair neighbors within the interaction radius and roll for interactions
///
/// Each unordered pair is considered once, from the side with the lower id.
fn run_social_pass(world: &mut World, events: &mut Vec<SimulationEvent>) {
    let tick = world.clock.tick;
    let radius = world.ctx.config.interaction_radius;
    let positions: Vec<_> = world.agents.list().iter().map(|a| a.position).collect();
    world.grid.rebuild(positions.iter().copied().enumerate());

    let order = world.agents.sorted_indices();
    let mut rank = vec![0usize; order.len()];
    for (r, &i) in order.iter().enumerate() {
        rank[i] = r;
    }

    let mut notable = 0usize;
    for &i in &order {
        for j in world.grid.query_radius(positions[i], radius, &positions) {
            if rank[j] <= rank[i] {
                continue;
            }
            let p = {
                let list = world.agents.list();
                interaction_probability(&list[i], &list[j])
            };
            if world.rng.gen::<f32>() >= p {
                continue;
            }
            let Some((a, b)) = world.agents.pair_mut(i, j) else {
                continue;
            };
            let outcome = interact(a, b, &world.ctx.config, tick, &mut world.rng);
            let (id_a, id_b) = (a.id, b.id);

            if outcome.is_notable() {
                notable += 1;
                world.social_events.record(SocialEvent {
                    tick,
                    participants: vec![id_a, id_b],
                    kind: SocialEventKind::InfluentialMeeting {
                        combined_influence: outcome.combined_influence,
                        alignment: outcome.alignment,
                    },
                });
            }
            events.push(SimulationEvent::Interacted { a: id_a, b: id_b, notable: outcome.is_notable() });
        }
    }
    if notable > 0 {
        tracing::debug!(notable, "notable social events");
    }
}

/// Sum over workers and required skills of `max(0, level - required)`
fn skill_surplus(buildings: &BuildingArchetype, agents: &AgentRegistry, idx: usize) -> f32 {
    let required = buildings.building_types[idx].required_skills();
    buildings.workers[idx]
        .iter()
        .filter_map(|w| agents.get(*w))
        .map(|agent| {
            required
                .iter()
                .map(|(skill, min)| (agent.skills.level(*skill) - min).max(0.0))
                .sum::<f32>()
        })
        .sum()
}

fn update_buildings(world: &mut World, dt: f32, events: &mut Vec<SimulationEvent>) {
    let tick = world.clock.tick;

    let construction_skills: Vec<Vec<f32>> = world
        .buildings
        .workers
        .iter()
        .map(|workers| {
            workers
                .iter()
                .filter_map(|w| world.agents.get(*w))
                .map(|a| a.skills.level(SkillType::Construction))
                .collect()
        })
        .collect();
    for building in tick_construction(&mut world.buildings, dt, tick, |idx| construction_skills[idx].clone()) {
        if let Some(idx) = world.buildings.index_of(building) {
            world.buildings.stock_service_reserve(idx);
        }
        events.push(SimulationEvent::ConstructionCompleted { building });
    }

    let upkeep: Vec<usize> = world
        .buildings
        .iter_in_state(BuildingState::Operating)
        .chain(world.buildings.iter_in_state(BuildingState::Upgrading))
        .collect();
    for idx in upkeep {
        if !world.buildings.pay_maintenance(idx, dt) {
            let building = world.buildings.ids[idx];
            tracing::debug!(%building, factor = world.buildings.upkeep_factors[idx], "maintenance unpaid");
            events.push(SimulationEvent::MaintenanceMissed { building });
        }
    }

    for idx in 0..world.buildings.count() {
        let surplus = skill_surplus(&world.buildings, &world.agents, idx);
        world.buildings.refresh_efficiency(idx, surplus);
    }

    for result in tick_production(&mut world.buildings, &world.ctx.resources, dt) {
        for worker in &result.workers {
            if let Some(agent) = world.agents.get_mut(*worker) {
                for (skill, amount) in &result.practice {
                    agent.skills.practice(*skill, *amount);
                }
            }
        }
        events.push(SimulationEvent::Produced { building: result.building_id, produced: result.produced });
    }

    for delivery in distribute_inputs(&mut world.buildings, &mut world.market) {
        events.push(SimulationEvent::Delivered(delivery));
    }
    for restock in restock_services(&mut world.buildings, &mut world.market, dt) {
        events.push(SimulationEvent::Restocked(restock));
    }
}

/// Give unemployed agents the first vacancy their career and skills fit
fn assign_workers(world: &mut World, events: &mut Vec<SimulationEvent>) {
    for i in world.agents.sorted_indices() {
        let agent = &world.agents.list()[i];
        if agent.workplace.is_some() {
            continue;
        }
        let Some(career) = agent.career_id().and_then(|id| world.ctx.careers.get(id)) else {
            continue;
        };
        let buildings = &world.buildings;
        let target = (0..buildings.count()).find(|&b| {
            let building_type = buildings.building_types[b];
            buildings.has_vacancy(b)
                && career.works_at(building_type)
                && agent.skills.meets(&building_type.required_skills())
        });
        let Some(b) = target else {
            continue;
        };

        let id = agent.id;
        let building = world.buildings.ids[b];
        if world.buildings.assign_worker(b, id).is_ok() {
            world.agents.list_mut()[i].workplace = Some(building);
            tracing::trace!(agent = %id, %building, "worker assigned");
            events.push(SimulationEvent::WorkerAssigned { agent: id, building });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingType;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Vec2;
    use crate::entity::agent::ConsumptionState;

    fn town(population: usize, seed: u64) -> World {
        let config = SimulationConfig { initial_population: population, seed, ..SimulationConfig::default() };
        let mut world = World::from_config(config).unwrap();
        world.found_town();
        world.populate();
        world
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut world = town(5, 1);
        world.tick(1.0);
        world.tick(1.0);
        assert_eq!(world.current_tick(), 2);
        assert!((world.clock.elapsed - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_needs_decay_over_ticks() {
        let mut world = town(3, 2);
        for _ in 0..10 {
            world.tick(1.0);
        }
        for agent in world.agents.list() {
            assert!(agent.needs.get(NeedType::Food).value < 100.0);
        }
    }

    #[test]
    fn test_hungry_agent_requests_destination() {
        let mut world = town(0, 3);
        let id = world.spawn_agent(Vec2::default());
        world.agent_mut(id).unwrap().needs.get_mut(NeedType::Food).set_pressure(90.0);

        let events = world.tick(1.0);
        assert!(events.iter().any(|e| matches!(
            e,
            SimulationEvent::DestinationRequested { agent, need: NeedType::Food, .. } if *agent == id
        )));
        let requests = world.drain_destination_requests();
        assert_eq!(requests.len(), 1);
        assert!(world.drain_destination_requests().is_empty());
        assert!(matches!(world.agent(id).unwrap().consumption, ConsumptionState::Seeking { .. }));
    }

    #[test]
    fn test_workers_get_assigned() {
        let mut world = town(40, 4);
        let events = world.tick(1.0);
        let assigned = events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::WorkerAssigned { .. }))
            .count();
        let employed = world.agents.list().iter().filter(|a| a.workplace.is_some()).count();
        assert_eq!(assigned, employed);
        for agent in world.agents.list() {
            if let Some(b) = agent.workplace {
                let idx = world.building_index(b).unwrap();
                assert!(world.buildings.workers[idx].contains(&agent.id));
            }
        }
    }

    #[test]
    fn test_aggregator_records_on_interval() {
        let mut world = town(10, 5);
        let interval = world.config().aggregator_interval as usize;
        for _ in 0..interval {
            world.tick(1.0);
        }
        assert_eq!(world.aggregator.len(), 1);
        assert_eq!(world.stats().map(|s| s.population), Some(10));
    }

    #[test]
    fn test_construction_site_completes() {
        let mut world = town(0, 6);
        let site = world.spawn_building(BuildingType::Well, Vec2::new(1.0, 1.0));
        let ticks = BuildingType::Well.construction_time() as usize + 1;
        let mut completed = false;
        for _ in 0..ticks {
            completed |= world
                .tick(1.0)
                .iter()
                .any(|e| matches!(e, SimulationEvent::ConstructionCompleted { building } if *building == site));
        }
        assert!(completed);
        let idx = world.building_index(site).unwrap();
        assert_eq!(world.buildings.states[idx], BuildingState::Operating);
    }

    #[test]
    fn test_parallel_and_serial_runs_match() {
        let run = |threshold: usize| {
            let config = SimulationConfig {
                initial_population: 30,
                seed: 77,
                parallel_threshold: threshold,
                ..SimulationConfig::default()
            };
            let mut world = World::from_config(config).unwrap();
            world.found_town();
            world.populate();
            for _ in 0..40 {
                world.tick(1.0);
            }
            world
                .agents
                .list()
                .iter()
                .map(|a| (a.id, a.wealth(), a.happiness, *a.ideology.values()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(1), run(usize::MAX));
    }
}
