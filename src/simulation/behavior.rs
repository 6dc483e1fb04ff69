//! Behavior state machine - deciding when and where to satisfy needs
//!
//! Idle agents check their most urgent need on a cooldown. Past the need's
//! threshold they pick the nearest facility that can serve it and emit a
//! destination request for the movement layer. Arrival is reported back
//! through [`crate::simulation::consumption::serve_visit`].

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::city::building::{BuildingArchetype, BuildingId};
use crate::core::config::SimulationConfig;
use crate::core::types::{AgentId, Tick, Vec2};
use crate::entity::agent::{Agent, ConsumptionState};
use crate::entity::needs::NeedType;
use crate::simulation::consumption::{can_serve, facility_for, self_provision, Facility};

/// Ask the movement layer to bring an agent to a building
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DestinationRequest {
    pub agent: AgentId,
    pub building: BuildingId,
    pub position: Vec2,
    pub need: NeedType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorOutcome {
    Nothing,
    Seek(DestinationRequest),
    AteAtHome,
    /// Seeking took too long and was abandoned
    GaveUp(NeedType),
}

/// Closest building able to serve the facility; ties go to the lower index
pub fn nearest_facility(buildings: &BuildingArchetype, facility: &Facility, from: Vec2) -> Option<usize> {
    (0..buildings.count())
        .filter(|&i| can_serve(buildings, i, facility))
        .min_by_key(|&i| OrderedFloat(from.distance(&buildings.positions[i])))
}

/// Advance one agent's behavior by `dt`
pub fn update_behavior(
    agent: &mut Agent,
    buildings: &BuildingArchetype,
    config: &SimulationConfig,
    dt: f32,
    tick: Tick,
) -> BehaviorOutcome {
    if let ConsumptionState::Seeking { need, .. } = agent.consumption {
        agent.seek_elapsed += dt;
        if agent.seek_elapsed >= config.seek_timeout {
            tracing::debug!(agent = %agent.id, ?need, "gave up seeking");
            agent.consumption = ConsumptionState::Idle;
            agent.seek_elapsed = 0.0;
            return BehaviorOutcome::GaveUp(need);
        }
        return BehaviorOutcome::Nothing;
    }

    if !agent.need_gate.ready(dt) {
        return BehaviorOutcome::Nothing;
    }

    let urgent = agent.needs.most_urgent();
    let need = urgent.kind;
    if urgent.pressure() > config.need_thresholds.get(need) {
        let facility = facility_for(need);
        if let Some(idx) = nearest_facility(buildings, facility, agent.position) {
            let building = buildings.ids[idx];
            agent.consumption = ConsumptionState::Seeking { need, target: building };
            agent.seek_elapsed = 0.0;
            return BehaviorOutcome::Seek(DestinationRequest {
                agent: agent.id,
                building,
                position: buildings.positions[idx],
                need,
            });
        }
        tracing::trace!(agent = %agent.id, ?need, "no facility can serve");
    }

    if self_provision(agent, config.self_provision_threshold, tick) {
        return BehaviorOutcome::AteAtHome;
    }
    BehaviorOutcome::Nothing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingType;
    use crate::economy::catalog::{ResourceCatalog, ResourceType};

    fn restaurant_at(buildings: &mut BuildingArchetype, pos: Vec2, stock: f32) -> usize {
        let catalog = ResourceCatalog::with_defaults();
        let idx = buildings.spawn(BuildingId::new(), BuildingType::Restaurant, pos, 0, &catalog, 0.0);
        buildings.advance_construction(idx, BuildingType::Restaurant.construction_time(), 0);
        buildings.inventories[idx].add(ResourceType::ProcessedFood, stock);
        idx
    }

    fn hungry_agent(pressure: f32) -> Agent {
        let config = SimulationConfig::default();
        let mut agent = Agent::new(AgentId::new(), "Hungry", &ResourceCatalog::with_defaults(), &config);
        agent.needs.get_mut(NeedType::Food).set_pressure(pressure);
        agent
    }

    #[test]
    fn test_seeks_nearest_stocked_restaurant() {
        let config = SimulationConfig::default();
        let mut buildings = BuildingArchetype::new();
        restaurant_at(&mut buildings, Vec2::new(2.0, 0.0), 0.0);
        let far = restaurant_at(&mut buildings, Vec2::new(10.0, 0.0), 5.0);
        restaurant_at(&mut buildings, Vec2::new(20.0, 0.0), 5.0);

        let mut agent = hungry_agent(85.0);
        let outcome = update_behavior(&mut agent, &buildings, &config, 1.0, 0);

        let BehaviorOutcome::Seek(request) = outcome else {
            panic!("expected a destination request, got {:?}", outcome);
        };
        assert_eq!(request.building, buildings.ids[far]);
        assert_eq!(request.need, NeedType::Food);
        assert!(matches!(agent.consumption, ConsumptionState::Seeking { .. }));
    }

    #[test]
    fn test_below_threshold_stays_idle() {
        let config = SimulationConfig::default();
        let mut buildings = BuildingArchetype::new();
        restaurant_at(&mut buildings, Vec2::default(), 5.0);

        let mut agent = hungry_agent(60.0);
        assert_eq!(update_behavior(&mut agent, &buildings, &config, 1.0, 0), BehaviorOutcome::Nothing);
        assert_eq!(agent.consumption, ConsumptionState::Idle);
    }

    #[test]
    fn test_no_restaurant_falls_back_to_home_meal() {
        let config = SimulationConfig::default();
        let buildings = BuildingArchetype::new();
        let mut agent = hungry_agent(85.0);
        agent.inventory.add(ResourceType::Food, 20.0);

        assert_eq!(update_behavior(&mut agent, &buildings, &config, 1.0, 0), BehaviorOutcome::AteAtHome);
        assert!((agent.needs.get(NeedType::Food).pressure() - 55.0).abs() < 1e-4);
    }

    #[test]
    fn test_seeking_times_out() {
        let config = SimulationConfig::default();
        let mut buildings = BuildingArchetype::new();
        restaurant_at(&mut buildings, Vec2::default(), 5.0);
        let mut agent = hungry_agent(85.0);
        update_behavior(&mut agent, &buildings, &config, 1.0, 0);

        let mut outcome = BehaviorOutcome::Nothing;
        for tick in 1..=(config.seek_timeout as u64) {
            outcome = update_behavior(&mut agent, &buildings, &config, 1.0, tick);
            if outcome != BehaviorOutcome::Nothing {
                break;
            }
        }
        assert_eq!(outcome, BehaviorOutcome::GaveUp(NeedType::Food));
        assert_eq!(agent.consumption, ConsumptionState::Idle);
    }
}
