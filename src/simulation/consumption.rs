//! Consumption - serving needs at facilities and from home stock
//!
//! Each need is served by one facility type. A visit takes one unit of the
//! facility's resource (if any), paid at market price, and restores the need.

use crate::city::building::{BuildingArchetype, BuildingState, BuildingType};
use crate::core::types::Tick;
use crate::economy::catalog::ResourceType;
use crate::economy::market::Market;
use crate::entity::agent::{Agent, ConsumptionState};
use crate::entity::needs::NeedType;
use crate::entity::social::memory::MemoryKind;

/// Where and how a need is served
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facility {
    pub need: NeedType,
    pub building: BuildingType,
    /// Unit taken from the building's stock per visit
    pub resource: Option<ResourceType>,
    pub restore: f32,
}

/// Indexed by [`NeedType::index`]
pub const FACILITIES: [Facility; NeedType::COUNT] = [
    Facility {
        need: NeedType::Food,
        building: BuildingType::Restaurant,
        resource: Some(ResourceType::ProcessedFood),
        restore: 40.0,
    },
    Facility { need: NeedType::Sleep, building: BuildingType::House, resource: None, restore: 50.0 },
    Facility {
        need: NeedType::Entertainment,
        building: BuildingType::Theater,
        resource: Some(ResourceType::Entertainment),
        restore: 35.0,
    },
    Facility {
        need: NeedType::Social,
        building: BuildingType::SocialCenter,
        resource: None,
        restore: 30.0,
    },
    Facility {
        need: NeedType::Health,
        building: BuildingType::Hospital,
        resource: Some(ResourceType::Medicine),
        restore: 45.0,
    },
    Facility {
        need: NeedType::Culture,
        building: BuildingType::Library,
        resource: Some(ResourceType::Culture),
        restore: 30.0,
    },
];

pub fn facility_for(need: NeedType) -> &'static Facility {
    &FACILITIES[need.index()]
}

/// Food eaten per home meal
pub const HOME_MEAL: f32 = 10.0;
/// Food need restored by a home meal
pub const HOME_MEAL_RESTORE: f32 = 30.0;
pub const HOME_MEAL_HAPPINESS: f32 = 5.0;

/// Whether the building could serve `facility` right now
pub fn can_serve(buildings: &BuildingArchetype, idx: usize, facility: &Facility) -> bool {
    buildings.states[idx] == BuildingState::Operating
        && buildings.building_types[idx] == facility.building
        && facility
            .resource
            .map_or(true, |r| buildings.has_resource(idx, r, 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrivalOutcome {
    /// Need restored; `paid` went to the building
    Served { need: NeedType, restored: f32, paid: f32 },
    /// The agent was not heading anywhere
    NotSeeking,
    /// The agent was heading for another building
    WrongTarget,
    /// Closed or out of stock; the agent gives up until the next need check
    Unavailable,
    /// The agent cannot pay; nothing changes
    Unaffordable,
}

/// Serve an agent that has arrived at the building at `idx`
///
/// Either the whole visit happens (unit taken, payment made, need restored)
/// or none of it does.
pub fn serve_visit(
    agent: &mut Agent,
    buildings: &mut BuildingArchetype,
    idx: usize,
    market: &mut Market,
    tick: Tick,
) -> ArrivalOutcome {
    let need = match agent.consumption {
        ConsumptionState::Idle => return ArrivalOutcome::NotSeeking,
        ConsumptionState::Seeking { need, target } if target == buildings.ids[idx] => need,
        ConsumptionState::Seeking { .. } => return ArrivalOutcome::WrongTarget,
    };
    let facility = facility_for(need);

    if !can_serve(buildings, idx, facility) {
        tracing::debug!(agent = %agent.id, ?need, "facility cannot serve");
        agent.consumption = ConsumptionState::Idle;
        agent.seek_elapsed = 0.0;
        return ArrivalOutcome::Unavailable;
    }

    let price = facility.resource.map_or(0.0, |r| market.price(r));
    if agent.wealth() < price {
        tracing::debug!(agent = %agent.id, ?need, price, "visit unaffordable");
        return ArrivalOutcome::Unaffordable;
    }

    if let Some(resource) = facility.resource {
        if !buildings.request_resource(idx, resource, 1.0) {
            agent.consumption = ConsumptionState::Idle;
            agent.seek_elapsed = 0.0;
            return ArrivalOutcome::Unavailable;
        }
        agent.inventory.remove(ResourceType::Money, price);
        buildings.deposit(idx, price);
        market.record_trade(resource, 1.0);
    }

    let before = agent.needs.get(need).value;
    agent.needs.satisfy(need, facility.restore);
    let restored = agent.needs.get(need).value - before;
    agent.adjust_happiness(buildings.building_types[idx].happiness_bonus());
    agent.memory.push(tick, MemoryKind::Consumption { need });
    agent.consumption = ConsumptionState::Idle;
    agent.seek_elapsed = 0.0;

    ArrivalOutcome::Served { need, restored, paid: price }
}

/// Eat from the agent's own stock when hunger passes `threshold`
pub fn self_provision(agent: &mut Agent, threshold: f32, tick: Tick) -> bool {
    if agent.needs.get(NeedType::Food).pressure() <= threshold
        || !agent.inventory.consume(ResourceType::Food, HOME_MEAL)
    {
        return false;
    }
    agent.needs.satisfy(NeedType::Food, HOME_MEAL_RESTORE);
    agent.adjust_happiness(HOME_MEAL_HAPPINESS);
    agent.memory.push(tick, MemoryKind::HomeMeal);
    tracing::trace!(agent = %agent.id, "ate at home");
    true
}
