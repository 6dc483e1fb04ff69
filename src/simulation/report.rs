//! Run output and serialization

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::city::building::{BuildingId, BuildingState, BuildingType};
use crate::core::types::Tick;
use crate::economy::catalog::ResourceType;
use crate::entity::needs::NeedType;
use crate::simulation::consumption::ArrivalOutcome;
use crate::simulation::tick::SimulationEvent;
use crate::simulation::world::World;
use crate::society::aggregator::SocietyStats;
use crate::society::events::SocialEvent;

/// Running counts of tick events and facility visits
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTally {
    pub destination_requests: u64,
    pub home_meals: u64,
    pub abandoned_seeks: u64,
    pub conversions: u64,
    pub promotions: u64,
    pub trades: u64,
    pub interactions: u64,
    pub constructions_completed: u64,
    pub production_cycles: u64,
    pub deliveries: u64,
    pub restocks: u64,
    pub missed_maintenance: u64,
    /// Served visits per need, indexed by [`NeedType::index`]
    pub visits_served: [u64; NeedType::COUNT],
    pub visits_unavailable: u64,
    pub visits_unaffordable: u64,
}

impl EventTally {
    pub fn observe(&mut self, events: &[SimulationEvent]) {
        for event in events {
            match event {
                SimulationEvent::DestinationRequested { .. } => self.destination_requests += 1,
                SimulationEvent::AteAtHome { .. } => self.home_meals += 1,
                SimulationEvent::GaveUpSeeking { .. } => self.abandoned_seeks += 1,
                SimulationEvent::Converted { .. } => self.conversions += 1,
                SimulationEvent::Promoted { .. } => self.promotions += 1,
                SimulationEvent::Traded { .. } => self.trades += 1,
                SimulationEvent::Interacted { .. } => self.interactions += 1,
                SimulationEvent::ConstructionCompleted { .. } => self.constructions_completed += 1,
                SimulationEvent::Produced { .. } => self.production_cycles += 1,
                SimulationEvent::Delivered(_) => self.deliveries += 1,
                SimulationEvent::Restocked(_) => self.restocks += 1,
                SimulationEvent::MaintenanceMissed { .. } => self.missed_maintenance += 1,
                SimulationEvent::WorkerAssigned { .. }
                | SimulationEvent::WorkerReleased { .. }
                | SimulationEvent::StatsRecorded { .. } => {}
            }
        }
    }

    pub fn observe_arrival(&mut self, outcome: &ArrivalOutcome) {
        match outcome {
            ArrivalOutcome::Served { need, .. } => self.visits_served[need.index()] += 1,
            ArrivalOutcome::Unavailable => self.visits_unavailable += 1,
            ArrivalOutcome::Unaffordable => self.visits_unaffordable += 1,
            ArrivalOutcome::NotSeeking | ArrivalOutcome::WrongTarget => {}
        }
    }

    pub fn total_served(&self) -> u64 {
        self.visits_served.iter().sum()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceQuote {
    pub resource: ResourceType,
    pub price: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub id: BuildingId,
    pub building_type: BuildingType,
    pub state: BuildingState,
    pub level: u32,
    pub workers: usize,
    pub funds: f32,
    pub efficiency: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunStatistics {
    pub ticks: Tick,
    pub simulated_time: f64,
    pub simulation_time_ms: u64,
    pub social_events_total: u64,
    pub events: EventTally,
}

/// Complete output of a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationReport {
    pub final_stats: SocietyStats,
    pub history: Vec<SocietyStats>,
    pub social_events: Vec<SocialEvent>,
    pub prices: Vec<PriceQuote>,
    pub buildings: Vec<BuildingSummary>,
    pub statistics: RunStatistics,
}

impl SimulationReport {
    pub fn new(world: &World, tally: EventTally, elapsed: Duration) -> Self {
        let buildings = &world.buildings;
        Self {
            final_stats: world.collect_stats(),
            history: world.aggregator.history().cloned().collect(),
            social_events: world.social_events.iter().cloned().collect(),
            prices: world
                .market
                .iter()
                .map(|e| PriceQuote { resource: e.resource, price: e.price })
                .collect(),
            buildings: (0..buildings.count())
                .map(|i| BuildingSummary {
                    id: buildings.ids[i],
                    building_type: buildings.building_types[i],
                    state: buildings.states[i],
                    level: buildings.levels[i],
                    workers: buildings.workers[i].len(),
                    funds: buildings.funds[i],
                    efficiency: buildings.efficiencies[i],
                })
                .collect(),
            statistics: RunStatistics {
                ticks: world.clock.tick,
                simulated_time: world.clock.elapsed,
                simulation_time_ms: elapsed.as_millis() as u64,
                social_events_total: world.social_events.total(),
                events: tally,
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let s = &self.final_stats;
        let e = &self.statistics.events;
        format!(
            "Simulated {} ticks in {}ms\n\
             population {} ({} employed, {} critical needs), happiness {:.1}, wealth {:.0} avg, gini {:.3}\n\
             stability {:.1}, conflict {:.1}, innovation {:.1}, diversity {:.1}\n\
             {} trades, {} interactions, {} promotions, {} production cycles, {} social events\n\
             {} visits served, {} unavailable, {} unaffordable, {} restocks",
            self.statistics.ticks,
            self.statistics.simulation_time_ms,
            s.population,
            s.employed,
            s.critical_needs,
            s.average_happiness,
            s.average_wealth,
            s.gini,
            s.social_stability,
            s.conflict_level,
            s.innovation_index,
            s.cultural_diversity,
            e.trades,
            e.interactions,
            e.promotions,
            e.production_cycles,
            self.statistics.social_events_total,
            e.total_served(),
            e.visits_unavailable,
            e.visits_unaffordable,
            e.restocks,
        )
    }
}
