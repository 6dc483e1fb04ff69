//! Production system - processes building production cycles
//!
//! Each operating building accumulates time toward its production cycle.
//! On completion every resource it produces is made, provided one unit of
//! each of that resource's components is in storage. Output scales with
//! staffing efficiency and upgrade level.

use crate::city::building::{BuildingArchetype, BuildingId};
use crate::core::types::{AgentId, EPSILON};
use crate::economy::catalog::{ResourceCatalog, ResourceType};
use crate::economy::market::Market;
use crate::entity::skills::SkillType;

/// Skill practice per cycle, scaled by efficiency
pub const PRACTICE_PER_CYCLE: f32 = 0.1;

/// Stock level buildings try to keep of each accepted input
pub const INPUT_TARGET: f32 = 10.0;

/// Output quality bounds; quality follows staffing efficiency
pub const MIN_QUALITY: f32 = 0.5;
pub const MAX_QUALITY: f32 = 1.5;

/// Served units a facility can buy in per unit of time
pub const RESTOCK_RATE: f32 = 2.0;

/// Fraction of the market price a facility pays for restocked units
pub const WHOLESALE_DISCOUNT: f32 = 0.5;

/// Result of a single production cycle completion
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionResult {
    /// Index of the building that completed production
    pub building_idx: usize,
    pub building_id: BuildingId,
    /// Amount stored per produced resource
    pub produced: Vec<(ResourceType, f32)>,
    /// Workers who should practice
    pub workers: Vec<AgentId>,
    /// Skill practice each worker receives
    pub practice: Vec<(SkillType, f32)>,
}

/// Process production for all operating buildings
///
/// Efficiencies must be current; see [`BuildingArchetype::refresh_efficiency`].
pub fn tick_production(
    buildings: &mut BuildingArchetype,
    catalog: &ResourceCatalog,
    dt: f32,
) -> Vec<ProductionResult> {
    let mut results = Vec::new();
    let operating: Vec<usize> = buildings.iter_operating().collect();

    for i in operating {
        let building_type = buildings.building_types[i];
        let cycle = building_type.production_time();
        if cycle <= 0.0 {
            continue;
        }

        buildings.production_timers[i] += dt;
        if buildings.production_timers[i] < cycle {
            continue;
        }
        buildings.production_timers[i] -= cycle;

        let efficiency = buildings.efficiencies[i];
        if efficiency <= 0.0 {
            continue;
        }
        let output = efficiency * buildings.level_multiplier(i);
        let quality = efficiency.clamp(MIN_QUALITY, MAX_QUALITY);

        let mut produced = Vec::new();
        for resource in building_type.produced_resources() {
            let inputs: Vec<(ResourceType, f32)> =
                catalog.components(resource).iter().map(|(c, _)| (*c, 1.0)).collect();
            let inventory = &mut buildings.inventories[i];
            if !inventory.consume_materials(&inputs) {
                continue;
            }
            let stored = inventory.add_with_quality(resource, output, quality);
            if stored > 0.0 {
                produced.push((resource, stored));
            }
        }

        if produced.is_empty() {
            continue;
        }

        results.push(ProductionResult {
            building_idx: i,
            building_id: buildings.ids[i],
            produced,
            workers: buildings.workers[i].clone(),
            practice: building_type
                .required_skills()
                .into_iter()
                .map(|(skill, _)| (skill, PRACTICE_PER_CYCLE * efficiency))
                .collect(),
        });
    }

    results
}

/// A delivery of inputs between buildings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delivery {
    pub from: BuildingId,
    pub to: BuildingId,
    pub resource: ResourceType,
    pub amount: f32,
    pub paid: f32,
}

/// Restock accepted inputs from producing buildings, paid at market price
///
/// Buildings are served in index order; suppliers are the first operating
/// producers holding the resource.
pub fn distribute_inputs(buildings: &mut BuildingArchetype, market: &mut Market) -> Vec<Delivery> {
    let mut deliveries = Vec::new();
    let operating: Vec<usize> = buildings.iter_operating().collect();

    for &to in &operating {
        for resource in buildings.building_types[to].accepted_resources() {
            let held = buildings.inventories[to].get(resource);
            let mut wanted = (INPUT_TARGET - held).min(buildings.inventories[to].space_for(resource));
            if wanted <= EPSILON {
                continue;
            }

            for &from in &operating {
                if from == to
                    || !buildings.building_types[from].produced_resources().contains(&resource)
                {
                    continue;
                }
                let price = market.price(resource);
                let affordable = buildings.funds[to] / price.max(EPSILON);
                let amount = wanted.min(buildings.inventories[from].get(resource)).min(affordable);
                if amount <= EPSILON {
                    continue;
                }

                let quality = buildings.inventories[from].entry(resource).quality;
                let taken = buildings.inventories[from].remove(resource, amount);
                let stored = buildings.inventories[to].add_with_quality(resource, taken, quality);
                let paid = stored * price;
                buildings.funds[to] -= paid;
                buildings.funds[from] += paid;
                market.record_trade(resource, stored);

                deliveries.push(Delivery {
                    from: buildings.ids[from],
                    to: buildings.ids[to],
                    resource,
                    amount: stored,
                    paid,
                });

                wanted -= stored;
                if wanted <= EPSILON {
                    break;
                }
            }
        }
    }

    deliveries
}

/// Served units bought in by a facility below its reserve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Restock {
    pub building: BuildingId,
    pub resource: ResourceType,
    pub amount: f32,
    pub paid: f32,
}

/// Buy served resources for operating facilities below their reserve
///
/// Purchases are capped by [`RESTOCK_RATE`] and by the facility's funds, and
/// are booked against market supply.
pub fn restock_services(buildings: &mut BuildingArchetype, market: &mut Market, dt: f32) -> Vec<Restock> {
    let mut restocks = Vec::new();
    let operating: Vec<usize> = buildings.iter_operating().collect();

    for idx in operating {
        let Some((resource, reserve)) = buildings.building_types[idx].service_reserve() else {
            continue;
        };
        let unit_cost = (market.price(resource) * WHOLESALE_DISCOUNT).max(EPSILON);
        let shortfall = (reserve - buildings.inventories[idx].get(resource))
            .min(RESTOCK_RATE * dt)
            .min(buildings.funds[idx] / unit_cost);
        if shortfall <= EPSILON {
            continue;
        }

        let stored = buildings.inventories[idx].add(resource, shortfall);
        let paid = (stored * unit_cost).min(buildings.funds[idx]);
        buildings.funds[idx] -= paid;
        market.record_purchase(resource, stored);
        restocks.push(Restock { building: buildings.ids[idx], resource, amount: stored, paid });
    }

    restocks
}
