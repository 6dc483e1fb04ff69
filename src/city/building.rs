//! Building archetype with SoA layout

use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::types::{AgentId, Tick, Vec2};
use crate::economy::catalog::{ResourceCatalog, ResourceType};
use crate::economy::inventory::Inventory;
use crate::entity::skills::SkillType;

/// Type of building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingType {
    House,
    Warehouse,
    Market,
    Farm,
    Mine,
    Quarry,
    WoodCutter,
    Well,
    PowerPlant,
    Factory,
    Workshop,
    Forge,
    Restaurant,
    Hospital,
    School,
    Theater,
    Library,
    SocialCenter,
    Laboratory,
    ResearchCenter,
}

impl BuildingType {
    pub const ALL: [BuildingType; 20] = [
        BuildingType::House,
        BuildingType::Warehouse,
        BuildingType::Market,
        BuildingType::Farm,
        BuildingType::Mine,
        BuildingType::Quarry,
        BuildingType::WoodCutter,
        BuildingType::Well,
        BuildingType::PowerPlant,
        BuildingType::Factory,
        BuildingType::Workshop,
        BuildingType::Forge,
        BuildingType::Restaurant,
        BuildingType::Hospital,
        BuildingType::School,
        BuildingType::Theater,
        BuildingType::Library,
        BuildingType::SocialCenter,
        BuildingType::Laboratory,
        BuildingType::ResearchCenter,
    ];

    /// Parse a snake_case or lowercase building name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('_', "").as_str() {
            "house" => Some(BuildingType::House),
            "warehouse" => Some(BuildingType::Warehouse),
            "market" => Some(BuildingType::Market),
            "farm" => Some(BuildingType::Farm),
            "mine" => Some(BuildingType::Mine),
            "quarry" => Some(BuildingType::Quarry),
            "woodcutter" => Some(BuildingType::WoodCutter),
            "well" => Some(BuildingType::Well),
            "powerplant" => Some(BuildingType::PowerPlant),
            "factory" => Some(BuildingType::Factory),
            "workshop" => Some(BuildingType::Workshop),
            "forge" => Some(BuildingType::Forge),
            "restaurant" => Some(BuildingType::Restaurant),
            "hospital" => Some(BuildingType::Hospital),
            "school" => Some(BuildingType::School),
            "theater" => Some(BuildingType::Theater),
            "library" => Some(BuildingType::Library),
            "socialcenter" => Some(BuildingType::SocialCenter),
            "laboratory" => Some(BuildingType::Laboratory),
            "researchcenter" => Some(BuildingType::ResearchCenter),
            _ => None,
        }
    }

    /// Maximum workers that can contribute effectively
    pub fn max_workers(&self) -> u32 {
        match self {
            BuildingType::House => 0,
            BuildingType::Warehouse => 2,
            BuildingType::Market => 4,
            BuildingType::Farm => 5,
            BuildingType::Mine => 6,
            BuildingType::Quarry => 5,
            BuildingType::WoodCutter => 4,
            BuildingType::Well => 1,
            BuildingType::PowerPlant => 4,
            BuildingType::Factory => 10,
            BuildingType::Workshop => 4,
            BuildingType::Forge => 3,
            BuildingType::Restaurant => 4,
            BuildingType::Hospital => 6,
            BuildingType::School => 5,
            BuildingType::Theater => 5,
            BuildingType::Library => 3,
            BuildingType::SocialCenter => 3,
            BuildingType::Laboratory => 5,
            BuildingType::ResearchCenter => 8,
        }
    }

    /// Minimum skill levels a worker needs
    pub fn required_skills(&self) -> Vec<(SkillType, f32)> {
        match self {
            BuildingType::House | BuildingType::Well => vec![],
            BuildingType::Warehouse => vec![(SkillType::PhysicalLabor, 0.1)],
            BuildingType::Market => vec![(SkillType::Communication, 0.2)],
            BuildingType::Farm => vec![(SkillType::Farming, 0.3)],
            BuildingType::Mine => vec![(SkillType::PhysicalLabor, 0.3)],
            BuildingType::Quarry | BuildingType::WoodCutter => {
                vec![(SkillType::PhysicalLabor, 0.2)]
            }
            BuildingType::PowerPlant => vec![(SkillType::Engineering, 0.3)],
            BuildingType::Factory => vec![(SkillType::Manufacturing, 0.5)],
            BuildingType::Workshop => vec![(SkillType::Manufacturing, 0.3)],
            BuildingType::Forge => vec![
                (SkillType::Manufacturing, 0.4),
                (SkillType::PhysicalLabor, 0.3),
            ],
            BuildingType::Restaurant => vec![(SkillType::Cooking, 0.4)],
            BuildingType::Hospital => vec![(SkillType::Medicine, 0.3)],
            BuildingType::School => vec![(SkillType::Teaching, 0.4)],
            BuildingType::Theater => vec![(SkillType::Art, 0.3)],
            BuildingType::Library => vec![(SkillType::Research, 0.2)],
            BuildingType::SocialCenter => vec![(SkillType::Communication, 0.2)],
            BuildingType::Laboratory => vec![(SkillType::Research, 0.4)],
            BuildingType::ResearchCenter => vec![
                (SkillType::Research, 0.6),
                (SkillType::Engineering, 0.4),
            ],
        }
    }

    /// Time between production cycles; 0 means the building never produces
    pub fn production_time(&self) -> f32 {
        match self {
            BuildingType::House
            | BuildingType::Warehouse
            | BuildingType::Market
            | BuildingType::SocialCenter => 0.0,
            BuildingType::Well => 2.0,
            BuildingType::Restaurant => 2.0,
            BuildingType::Factory
            | BuildingType::Workshop
            | BuildingType::PowerPlant
            | BuildingType::Theater => 3.0,
            BuildingType::WoodCutter | BuildingType::Forge | BuildingType::Hospital => 4.0,
            BuildingType::Farm | BuildingType::Quarry | BuildingType::Library => 5.0,
            BuildingType::Mine | BuildingType::School | BuildingType::Laboratory => 6.0,
            BuildingType::ResearchCenter => 8.0,
        }
    }

    /// Funds consumed per unit of time
    pub fn maintenance_cost(&self) -> f32 {
        match self {
            BuildingType::Well => 0.02,
            BuildingType::House | BuildingType::Warehouse => 0.05,
            BuildingType::WoodCutter | BuildingType::Library | BuildingType::SocialCenter => 0.08,
            BuildingType::Market | BuildingType::Farm | BuildingType::Quarry => 0.1,
            BuildingType::Workshop => 0.1,
            BuildingType::Forge => 0.12,
            BuildingType::Mine
            | BuildingType::Restaurant
            | BuildingType::School
            | BuildingType::Theater => 0.15,
            BuildingType::Factory | BuildingType::PowerPlant => 0.2,
            BuildingType::Hospital => 0.25,
            BuildingType::Laboratory => 0.3,
            BuildingType::ResearchCenter => 0.4,
        }
    }

    /// Combined goods the building can hold
    pub fn storage_capacity(&self) -> f32 {
        match self {
            BuildingType::SocialCenter => 100.0,
            BuildingType::House | BuildingType::School | BuildingType::Theater => 200.0,
            BuildingType::Restaurant
            | BuildingType::Hospital
            | BuildingType::Library
            | BuildingType::Laboratory => 300.0,
            BuildingType::Workshop | BuildingType::Forge => 400.0,
            BuildingType::Farm | BuildingType::Well | BuildingType::ResearchCenter => 500.0,
            BuildingType::WoodCutter => 600.0,
            BuildingType::Mine | BuildingType::Quarry => 800.0,
            BuildingType::Market | BuildingType::Factory | BuildingType::PowerPlant => 1000.0,
            BuildingType::Warehouse => 5000.0,
        }
    }

    /// Resources the building takes deliveries of
    pub fn accepted_resources(&self) -> Vec<ResourceType> {
        use ResourceType as R;
        match self {
            BuildingType::House => vec![R::Food, R::Water],
            BuildingType::Warehouse => vec![
                R::Food,
                R::Water,
                R::Wood,
                R::Stone,
                R::Metal,
                R::RawMaterial,
                R::ProcessedMaterial,
                R::Tools,
                R::Clothes,
            ],
            BuildingType::Market => vec![R::Food, R::Water, R::ProcessedFood, R::Tools, R::Clothes],
            BuildingType::Farm => vec![R::Water],
            BuildingType::Mine | BuildingType::Quarry | BuildingType::WoodCutter => vec![R::Tools],
            BuildingType::Well | BuildingType::School | BuildingType::Theater => vec![],
            BuildingType::Library | BuildingType::SocialCenter => vec![],
            BuildingType::PowerPlant => vec![R::Wood],
            BuildingType::Factory => vec![R::RawMaterial],
            BuildingType::Workshop | BuildingType::Forge => vec![R::Metal, R::Wood],
            BuildingType::Restaurant => vec![R::Food, R::Water],
            BuildingType::Hospital => vec![R::Water, R::Energy],
            BuildingType::Laboratory | BuildingType::ResearchCenter => vec![R::Energy],
        }
    }

    /// Resources produced each cycle
    pub fn produced_resources(&self) -> Vec<ResourceType> {
        use ResourceType as R;
        match self {
            BuildingType::House
            | BuildingType::Warehouse
            | BuildingType::Market
            | BuildingType::SocialCenter => vec![],
            BuildingType::Farm => vec![R::Food, R::RawMaterial],
            BuildingType::Mine => vec![R::Metal, R::Stone],
            BuildingType::Quarry => vec![R::Stone],
            BuildingType::WoodCutter => vec![R::Wood],
            BuildingType::Well => vec![R::Water],
            BuildingType::PowerPlant => vec![R::Energy],
            BuildingType::Factory => vec![R::ProcessedMaterial, R::Clothes],
            BuildingType::Workshop | BuildingType::Forge => vec![R::Tools],
            BuildingType::Restaurant => vec![R::ProcessedFood],
            BuildingType::Hospital => vec![R::Medicine],
            BuildingType::School | BuildingType::Laboratory | BuildingType::ResearchCenter => {
                vec![R::Knowledge]
            }
            BuildingType::Theater => vec![R::Entertainment],
            BuildingType::Library => vec![R::Culture, R::Knowledge],
        }
    }

    /// Time needed to build with no extra workers
    pub fn construction_time(&self) -> f32 {
        match self {
            BuildingType::Well => 20.0,
            BuildingType::House | BuildingType::WoodCutter | BuildingType::SocialCenter => 30.0,
            BuildingType::Market | BuildingType::Workshop | BuildingType::Restaurant => 35.0,
            BuildingType::Warehouse
            | BuildingType::Farm
            | BuildingType::Quarry
            | BuildingType::Forge
            | BuildingType::Library => 40.0,
            BuildingType::Theater => 45.0,
            BuildingType::Mine | BuildingType::PowerPlant | BuildingType::School => 50.0,
            BuildingType::Factory | BuildingType::Hospital | BuildingType::Laboratory => 60.0,
            BuildingType::ResearchCenter => 80.0,
        }
    }

    /// Happiness granted to a visitor whose need was served
    pub fn happiness_bonus(&self) -> f32 {
        match self {
            BuildingType::Restaurant => 10.0,
            BuildingType::Theater => 8.0,
            BuildingType::SocialCenter | BuildingType::Library => 6.0,
            BuildingType::House | BuildingType::Hospital => 5.0,
            BuildingType::Market => 2.0,
            BuildingType::School => 1.0,
            _ => 0.0,
        }
    }

    /// Served resource a facility opens with and keeps restocking toward
    pub fn service_reserve(&self) -> Option<(ResourceType, f32)> {
        match self {
            BuildingType::Restaurant => Some((ResourceType::ProcessedFood, 20.0)),
            BuildingType::Theater => Some((ResourceType::Entertainment, 20.0)),
            BuildingType::Hospital => Some((ResourceType::Medicine, 10.0)),
            BuildingType::Library => Some((ResourceType::Culture, 10.0)),
            _ => None,
        }
    }
}

/// Current state of a building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingState {
    /// Construction site - not yet usable
    UnderConstruction,
    /// Producing and serving visitors
    Operating,
    /// Being extended to the next level; keeps its workers but does not produce
    Upgrading,
    /// Needs repair before use
    Damaged,
    /// Permanently out of use
    Abandoned,
}

impl BuildingState {
    /// Externally requested transitions
    ///
    /// Completion of construction and of an upgrade happen internally.
    pub fn can_transition(self, to: BuildingState) -> bool {
        use BuildingState::*;
        matches!(
            (self, to),
            (UnderConstruction, Abandoned)
                | (Operating, Upgrading)
                | (Operating, Damaged)
                | (Operating, Abandoned)
                | (Upgrading, Damaged)
                | (Upgrading, Abandoned)
                | (Damaged, Operating)
                | (Damaged, Abandoned)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildingError {
    #[error("cannot go from {from:?} to {to:?}")]
    InvalidTransition { from: BuildingState, to: BuildingState },

    #[error("building is {0:?}, not operating")]
    NotOperating(BuildingState),

    #[error("all {0} worker slots taken")]
    Full(u32),

    #[error("worker already assigned")]
    AlreadyAssigned,

    #[error("worker lacks required skills")]
    Unqualified,
}

/// Unique building identifier
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "B{:016x}", _0)]
pub struct BuildingId(pub u64);

impl BuildingId {
    /// Create a new unique BuildingId using UUID
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_u128() as u64)
    }

    /// Draw an id from a seeded generator so runs are reproducible
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen())
    }
}

impl Default for BuildingId {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of applying construction or upgrade work
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContributionResult {
    /// Work contributed, building still in progress
    InProgress { progress: f32 },
    /// Work contributed, building is now operating
    Completed,
    /// Building is not under construction or upgrading
    NotApplicable,
}

/// `workers / max` below full staffing, 1.0 at or above it
pub fn staffing_efficiency(workers: u32, max_workers: u32) -> f32 {
    if max_workers == 0 {
        return 1.0;
    }
    (workers.min(max_workers) as f32) / max_workers as f32
}

/// Staffing efficiency with the skill bonus applied at full staffing
///
/// `skill_surplus` is the sum over workers and required skills of
/// `max(0, level - required)`.
pub fn compute_efficiency(workers: u32, max_workers: u32, skill_surplus: f32) -> f32 {
    if workers < max_workers {
        staffing_efficiency(workers, max_workers)
    } else {
        1.0 + skill_surplus.max(0.0) * 0.1
    }
}

/// Output bonus per upgrade level above the first
pub const LEVEL_BONUS: f32 = 0.1;

/// Efficiency multiplier while the last maintenance payment is missing
pub const UNPAID_UPKEEP_FACTOR: f32 = 0.9;

/// Structure of Arrays for building entities
#[derive(Debug, Clone, Default)]
pub struct BuildingArchetype {
    /// Unique identifiers
    pub ids: Vec<BuildingId>,
    /// Type of each building
    pub building_types: Vec<BuildingType>,
    /// Current state
    pub states: Vec<BuildingState>,
    /// Position in world
    pub positions: Vec<Vec2>,
    /// Construction progress (0.0 to 1.0)
    pub construction_progress: Vec<f32>,
    /// Upgrade progress (0.0 to 1.0)
    pub upgrade_progress: Vec<f32>,
    /// Upgrade level, starting at 1
    pub levels: Vec<u32>,
    /// Stored goods
    pub inventories: Vec<Inventory>,
    /// Money available for maintenance and purchases
    pub funds: Vec<f32>,
    /// Assigned workers
    pub workers: Vec<Vec<AgentId>>,
    /// Current output multiplier
    pub efficiencies: Vec<f32>,
    /// Efficiency multiplier from the last maintenance payment (1.0 = paid)
    pub upkeep_factors: Vec<f32>,
    /// Time accumulated toward the next production cycle
    pub production_timers: Vec<f32>,
    /// Tick when construction started
    pub started_ticks: Vec<Tick>,
    /// Tick when completed (0 if not complete)
    pub completed_ticks: Vec<Tick>,
}

impl BuildingArchetype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Spawn a new building (starts as construction site)
    pub fn spawn(
        &mut self,
        id: BuildingId,
        building_type: BuildingType,
        position: Vec2,
        tick: Tick,
        catalog: &ResourceCatalog,
        funds: f32,
    ) -> usize {
        let index = self.ids.len();
        self.ids.push(id);
        self.building_types.push(building_type);
        self.states.push(BuildingState::UnderConstruction);
        self.positions.push(position);
        self.construction_progress.push(0.0);
        self.upgrade_progress.push(0.0);
        self.levels.push(1);
        self.inventories
            .push(Inventory::new(catalog).with_total_capacity(building_type.storage_capacity()));
        self.funds.push(funds.max(0.0));
        self.workers.push(Vec::new());
        self.efficiencies.push(0.0);
        self.upkeep_factors.push(1.0);
        self.production_timers.push(0.0);
        self.started_ticks.push(tick);
        self.completed_ticks.push(0);
        index
    }

    pub fn index_of(&self, id: BuildingId) -> Option<usize> {
        self.ids.iter().position(|&b| b == id)
    }

    /// Iterate over sites that take construction work, upgrades included
    pub fn iter_under_construction(&self) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, BuildingState::UnderConstruction | BuildingState::Upgrading))
            .map(|(i, _)| i)
    }

    /// Iterate over operating buildings
    pub fn iter_operating(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter_in_state(BuildingState::Operating)
    }

    pub fn iter_in_state(&self, state: BuildingState) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(move |(_, s)| **s == state)
            .map(|(i, _)| i)
    }

    /// Request an external state change
    ///
    /// Abandoning a building releases all of its workers; read them first if
    /// they need to be notified.
    pub fn transition(&mut self, index: usize, to: BuildingState) -> Result<(), BuildingError> {
        let from = self.states[index];
        if !from.can_transition(to) {
            return Err(BuildingError::InvalidTransition { from, to });
        }
        match to {
            BuildingState::Abandoned => {
                self.workers[index].clear();
                self.efficiencies[index] = 0.0;
            }
            BuildingState::Upgrading => self.upgrade_progress[index] = 0.0,
            BuildingState::Operating => self.production_timers[index] = 0.0,
            _ => {}
        }
        self.states[index] = to;
        Ok(())
    }

    /// Apply construction or upgrade work, measured in units of time
    ///
    /// Construction completes after `construction_time` units; an upgrade
    /// after half of that.
    pub fn advance_construction(
        &mut self,
        index: usize,
        work: f32,
        current_tick: Tick,
    ) -> ContributionResult {
        let building_type = self.building_types[index];
        match self.states[index] {
            BuildingState::UnderConstruction => {
                let progress = &mut self.construction_progress[index];
                *progress = (*progress + work / building_type.construction_time()).min(1.0);
                if *progress >= 1.0 {
                    self.states[index] = BuildingState::Operating;
                    self.completed_ticks[index] = current_tick;
                    ContributionResult::Completed
                } else {
                    ContributionResult::InProgress { progress: *progress }
                }
            }
            BuildingState::Upgrading => {
                let progress = &mut self.upgrade_progress[index];
                *progress = (*progress + work / (building_type.construction_time() * 0.5)).min(1.0);
                if *progress >= 1.0 {
                    self.levels[index] += 1;
                    self.upgrade_progress[index] = 0.0;
                    self.states[index] = BuildingState::Operating;
                    ContributionResult::Completed
                } else {
                    ContributionResult::InProgress { progress: *progress }
                }
            }
            _ => ContributionResult::NotApplicable,
        }
    }

    pub fn has_resource(&self, index: usize, resource: ResourceType, amount: f32) -> bool {
        self.inventories[index].has(resource, amount)
    }

    /// Whether a delivery of `amount` would be taken in full
    pub fn can_accept_resource(&self, index: usize, resource: ResourceType, amount: f32) -> bool {
        self.states[index] != BuildingState::Abandoned
            && self.building_types[index].accepted_resources().contains(&resource)
            && self.inventories[index].space_for(resource) >= amount
    }

    /// Take `amount` out of storage, all or nothing
    pub fn request_resource(&mut self, index: usize, resource: ResourceType, amount: f32) -> bool {
        self.inventories[index].consume(resource, amount)
    }

    /// Deliver an accepted resource, returns amount actually stored
    pub fn add_resource(&mut self, index: usize, resource: ResourceType, amount: f32) -> f32 {
        if self.states[index] == BuildingState::Abandoned
            || !self.building_types[index].accepted_resources().contains(&resource)
        {
            return 0.0;
        }
        self.inventories[index].add(resource, amount)
    }

    /// Top a facility's served resource up to its reserve, returns amount stored
    ///
    /// Bypasses the accepted-input list: the served resource is the
    /// facility's own stock, not a delivery.
    pub fn stock_service_reserve(&mut self, index: usize) -> f32 {
        let Some((resource, reserve)) = self.building_types[index].service_reserve() else {
            return 0.0;
        };
        if self.states[index] == BuildingState::Abandoned {
            return 0.0;
        }
        let shortfall = reserve - self.inventories[index].get(resource);
        if shortfall <= 0.0 {
            return 0.0;
        }
        self.inventories[index].add(resource, shortfall)
    }

    pub fn deposit(&mut self, index: usize, amount: f32) {
        self.funds[index] += amount.max(0.0);
    }

    /// Spend funds if available
    pub fn withdraw(&mut self, index: usize, amount: f32) -> bool {
        if amount < 0.0 || self.funds[index] < amount {
            return false;
        }
        self.funds[index] -= amount;
        true
    }

    pub fn assign_worker(&mut self, index: usize, worker: AgentId) -> Result<(), BuildingError> {
        let state = self.states[index];
        if state != BuildingState::Operating {
            return Err(BuildingError::NotOperating(state));
        }
        let max = self.building_types[index].max_workers();
        let workers = &mut self.workers[index];
        if workers.contains(&worker) {
            return Err(BuildingError::AlreadyAssigned);
        }
        if workers.len() as u32 >= max {
            return Err(BuildingError::Full(max));
        }
        workers.push(worker);
        Ok(())
    }

    pub fn unassign_worker(&mut self, index: usize, worker: AgentId) -> bool {
        let workers = &mut self.workers[index];
        let before = workers.len();
        workers.retain(|w| *w != worker);
        workers.len() != before
    }

    pub fn worker_count(&self, index: usize) -> u32 {
        self.workers[index].len() as u32
    }

    pub fn has_vacancy(&self, index: usize) -> bool {
        self.states[index] == BuildingState::Operating
            && self.worker_count(index) < self.building_types[index].max_workers()
    }

    /// Deduct maintenance for `dt`
    ///
    /// A missed payment costs 10% efficiency until the next successful one;
    /// repeated misses do not compound.
    pub fn pay_maintenance(&mut self, index: usize, dt: f32) -> bool {
        let cost = self.building_types[index].maintenance_cost() * dt;
        let paid = self.withdraw(index, cost);
        self.upkeep_factors[index] = if paid { 1.0 } else { UNPAID_UPKEEP_FACTOR };
        paid
    }

    /// Recompute efficiency from staffing, worker skill surplus and upkeep
    pub fn refresh_efficiency(&mut self, index: usize, skill_surplus: f32) -> f32 {
        let efficiency = if self.states[index] == BuildingState::Operating {
            compute_efficiency(
                self.worker_count(index),
                self.building_types[index].max_workers(),
                skill_surplus,
            ) * self.upkeep_factors[index]
        } else {
            0.0
        };
        self.efficiencies[index] = efficiency;
        efficiency
    }

    /// Output multiplier from upgrade level
    pub fn level_multiplier(&self, index: usize) -> f32 {
        1.0 + (self.levels[index].saturating_sub(1)) as f32 * LEVEL_BONUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_operating(buildings: &mut BuildingArchetype, t: BuildingType) -> usize {
        let catalog = ResourceCatalog::with_defaults();
        let idx = buildings.spawn(BuildingId::new(), t, Vec2::new(0.0, 0.0), 0, &catalog, 100.0);
        buildings.advance_construction(idx, t.construction_time(), 0);
        idx
    }

    #[test]
    fn test_staffing_efficiency() {
        assert_eq!(staffing_efficiency(0, 5), 0.0);
        assert_eq!(staffing_efficiency(5, 5), 1.0);
        assert!((staffing_efficiency(2, 5) - 0.4).abs() < 1e-6);
        assert_eq!(compute_efficiency(5, 5, 0.0), 1.0);
        assert!((compute_efficiency(5, 5, 2.0) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_construction_completes_at_full_progress() {
        let catalog = ResourceCatalog::with_defaults();
        let mut buildings = BuildingArchetype::new();
        let idx = buildings.spawn(BuildingId::new(), BuildingType::Well, Vec2::default(), 0, &catalog, 0.0);

        // Well takes 20 units
        let result = buildings.advance_construction(idx, 10.0, 5);
        assert!(matches!(result, ContributionResult::InProgress { .. }));
        assert!((buildings.construction_progress[idx] - 0.5).abs() < 1e-6);

        let result = buildings.advance_construction(idx, 10.0, 10);
        assert_eq!(result, ContributionResult::Completed);
        assert_eq!(buildings.states[idx], BuildingState::Operating);
        assert_eq!(buildings.completed_ticks[idx], 10);

        let result = buildings.advance_construction(idx, 10.0, 11);
        assert_eq!(result, ContributionResult::NotApplicable);
    }

    #[test]
    fn test_upgrade_raises_level() {
        let mut buildings = BuildingArchetype::new();
        let idx = spawn_operating(&mut buildings, BuildingType::Farm);
        buildings.transition(idx, BuildingState::Upgrading).unwrap();
        let result = buildings.advance_construction(idx, 20.0, 1);
        assert_eq!(result, ContributionResult::Completed);
        assert_eq!(buildings.levels[idx], 2);
        assert_eq!(buildings.states[idx], BuildingState::Operating);
        assert!((buildings.level_multiplier(idx) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_construction_sites_include_upgrades() {
        let catalog = ResourceCatalog::with_defaults();
        let mut buildings = BuildingArchetype::new();
        let site = buildings.spawn(BuildingId::new(), BuildingType::Well, Vec2::default(), 0, &catalog, 0.0);
        let upgrading = spawn_operating(&mut buildings, BuildingType::Farm);
        let operating = spawn_operating(&mut buildings, BuildingType::Farm);
        buildings.transition(upgrading, BuildingState::Upgrading).unwrap();

        let sites: Vec<usize> = buildings.iter_under_construction().collect();
        assert_eq!(sites, vec![site, upgrading]);
        assert!(!sites.contains(&operating));
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let catalog = ResourceCatalog::with_defaults();
        let mut buildings = BuildingArchetype::new();
        let idx = buildings.spawn(BuildingId::new(), BuildingType::Farm, Vec2::default(), 0, &catalog, 0.0);

        assert!(buildings.transition(idx, BuildingState::Operating).is_err());
        assert!(buildings.transition(idx, BuildingState::Upgrading).is_err());
        buildings.transition(idx, BuildingState::Abandoned).unwrap();
        assert_eq!(
            buildings.transition(idx, BuildingState::Operating),
            Err(BuildingError::InvalidTransition {
                from: BuildingState::Abandoned,
                to: BuildingState::Operating
            })
        );
    }

    #[test]
    fn test_damage_and_repair() {
        let mut buildings = BuildingArchetype::new();
        let idx = spawn_operating(&mut buildings, BuildingType::Restaurant);
        buildings.transition(idx, BuildingState::Damaged).unwrap();
        assert!(buildings.assign_worker(idx, AgentId::new()).is_err());
        buildings.transition(idx, BuildingState::Operating).unwrap();
        assert!(buildings.assign_worker(idx, AgentId::new()).is_ok());
    }

    #[test]
    fn test_worker_assignment_limits() {
        let mut buildings = BuildingArchetype::new();
        let idx = spawn_operating(&mut buildings, BuildingType::Forge);
        let first = AgentId::new();
        buildings.assign_worker(idx, first).unwrap();
        assert_eq!(buildings.assign_worker(idx, first), Err(BuildingError::AlreadyAssigned));
        buildings.assign_worker(idx, AgentId::new()).unwrap();
        buildings.assign_worker(idx, AgentId::new()).unwrap();
        assert_eq!(buildings.assign_worker(idx, AgentId::new()), Err(BuildingError::Full(3)));

        assert!(buildings.unassign_worker(idx, first));
        assert!(!buildings.unassign_worker(idx, first));
        assert_eq!(buildings.worker_count(idx), 2);
    }

    #[test]
    fn test_abandon_releases_workers() {
        let mut buildings = BuildingArchetype::new();
        let idx = spawn_operating(&mut buildings, BuildingType::Farm);
        buildings.assign_worker(idx, AgentId::new()).unwrap();
        buildings.transition(idx, BuildingState::Abandoned).unwrap();
        assert_eq!(buildings.worker_count(idx), 0);
    }

    #[test]
    fn test_resource_interface() {
        let mut buildings = BuildingArchetype::new();
        let idx = spawn_operating(&mut buildings, BuildingType::Restaurant);

        assert!(buildings.can_accept_resource(idx, ResourceType::Food, 10.0));
        assert!(!buildings.can_accept_resource(idx, ResourceType::Stone, 10.0));
        assert!(!buildings.can_accept_resource(idx, ResourceType::Food, 301.0));

        assert_eq!(buildings.add_resource(idx, ResourceType::Food, 20.0), 20.0);
        assert_eq!(buildings.add_resource(idx, ResourceType::Stone, 20.0), 0.0);
        assert!(buildings.has_resource(idx, ResourceType::Food, 20.0));

        assert!(!buildings.request_resource(idx, ResourceType::Food, 25.0));
        assert!(buildings.request_resource(idx, ResourceType::Food, 15.0));
        assert_eq!(buildings.inventories[idx].get(ResourceType::Food), 5.0);
    }

    #[test]
    fn test_maintenance_failure_degrades_efficiency() {
        let mut buildings = BuildingArchetype::new();
        let idx = spawn_operating(&mut buildings, BuildingType::Farm);
        for _ in 0..5 {
            buildings.assign_worker(idx, AgentId::new()).unwrap();
        }
        assert_eq!(buildings.refresh_efficiency(idx, 0.0), 1.0);

        buildings.funds[idx] = 0.0;
        assert!(!buildings.pay_maintenance(idx, 1.0));
        let degraded = buildings.refresh_efficiency(idx, 0.0);
        assert!((degraded - 0.9).abs() < 1e-6);

        buildings.deposit(idx, 100.0);
        assert!(buildings.pay_maintenance(idx, 1.0));
        assert!(buildings.refresh_efficiency(idx, 0.0) > degraded);
    }

    #[test]
    fn test_missed_maintenance_does_not_compound() {
        let mut buildings = BuildingArchetype::new();
        let idx = spawn_operating(&mut buildings, BuildingType::Restaurant);
        for _ in 0..4 {
            buildings.assign_worker(idx, AgentId::new()).unwrap();
        }
        buildings.funds[idx] = 0.0;

        for _ in 0..200 {
            assert!(!buildings.pay_maintenance(idx, 1.0));
        }
        let unpaid = buildings.refresh_efficiency(idx, 0.0);
        assert!((unpaid - UNPAID_UPKEEP_FACTOR).abs() < 1e-6);

        // One paid cycle restores full efficiency
        buildings.deposit(idx, 1.0);
        assert!(buildings.pay_maintenance(idx, 1.0));
        assert_eq!(buildings.refresh_efficiency(idx, 0.0), 1.0);
    }

    #[test]
    fn test_service_reserve_skips_input_list() {
        let mut buildings = BuildingArchetype::new();
        let restaurant = spawn_operating(&mut buildings, BuildingType::Restaurant);
        let library = spawn_operating(&mut buildings, BuildingType::Library);
        let farm = spawn_operating(&mut buildings, BuildingType::Farm);

        // Deliveries of the served resource are still refused
        assert_eq!(buildings.add_resource(restaurant, ResourceType::ProcessedFood, 5.0), 0.0);
        assert_eq!(buildings.add_resource(library, ResourceType::Culture, 5.0), 0.0);

        assert_eq!(buildings.stock_service_reserve(restaurant), 20.0);
        assert_eq!(buildings.stock_service_reserve(library), 10.0);
        assert_eq!(buildings.stock_service_reserve(farm), 0.0);
        assert_eq!(buildings.inventories[restaurant].get(ResourceType::ProcessedFood), 20.0);
        assert_eq!(buildings.inventories[library].get(ResourceType::Culture), 10.0);

        // Only the shortfall is added
        buildings.request_resource(restaurant, ResourceType::ProcessedFood, 5.0);
        assert_eq!(buildings.stock_service_reserve(restaurant), 5.0);
        assert_eq!(buildings.stock_service_reserve(restaurant), 0.0);
    }

    #[test]
    fn test_every_type_has_consistent_tables() {
        for t in BuildingType::ALL {
            assert!(t.storage_capacity() > 0.0);
            assert!(t.construction_time() > 0.0);
            if !t.produced_resources().is_empty() {
                assert!(t.production_time() > 0.0, "{:?} produces but has no cycle", t);
            }
            assert_eq!(BuildingType::from_name(&format!("{:?}", t)), Some(t));
        }
    }
}
