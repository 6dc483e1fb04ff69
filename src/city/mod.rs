//! City layer - buildings, construction, and production

pub mod building;
pub mod construction;
pub mod production;

pub use building::{
    compute_efficiency, staffing_efficiency, BuildingArchetype, BuildingError, BuildingId,
    BuildingState, BuildingType, ContributionResult,
};
pub use construction::{
    apply_construction_work, calculate_team_contribution, calculate_worker_contribution,
    tick_construction,
};
pub use production::{
    distribute_inputs, restock_services, tick_production, Delivery, ProductionResult, Restock,
};
