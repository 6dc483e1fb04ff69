//! Simulation systems: the world, its tick pipeline and per-agent behavior

pub mod behavior;
pub mod consumption;
pub mod context;
pub mod interaction;
pub mod registry;
pub mod report;
pub mod tick;
pub mod world;

pub use behavior::{update_behavior, BehaviorOutcome, DestinationRequest};
pub use consumption::{serve_visit, ArrivalOutcome};
pub use context::SimContext;
pub use registry::AgentRegistry;
pub use report::{EventTally, SimulationReport};
pub use tick::{run_simulation_tick, SimulationEvent};
pub use world::World;
