pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{IntervalGate, SimClock};
pub use config::{ConfigError, NeedThresholds, SimulationConfig};
pub use error::{Result, SimError};
pub use types::{AgentId, Tick, Vec2};
