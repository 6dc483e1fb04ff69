//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. The configuration is immutable for
//! the duration of a run and is handed to every subsystem through
//! [`crate::simulation::context::SimContext`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::needs::NeedType;

/// Error type for configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Pressure above which an agent goes looking for a facility
///
/// Pressure is `max - value` of the need, so 70 for food means the agent
/// reacts once its food satisfaction has dropped to 30.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedThresholds {
    pub food: f32,
    pub sleep: f32,
    pub entertainment: f32,
    pub social: f32,
    pub health: f32,
    pub culture: f32,
}

impl Default for NeedThresholds {
    fn default() -> Self {
        Self {
            food: 70.0,
            sleep: 30.0,
            entertainment: 30.0,
            social: 40.0,
            health: 40.0,
            culture: 50.0,
        }
    }
}

impl NeedThresholds {
    pub fn get(&self, need: NeedType) -> f32 {
        match need {
            NeedType::Food => self.food,
            NeedType::Sleep => self.sleep,
            NeedType::Entertainment => self.entertainment,
            NeedType::Social => self.social,
            NeedType::Health => self.health,
            NeedType::Culture => self.culture,
        }
    }

    fn all(&self) -> [f32; 6] {
        NeedType::ALL.map(|need| self.get(need))
    }
}

/// Configuration for the simulation systems
///
/// These values have been tuned to keep the population statistics bounded
/// over long runs. Changing them affects pacing more than correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === RUN ===
    /// Seed for every random stream in the run
    ///
    /// Two runs with the same seed and config produce identical statistics.
    pub seed: u64,

    /// Number of agents spawned by `World::populate`
    pub initial_population: usize,

    /// Time advanced by one scheduler tick (`dt`)
    pub tick_interval: f32,

    /// Half-width of the square agents are spawned into
    pub spawn_range: f32,

    // === NEED SYSTEM ===
    /// Per-need pressure thresholds that trigger facility seeking
    pub need_thresholds: NeedThresholds,

    /// Cooldown between two need checks of the same agent
    ///
    /// Prevents an agent from re-targeting every tick while a need hovers
    /// around its threshold.
    pub need_check_interval: f32,

    /// Food pressure above which an agent eats from its own inventory
    /// when no restaurant could serve it
    pub self_provision_threshold: f32,

    /// Time an agent keeps waiting for an arrival before giving up
    pub seek_timeout: f32,

    // === SOCIAL SYSTEM ===
    /// Maximum distance at which two agents can interact
    pub interaction_radius: f32,

    /// Minimum time between two social interaction passes
    pub interaction_interval: f32,

    /// Maximum number of relationship edges per agent
    pub max_relations: usize,

    /// Capacity of each agent's personal memory (oldest evicted)
    pub memory_capacity: usize,

    /// Capacity of each relationship's interaction log
    pub relation_log_capacity: usize,

    /// Capacity of the society-wide notable event log
    pub social_event_capacity: usize,

    /// Remove relations whose intimacy and trust have both decayed to zero
    ///
    /// Off by default: relations persist as memories of past contact.
    pub prune_stale_relations: bool,

    // === ECONOMY ===
    /// Volatility applied to every market price update
    pub market_volatility: f32,

    /// Minimum time between two stochastic supply/demand drift passes
    pub market_update_interval: f32,

    /// Minimum time between two trade-matching passes
    pub trade_interval: f32,

    /// Time over which one full career income is paid out
    pub pay_period: f32,

    // === CAREER SYSTEM ===
    /// Experience needed before a promotion is considered
    pub promotion_experience_threshold: f32,

    /// Minimum time between two promotion checks of the same agent
    pub promotion_check_interval: f32,

    /// Career experience gained per unit of time on the job
    pub base_experience_gain: f32,

    /// Global multiplier on career skill growth rates
    pub skill_growth_multiplier: f32,

    // === BUILDINGS ===
    /// Minimum time between two worker-assignment passes
    pub worker_assignment_interval: f32,

    /// Funds every new building starts with
    pub building_starting_funds: f32,

    // === AGGREGATION ===
    /// Minimum time between two society statistics snapshots
    pub aggregator_interval: f32,

    /// Snapshots kept by the aggregator; older ones are dropped
    pub stats_history_capacity: usize,

    // === PARALLELIZATION ===
    /// Minimum agent count before per-agent phases use rayon
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            initial_population: 10,
            tick_interval: 1.0,
            spawn_range: 20.0,

            need_thresholds: NeedThresholds::default(),
            need_check_interval: 1.0,
            self_provision_threshold: 80.0,
            seek_timeout: 50.0,

            interaction_radius: 5.0,
            interaction_interval: 1.0,
            max_relations: 50,
            memory_capacity: 100,
            relation_log_capacity: 20,
            social_event_capacity: 100,
            prune_stale_relations: false,

            market_volatility: 0.1,
            market_update_interval: 100.0,
            trade_interval: 5.0,
            pay_period: 100.0,

            promotion_experience_threshold: 100.0,
            promotion_check_interval: 10.0,
            base_experience_gain: 0.1,
            skill_growth_multiplier: 1.0,

            worker_assignment_interval: 10.0,
            building_starting_funds: 1000.0,

            aggregator_interval: 100.0,
            stats_history_capacity: 1000,

            parallel_threshold: 1000,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("tick_interval", self.tick_interval),
            ("need_check_interval", self.need_check_interval),
            ("interaction_interval", self.interaction_interval),
            ("market_update_interval", self.market_update_interval),
            ("trade_interval", self.trade_interval),
            ("pay_period", self.pay_period),
            ("promotion_check_interval", self.promotion_check_interval),
            ("worker_assignment_interval", self.worker_assignment_interval),
            ("aggregator_interval", self.aggregator_interval),
        ];
        for (name, value) in intervals {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.need_thresholds.all().iter().any(|t| !(0.0..=100.0).contains(t)) {
            return Err(ConfigError::Invalid(
                "need thresholds must lie in [0, 100]".into(),
            ));
        }

        if !(0.0..=100.0).contains(&self.self_provision_threshold) {
            return Err(ConfigError::Invalid(format!(
                "self_provision_threshold ({}) must lie in [0, 100]",
                self.self_provision_threshold
            )));
        }

        if self.interaction_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "interaction_radius ({}) must be positive",
                self.interaction_radius
            )));
        }

        if self.market_volatility < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "market_volatility ({}) must not be negative",
                self.market_volatility
            )));
        }

        if self.memory_capacity == 0
            || self.relation_log_capacity == 0
            || self.stats_history_capacity == 0
        {
            return Err(ConfigError::Invalid("log capacities must be non-zero".into()));
        }

        if self.promotion_experience_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "promotion_experience_threshold must not be negative".into(),
            ));
        }

        Ok(())
    }
}
