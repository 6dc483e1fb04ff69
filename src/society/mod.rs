//! Society layer - aggregate statistics and notable events

pub mod aggregator;
pub mod events;
pub mod stats;

pub use aggregator::{SocietyAggregator, SocietyStats};
pub use events::{SocialEvent, SocialEventKind, SocialEventLog, NOTABLE_INFLUENCE};
pub use stats::{gini, mean, variance};
