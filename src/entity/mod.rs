//! Agents and the value types they own

pub mod agent;
pub mod demographics;
pub mod ideology;
pub mod needs;
pub mod personality;
pub mod skills;
pub mod social;

pub use agent::{Agent, AgentSnapshot, ConsumptionState};
pub use demographics::{Demographics, Sex, SocialClass};
pub use ideology::{Ideology, IdeologyAxis};
pub use needs::{Need, NeedType, Needs};
pub use personality::{Personality, TraitType};
pub use skills::{SkillType, Skills};
