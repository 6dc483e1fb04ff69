//! Career layer - occupations, suitability, promotion and pay

pub mod catalog;
pub mod progression;
pub mod promotion;
pub mod suitability;

pub use catalog::{CareerCatalog, CareerField, CareerId, CareerRecord, CatalogLoadError};
pub use progression::{
    career_income, choose_entry_career, target_satisfaction, update_career, CareerState,
};
pub use promotion::{acceptance_probability, can_promote, try_promote, PromotionOffer};
pub use suitability::{personality_match, skill_match, status_match, suitability};
