//! Promotion decisions
//!
//! An agent becomes eligible once its experience reaches the configured
//! threshold. The most suitable career on the current career's promotion
//! path is offered if its suitability exceeds [`PROMOTION_MIN_SUITABILITY`],
//! and the agent accepts it with a probability shaped by ambition, openness
//! and the salary/status gain.

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::career::catalog::{CareerCatalog, CareerId, CareerRecord};
use crate::career::progression::CareerState;
use crate::career::suitability::suitability;
use crate::core::types::EPSILON;
use crate::entity::personality::{Personality, TraitType};
use crate::entity::skills::Skills;

pub const PROMOTION_MIN_SUITABILITY: f32 = 0.6;
pub const BASE_ACCEPTANCE: f32 = 0.7;

/// A promotion offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionOffer {
    pub from: CareerId,
    pub to: CareerId,
    pub suitability: f32,
}

/// Most suitable career on the promotion path, if experienced and suitable enough
pub fn can_promote(
    state: &CareerState,
    catalog: &CareerCatalog,
    skills: &Skills,
    personality: &Personality,
    prestige: f32,
    experience_threshold: f32,
) -> Option<PromotionOffer> {
    if state.experience < experience_threshold {
        return None;
    }
    let current_id = state.career.as_ref()?;
    let current = catalog.lookup(current_id)?;

    let (best, score) = current
        .promotions
        .iter()
        .filter_map(|id| catalog.lookup(id))
        .map(|c| (c, suitability(skills, personality, prestige, c)))
        .max_by_key(|(_, score)| OrderedFloat(*score))?;

    if score > PROMOTION_MIN_SUITABILITY {
        Some(PromotionOffer {
            from: current.id.clone(),
            to: best.id.clone(),
            suitability: score,
        })
    } else {
        None
    }
}

/// Chance of accepting a move from `current` to `candidate`, in `[0, 1]`
///
/// Ambition and openness shift the base by up to ±0.1, and the relative
/// salary/status gain by up to ±0.1 more.
pub fn acceptance_probability(
    current: &CareerRecord,
    candidate: &CareerRecord,
    personality: &Personality,
) -> f32 {
    let disposition =
        (personality.get(TraitType::Ambition) + personality.get(TraitType::Openness)) / 2.0;
    let trait_term = (disposition - 0.5) * 0.2;

    let salary_ratio = candidate.base_salary / current.base_salary.max(EPSILON);
    let status_ratio = candidate.social_status / current.social_status.max(EPSILON);
    let gain = ((salary_ratio + status_ratio) / 2.0 - 1.0).clamp(-1.0, 1.0);
    let gain_term = gain * 0.1;

    (BASE_ACCEPTANCE + trait_term + gain_term).clamp(0.0, 1.0)
}

/// Offer and possibly accept a promotion
///
/// On acceptance the career changes and experience restarts. A declined
/// offer leaves the state untouched so it can be offered again later.
pub fn try_promote<R: Rng + ?Sized>(
    state: &mut CareerState,
    catalog: &CareerCatalog,
    skills: &Skills,
    personality: &Personality,
    prestige: f32,
    experience_threshold: f32,
    rng: &mut R,
) -> Option<PromotionOffer> {
    let offer = can_promote(state, catalog, skills, personality, prestige, experience_threshold)?;
    let current = catalog.get(&offer.from)?;
    let candidate = catalog.get(&offer.to)?;

    let p = acceptance_probability(current, candidate, personality);
    if rng.gen::<f32>() < p {
        state.change_to(offer.to.clone());
        Some(offer)
    } else {
        tracing::trace!(from = %offer.from, to = %offer.to, p, "promotion declined");
        None
    }
}
