//! Career progression - experience, skill growth, satisfaction and pay

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::career::catalog::{CareerCatalog, CareerId, CareerRecord};
use crate::career::suitability::{personality_match, skill_match, suitability};
use crate::core::config::SimulationConfig;
use crate::entity::personality::Personality;
use crate::entity::skills::Skills;

/// Fraction of the gap to target satisfaction closed per unit of time
const SATISFACTION_RATE: f32 = 0.01;

/// An agent's current occupation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerState {
    pub career: Option<CareerId>,
    pub experience: f32,
    /// Job satisfaction, 0.0 - 1.0
    pub satisfaction: f32,
    /// Time spent in the current career
    pub tenure: f32,
    /// Lifetime income
    pub earned: f32,
}

impl Default for CareerState {
    fn default() -> Self {
        Self {
            career: None,
            experience: 0.0,
            satisfaction: 0.5,
            tenure: 0.0,
            earned: 0.0,
        }
    }
}

impl CareerState {
    pub fn new(career: Option<CareerId>) -> Self {
        Self { career, ..Self::default() }
    }

    pub fn is_employed(&self) -> bool {
        self.career.is_some()
    }

    /// Switch careers; experience and tenure restart
    pub fn change_to(&mut self, career: CareerId) {
        self.career = Some(career);
        self.experience = 0.0;
        self.tenure = 0.0;
    }
}

/// Yearly income: `base * (1 + skill_match * 0.5) * (0.8 + satisfaction * 0.4)`
pub fn career_income(career: &CareerRecord, skill_match: f32, satisfaction: f32) -> f32 {
    career.base_salary * (1.0 + skill_match * 0.5) * (0.8 + satisfaction * 0.4)
}

/// Satisfaction the agent drifts toward in its current job
pub fn target_satisfaction(
    skills: &Skills,
    personality: &Personality,
    career: &CareerRecord,
) -> f32 {
    let status = (career.social_status / 100.0).clamp(0.0, 1.0);
    (skill_match(skills, career) * 0.4 + personality_match(personality, career) * 0.3 + status * 0.3)
        .clamp(0.0, 1.0)
}

/// Advance one agent's career by `dt`, returning the income earned
///
/// Skills trained by the career grow at `rate * multiplier * dt * satisfaction`.
pub fn update_career(
    state: &mut CareerState,
    skills: &mut Skills,
    personality: &Personality,
    career: &CareerRecord,
    config: &SimulationConfig,
    dt: f32,
) -> f32 {
    state.tenure += dt;
    state.experience += config.base_experience_gain * dt;

    for (skill, rate) in &career.skill_growth {
        skills.grow(*skill, rate * config.skill_growth_multiplier * dt * state.satisfaction);
    }

    let target = target_satisfaction(skills, personality, career);
    state.satisfaction += (target - state.satisfaction) * (SATISFACTION_RATE * dt).min(1.0);
    state.satisfaction = state.satisfaction.clamp(0.0, 1.0);

    let income =
        career_income(career, skill_match(skills, career), state.satisfaction) * dt / config.pay_period;
    state.earned += income;
    income
}

/// Pick a starting career, weighted by suitability
pub fn choose_entry_career<R: Rng + ?Sized>(
    catalog: &CareerCatalog,
    skills: &Skills,
    personality: &Personality,
    prestige: f32,
    rng: &mut R,
) -> Option<CareerId> {
    let candidates: Vec<&CareerRecord> = catalog.entry_level().collect();
    let weights: Vec<f32> = candidates
        .iter()
        .map(|c| suitability(skills, personality, prestige, c).max(0.0))
        .collect();
    let dist = WeightedIndex::new(&weights).ok()?;
    Some(candidates[dist.sample(rng)].id.clone())
}
