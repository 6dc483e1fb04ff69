//! Career suitability scoring
//!
//! `suitability = skill_match * 0.4 + personality_match * 0.3 + status_match * 0.3`

use crate::career::catalog::CareerRecord;
use crate::core::types::EPSILON;
use crate::entity::personality::Personality;
use crate::entity::skills::Skills;

pub const SKILL_WEIGHT: f32 = 0.4;
pub const PERSONALITY_WEIGHT: f32 = 0.3;
pub const STATUS_WEIGHT: f32 = 0.3;

/// Prestige at this fraction of the career's status counts as a full match
pub const STATUS_TOLERANCE: f32 = 0.8;

/// Mean of `min(1, level / required)`; 1.0 with no requirements
pub fn skill_match(skills: &Skills, career: &CareerRecord) -> f32 {
    if career.required_skills.is_empty() {
        return 1.0;
    }
    let total: f32 = career
        .required_skills
        .iter()
        .map(|(skill, required)| {
            if *required <= 0.0 {
                1.0
            } else {
                (skills.level(*skill) / required.max(EPSILON)).min(1.0)
            }
        })
        .sum();
    total / career.required_skills.len() as f32
}

/// Mean of `1 - |trait - preference|`; 1.0 with no preferences
pub fn personality_match(personality: &Personality, career: &CareerRecord) -> f32 {
    if career.personality.is_empty() {
        return 1.0;
    }
    let total: f32 = career
        .personality
        .iter()
        .map(|(t, pref)| 1.0 - (personality.get(*t) - pref).abs())
        .sum();
    total / career.personality.len() as f32
}

/// 1.0 if prestige reaches 80% of the career's status, linear below
pub fn status_match(prestige: f32, career: &CareerRecord) -> f32 {
    let target = career.social_status;
    if target <= 0.0 || prestige >= target * STATUS_TOLERANCE {
        return 1.0;
    }
    (prestige / (target * STATUS_TOLERANCE).max(EPSILON)).clamp(0.0, 1.0)
}

pub fn suitability(
    skills: &Skills,
    personality: &Personality,
    prestige: f32,
    career: &CareerRecord,
) -> f32 {
    skill_match(skills, career) * SKILL_WEIGHT
        + personality_match(personality, career) * PERSONALITY_WEIGHT
        + status_match(prestige, career) * STATUS_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::career::catalog::{CareerCatalog, CareerId};
    use crate::entity::personality::TraitType;
    use crate::entity::skills::SkillType;

    fn farmer() -> CareerRecord {
        CareerCatalog::with_defaults()
            .get(&CareerId::new("farmer"))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_skill_match_caps_at_one() {
        let mut skills = Skills::new();
        skills.set_level(SkillType::Farming, 1.0);
        skills.set_level(SkillType::PhysicalLabor, 0.1);
        // farming: min(1, 1/0.1) = 1, labor: 0.1/0.2 = 0.5
        assert!((skill_match(&skills, &farmer()) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_empty_requirements_match_fully() {
        let mut career = farmer();
        career.required_skills.clear();
        career.personality.clear();
        assert_eq!(skill_match(&Skills::new(), &career), 1.0);
        assert_eq!(personality_match(&Personality::default(), &career), 1.0);
    }

    #[test]
    fn test_personality_match() {
        let mut p = Personality::default();
        p.set(TraitType::Openness, 0.3);
        p.set(TraitType::Conscientiousness, 0.2);
        // (1.0 + 0.5) / 2
        assert!((personality_match(&p, &farmer()) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_status_match_tolerance() {
        let career = farmer(); // status 30, full match from 24
        assert_eq!(status_match(24.0, &career), 1.0);
        assert!((status_match(12.0, &career) - 0.5).abs() < 1e-5);
        assert_eq!(status_match(0.0, &career), 0.0);
    }

    #[test]
    fn test_suitability_weights() {
        let mut skills = Skills::new();
        skills.set_level(SkillType::Farming, 1.0);
        skills.set_level(SkillType::PhysicalLabor, 1.0);
        let mut p = Personality::default();
        p.set(TraitType::Openness, 0.3);
        p.set(TraitType::Conscientiousness, 0.7);
        assert!((suitability(&skills, &p, 100.0, &farmer()) - 1.0).abs() < 1e-5);
        assert!((suitability(&skills, &p, 0.0, &farmer()) - 0.7).abs() < 1e-5);
    }
}
