//! Personality traits (the agent's "DNA")

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitType {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
    Ambition,
}

impl TraitType {
    pub const COUNT: usize = 6;

    pub const ALL: [TraitType; Self::COUNT] = [
        TraitType::Openness,
        TraitType::Conscientiousness,
        TraitType::Extraversion,
        TraitType::Agreeableness,
        TraitType::Neuroticism,
        TraitType::Ambition,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TraitType::Openness => "openness",
            TraitType::Conscientiousness => "conscientiousness",
            TraitType::Extraversion => "extraversion",
            TraitType::Agreeableness => "agreeableness",
            TraitType::Neuroticism => "neuroticism",
            TraitType::Ambition => "ambition",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Named traits, each in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    traits: [f32; TraitType::COUNT],
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            traits: [0.5; TraitType::COUNT],
        }
    }
}

impl Personality {
    pub fn new(traits: [f32; TraitType::COUNT]) -> Self {
        Self {
            traits: traits.map(|t| t.clamp(0.0, 1.0)),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut traits = [0.0; TraitType::COUNT];
        for t in &mut traits {
            *t = rng.gen_range(0.0..=1.0);
        }
        Self { traits }
    }

    pub fn get(&self, t: TraitType) -> f32 {
        self.traits[t.index()]
    }

    pub fn set(&mut self, t: TraitType, value: f32) {
        self.traits[t.index()] = value.clamp(0.0, 1.0);
    }

    /// Mean of `1 - |a - b|` over all traits, in `[0, 1]`
    pub fn similarity(&self, other: &Personality) -> f32 {
        let total: f32 = self
            .traits
            .iter()
            .zip(other.traits.iter())
            .map(|(a, b)| 1.0 - (a - b).abs())
            .sum();
        total / TraitType::COUNT as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_personalities_fully_similar() {
        let p = Personality::new([0.1, 0.9, 0.3, 0.5, 0.7, 0.2]);
        assert!((p.similarity(&p) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_personalities_dissimilar() {
        let a = Personality::new([0.0; TraitType::COUNT]);
        let b = Personality::new([1.0; TraitType::COUNT]);
        assert!(a.similarity(&b).abs() < 1e-6);
    }

    #[test]
    fn test_traits_clamped() {
        let mut p = Personality::default();
        p.set(TraitType::Ambition, 3.0);
        assert_eq!(p.get(TraitType::Ambition), 1.0);
    }
}
