//! Demographic attributes

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

/// Social class tiers, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SocialClass {
    Working,
    Middle,
    Upper,
    Ruling,
}

impl SocialClass {
    pub const ALL: [SocialClass; 4] = [
        SocialClass::Working,
        SocialClass::Middle,
        SocialClass::Upper,
        SocialClass::Ruling,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 60% working, 30% middle, 8% upper, 2% ruling
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let r: f32 = rng.gen();
        if r < 0.6 {
            SocialClass::Working
        } else if r < 0.9 {
            SocialClass::Middle
        } else if r < 0.98 {
            SocialClass::Upper
        } else {
            SocialClass::Ruling
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    pub age: f32,
    pub sex: Sex,
    /// 0-100
    pub education: f32,
    /// 0-100
    pub prestige: f32,
    pub social_class: SocialClass,
}

impl Default for Demographics {
    fn default() -> Self {
        Self {
            age: 30.0,
            sex: Sex::Female,
            education: 0.0,
            prestige: 0.0,
            social_class: SocialClass::Working,
        }
    }
}

impl Demographics {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            age: rng.gen_range(18.0..=65.0),
            sex: if rng.gen_bool(0.5) { Sex::Female } else { Sex::Male },
            education: rng.gen_range(0.0..=100.0),
            prestige: rng.gen_range(0.0..=100.0),
            social_class: SocialClass::roll(rng),
        }
    }

    /// Starting money by class; higher classes start richer
    pub fn starting_wealth<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let base = rng.gen_range(1000.0..=10000.0);
        let multiplier = match self.social_class {
            SocialClass::Working => 1.0,
            SocialClass::Middle => 1.5,
            SocialClass::Upper => 3.0,
            SocialClass::Ruling => 6.0,
        };
        base * multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_class_ordering() {
        assert!(SocialClass::Working < SocialClass::Middle);
        assert!(SocialClass::Upper < SocialClass::Ruling);
    }

    #[test]
    fn test_class_roll_is_mostly_working() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let working = (0..1000)
            .filter(|_| SocialClass::roll(&mut rng) == SocialClass::Working)
            .count();
        assert!(
            (500..700).contains(&working),
            "Expected roughly 60% working class, got {}",
            working
        );
    }

    #[test]
    fn test_random_demographics_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            let d = Demographics::random(&mut rng);
            assert!((18.0..=65.0).contains(&d.age));
            assert!((0.0..=100.0).contains(&d.education));
            assert!((0.0..=100.0).contains(&d.prestige));
        }
    }
}
