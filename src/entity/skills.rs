//! Skill levels and practice
//!
//! Levels live in `[0, 1]`. Career requirements, building requirements and
//! conversion rules all compare against the same scale.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    Farming,
    PhysicalLabor,
    Manufacturing,
    MachineOperation,
    Construction,
    Cooking,
    Programming,
    ProblemSolving,
    Engineering,
    Medicine,
    Teaching,
    Art,
    Finance,
    Management,
    Communication,
    Research,
}

impl SkillType {
    pub const COUNT: usize = 16;

    pub const ALL: [SkillType; Self::COUNT] = [
        SkillType::Farming,
        SkillType::PhysicalLabor,
        SkillType::Manufacturing,
        SkillType::MachineOperation,
        SkillType::Construction,
        SkillType::Cooking,
        SkillType::Programming,
        SkillType::ProblemSolving,
        SkillType::Engineering,
        SkillType::Medicine,
        SkillType::Teaching,
        SkillType::Art,
        SkillType::Finance,
        SkillType::Management,
        SkillType::Communication,
        SkillType::Research,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SkillType::Farming => "farming",
            SkillType::PhysicalLabor => "physical_labor",
            SkillType::Manufacturing => "manufacturing",
            SkillType::MachineOperation => "machine_operation",
            SkillType::Construction => "construction",
            SkillType::Cooking => "cooking",
            SkillType::Programming => "programming",
            SkillType::ProblemSolving => "problem_solving",
            SkillType::Engineering => "engineering",
            SkillType::Medicine => "medicine",
            SkillType::Teaching => "teaching",
            SkillType::Art => "art",
            SkillType::Finance => "finance",
            SkillType::Management => "management",
            SkillType::Communication => "communication",
            SkillType::Research => "research",
        }
    }

    /// Parse a snake_case skill name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Skill levels of one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skills {
    levels: [f32; SkillType::COUNT],
    /// Lifetime practice per skill (unbounded)
    experience: [f32; SkillType::COUNT],
}

impl Default for Skills {
    fn default() -> Self {
        Self {
            levels: [0.0; SkillType::COUNT],
            experience: [0.0; SkillType::COUNT],
        }
    }
}

impl Skills {
    /// Level gained per unit of practice
    const PRACTICE_TO_LEVEL: f32 = 0.01;

    pub fn new() -> Self {
        Self::default()
    }

    /// Random starting levels; better educated agents start higher
    pub fn random<R: Rng + ?Sized>(rng: &mut R, education: f32) -> Self {
        let ceiling = 0.2 + 0.3 * (education / 100.0).clamp(0.0, 1.0);
        let mut skills = Self::new();
        for level in &mut skills.levels {
            *level = rng.gen_range(0.0..ceiling);
        }
        skills
    }

    pub fn level(&self, skill: SkillType) -> f32 {
        self.levels[skill.index()]
    }

    pub fn experience(&self, skill: SkillType) -> f32 {
        self.experience[skill.index()]
    }

    pub fn set_level(&mut self, skill: SkillType, level: f32) {
        self.levels[skill.index()] = level.clamp(0.0, 1.0);
    }

    /// Raise a level directly (career growth)
    pub fn grow(&mut self, skill: SkillType, amount: f32) {
        let i = skill.index();
        self.levels[i] = (self.levels[i] + amount).clamp(0.0, 1.0);
    }

    /// Record practice; part of it turns into level
    pub fn practice(&mut self, skill: SkillType, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        self.experience[skill.index()] += amount;
        self.grow(skill, amount * Self::PRACTICE_TO_LEVEL);
    }

    pub fn meets(&self, requirements: &[(SkillType, f32)]) -> bool {
        requirements.iter().all(|(skill, min)| self.level(*skill) >= *min)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillType, f32)> + '_ {
        SkillType::ALL.into_iter().map(move |s| (s, self.level(s)))
    }
}
