//! Conversion rules - turning resources into other resources by hand
//!
//! Unlike building production, a conversion is performed by a single agent
//! out of its own inventory and requires a minimum skill, and optionally a
//! specific occupation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::career::catalog::CareerId;
use crate::economy::catalog::ResourceType;
use crate::economy::inventory::Inventory;
use crate::entity::skills::{SkillType, Skills};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("unknown conversion rule: {0}")]
    UnknownRule(String),

    #[error("{skill:?} level {have:.2} below required {need:.2}")]
    InsufficientSkill { skill: SkillType, have: f32, need: f32 },

    #[error("requires occupation {0}")]
    WrongOccupation(CareerId),

    #[error("missing input {resource:?}: have {have:.1}, need {need:.1}")]
    MissingInput { resource: ResourceType, have: f32, need: f32 },

    #[error("no room for output {0:?}")]
    NoCapacity(ResourceType),
}

/// A recipe an agent can execute from its own inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRule {
    pub id: String,
    pub inputs: Vec<(ResourceType, f32)>,
    pub outputs: Vec<(ResourceType, f32)>,
    /// Time one conversion takes
    pub time: f32,
    /// Energy consumed on top of the inputs
    pub energy_cost: f32,
    pub required_skill: (SkillType, f32),
    pub required_career: Option<CareerId>,
}

impl ConversionRule {
    /// Inputs plus the energy cost folded into one requirement list
    pub fn total_requirements(&self) -> Vec<(ResourceType, f32)> {
        let mut requirements = self.inputs.clone();
        if self.energy_cost > 0.0 {
            requirements.push((ResourceType::Energy, self.energy_cost));
        }
        requirements
    }
}

/// What a successful conversion produced
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    pub rule_id: String,
    pub produced: Vec<(ResourceType, f32)>,
    /// Career experience earned by the worker
    pub experience: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ConversionTable {
    rules: Vec<ConversionRule>,
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();

        table.add(ConversionRule {
            id: "brew_medicine".into(),
            inputs: vec![(ResourceType::Food, 10.0), (ResourceType::Energy, 2.0)],
            outputs: vec![(ResourceType::Medicine, 1.0)],
            time: 2.0,
            energy_cost: 2.0,
            required_skill: (SkillType::Medicine, 0.5),
            required_career: Some(CareerId::new("doctor")),
        });

        table.add(ConversionRule {
            id: "forge_tools".into(),
            inputs: vec![(ResourceType::Metal, 5.0), (ResourceType::Energy, 3.0)],
            outputs: vec![(ResourceType::Tools, 1.0)],
            time: 3.0,
            energy_cost: 3.0,
            required_skill: (SkillType::Manufacturing, 0.3),
            required_career: Some(CareerId::new("craftsman")),
        });

        table.add(ConversionRule {
            id: "cook_meal".into(),
            inputs: vec![(ResourceType::Food, 2.0), (ResourceType::Water, 1.0)],
            outputs: vec![(ResourceType::ProcessedFood, 1.0)],
            time: 1.0,
            energy_cost: 0.0,
            required_skill: (SkillType::Cooking, 0.2),
            required_career: None,
        });

        table
    }

    pub fn add(&mut self, rule: ConversionRule) {
        self.rules.push(rule);
    }

    pub fn get(&self, id: &str) -> Option<&ConversionRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn all(&self) -> &[ConversionRule] {
        &self.rules
    }

    /// Rules tied to a specific occupation
    pub fn for_career<'a>(&'a self, career: &'a CareerId) -> impl Iterator<Item = &'a ConversionRule> {
        self.rules
            .iter()
            .filter(move |r| r.required_career.as_ref() == Some(career))
    }
}

/// Check skill, occupation, inputs, energy and output room
pub fn can_convert(
    rule: &ConversionRule,
    inventory: &Inventory,
    skills: &Skills,
    career: Option<&CareerId>,
) -> Result<(), ConversionError> {
    let (skill, need) = rule.required_skill;
    let have = skills.level(skill);
    if have < need {
        return Err(ConversionError::InsufficientSkill { skill, have, need });
    }

    if let Some(required) = &rule.required_career {
        if career != Some(required) {
            return Err(ConversionError::WrongOccupation(required.clone()));
        }
    }

    let mut needed = [0.0f32; ResourceType::COUNT];
    for (resource, amount) in rule.total_requirements() {
        needed[resource.index()] += amount;
    }
    for resource in ResourceType::ALL {
        let need = needed[resource.index()];
        let have = inventory.get(resource);
        if have < need {
            return Err(ConversionError::MissingInput { resource, have, need });
        }
    }

    for (resource, amount) in &rule.outputs {
        // Inputs of the same type free up room before outputs land
        let freed = needed[resource.index()];
        if inventory.space_for(*resource) + freed < *amount {
            return Err(ConversionError::NoCapacity(*resource));
        }
    }

    Ok(())
}

/// Execute a conversion atomically
///
/// On error nothing is consumed. Experience earned is drawn from `[1, 3]`.
pub fn convert_resources<R: Rng + ?Sized>(
    rule: &ConversionRule,
    inventory: &mut Inventory,
    skills: &Skills,
    career: Option<&CareerId>,
    rng: &mut R,
) -> Result<ConversionOutcome, ConversionError> {
    can_convert(rule, inventory, skills, career)?;

    if !inventory.consume_materials(&rule.total_requirements()) {
        return Err(ConversionError::MissingInput {
            resource: ResourceType::Energy,
            have: inventory.get(ResourceType::Energy),
            need: rule.energy_cost,
        });
    }

    let produced = rule
        .outputs
        .iter()
        .map(|(resource, amount)| (*resource, inventory.add(*resource, *amount)))
        .collect();

    Ok(ConversionOutcome {
        rule_id: rule.id.clone(),
        produced,
        experience: rng.gen_range(1.0..=3.0),
    })
}
