//! Career catalog - every occupation an agent can hold
//!
//! Careers specify the skills they require and train, the personality
//! they suit, pay and status, where they are practiced, and which careers
//! they lead to. The built-in catalog can be replaced by one loaded from
//! TOML.

use std::collections::BTreeMap;

use ahash::AHashMap;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::city::building::BuildingType;
use crate::entity::personality::TraitType;
use crate::entity::skills::SkillType;

/// Career identifier, e.g. `"farmer"`
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct CareerId(pub String);

impl CareerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareerField {
    Agriculture,
    Industry,
    Service,
    Technology,
    Art,
    Education,
    Medical,
    Finance,
    Government,
    Entertainment,
}

impl CareerField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "agriculture" => Some(CareerField::Agriculture),
            "industry" => Some(CareerField::Industry),
            "service" => Some(CareerField::Service),
            "technology" => Some(CareerField::Technology),
            "art" => Some(CareerField::Art),
            "education" => Some(CareerField::Education),
            "medical" => Some(CareerField::Medical),
            "finance" => Some(CareerField::Finance),
            "government" => Some(CareerField::Government),
            "entertainment" => Some(CareerField::Entertainment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerRecord {
    pub id: CareerId,
    pub name: String,
    pub field: CareerField,
    /// Yearly pay before skill and satisfaction modifiers
    pub base_salary: f32,
    /// 0-100
    pub social_status: f32,
    /// Minimum skill levels
    pub required_skills: Vec<(SkillType, f32)>,
    /// Skill growth per unit of time at full job satisfaction
    pub skill_growth: Vec<(SkillType, f32)>,
    /// Preferred trait values
    pub personality: Vec<(TraitType, f32)>,
    pub promotions: Vec<CareerId>,
    pub workplaces: Vec<BuildingType>,
    /// Can be assigned to a newly created agent
    pub entry_level: bool,
}

impl CareerRecord {
    pub fn works_at(&self, building: BuildingType) -> bool {
        self.workplaces.contains(&building)
    }
}

#[derive(Error, Debug)]
pub enum CatalogLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog defines no careers")]
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct CareerCatalog {
    careers: Vec<CareerRecord>,
    index: AHashMap<CareerId, usize>,
}

impl CareerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in careers covering every field
    pub fn with_defaults() -> Self {
        use BuildingType as B;
        use CareerField as F;
        use SkillType as S;
        use TraitType as T;

        let mut catalog = Self::new();
        let mut add = |id: &str,
                       name: &str,
                       field: CareerField,
                       base_salary: f32,
                       social_status: f32,
                       required_skills: &[(SkillType, f32)],
                       skill_growth: &[(SkillType, f32)],
                       personality: &[(TraitType, f32)],
                       promotions: &[&str],
                       workplaces: &[BuildingType],
                       entry_level: bool| {
            catalog.add(CareerRecord {
                id: CareerId::new(id),
                name: name.into(),
                field,
                base_salary,
                social_status,
                required_skills: required_skills.to_vec(),
                skill_growth: skill_growth.to_vec(),
                personality: personality.to_vec(),
                promotions: promotions.iter().map(|p| CareerId::new(*p)).collect(),
                workplaces: workplaces.to_vec(),
                entry_level,
            });
        };

        // Agriculture
        add("farmer", "Farmer", F::Agriculture, 2000.0, 30.0,
            &[(S::Farming, 0.1), (S::PhysicalLabor, 0.2)],
            &[(S::Farming, 0.02), (S::PhysicalLabor, 0.01)],
            &[(T::Openness, 0.3), (T::Conscientiousness, 0.7)],
            &["farm_manager"], &[B::Farm], true);
        add("farm_manager", "Farm Manager", F::Agriculture, 3500.0, 50.0,
            &[(S::Farming, 0.4), (S::Management, 0.2)],
            &[(S::Management, 0.02), (S::Farming, 0.01)],
            &[(T::Conscientiousness, 0.7), (T::Ambition, 0.6)],
            &["agricultural_expert"], &[B::Farm], false);
        add("agricultural_expert", "Agricultural Expert", F::Agriculture, 4500.0, 65.0,
            &[(S::Farming, 0.6), (S::Research, 0.3)],
            &[(S::Research, 0.02), (S::Farming, 0.01)],
            &[(T::Openness, 0.7)],
            &[], &[B::Farm, B::Laboratory], false);

        // Industry
        add("miner", "Miner", F::Industry, 2200.0, 25.0,
            &[(S::PhysicalLabor, 0.3)],
            &[(S::PhysicalLabor, 0.02)],
            &[(T::Conscientiousness, 0.6), (T::Neuroticism, 0.3)],
            &["supervisor"], &[B::Mine, B::Quarry, B::WoodCutter, B::Well], true);
        add("factory_worker", "Factory Worker", F::Industry, 2500.0, 35.0,
            &[(S::Manufacturing, 0.2), (S::MachineOperation, 0.3)],
            &[(S::Manufacturing, 0.02), (S::MachineOperation, 0.03)],
            &[(T::Conscientiousness, 0.8), (T::Extraversion, 0.4)],
            &["technician"], &[B::Factory, B::PowerPlant], true);
        add("craftsman", "Craftsman", F::Industry, 2400.0, 40.0,
            &[(S::Manufacturing, 0.2), (S::PhysicalLabor, 0.2)],
            &[(S::Manufacturing, 0.03)],
            &[(T::Conscientiousness, 0.7), (T::Openness, 0.5)],
            &["technician"], &[B::Workshop, B::Forge], true);
        add("technician", "Technician", F::Industry, 3200.0, 45.0,
            &[(S::MachineOperation, 0.5), (S::Engineering, 0.2)],
            &[(S::Engineering, 0.02), (S::MachineOperation, 0.01)],
            &[(T::Conscientiousness, 0.7)],
            &["engineer", "supervisor"], &[B::Factory, B::Workshop, B::PowerPlant], false);
        add("engineer", "Engineer", F::Industry, 3000.0, 75.0,
            &[(S::Engineering, 0.6), (S::ProblemSolving, 0.4)],
            &[(S::Engineering, 0.02), (S::ProblemSolving, 0.02)],
            &[(T::Openness, 0.6), (T::Conscientiousness, 0.8)],
            &["manager"], &[B::Factory, B::PowerPlant, B::ResearchCenter], false);
        add("supervisor", "Supervisor", F::Industry, 3800.0, 55.0,
            &[(S::Management, 0.3), (S::Manufacturing, 0.4)],
            &[(S::Management, 0.02)],
            &[(T::Extraversion, 0.6), (T::Ambition, 0.6)],
            &["manager"], &[B::Factory, B::Mine], false);
        add("manager", "Manager", F::Industry, 5500.0, 70.0,
            &[(S::Management, 0.5), (S::Communication, 0.4)],
            &[(S::Management, 0.02), (S::Communication, 0.01)],
            &[(T::Extraversion, 0.7), (T::Ambition, 0.8)],
            &[], &[B::Factory, B::Restaurant, B::Market], false);

        // Service
        add("waiter", "Waiter", F::Service, 1600.0, 20.0,
            &[(S::Communication, 0.1)],
            &[(S::Communication, 0.02), (S::Cooking, 0.01)],
            &[(T::Extraversion, 0.7), (T::Agreeableness, 0.7)],
            &["chef"], &[B::Restaurant], true);
        add("chef", "Chef", F::Service, 2000.0, 60.0,
            &[(S::Cooking, 0.4)],
            &[(S::Cooking, 0.03)],
            &[(T::Openness, 0.6), (T::Conscientiousness, 0.6)],
            &["manager"], &[B::Restaurant], false);
        add("salesperson", "Salesperson", F::Service, 2200.0, 35.0,
            &[(S::Communication, 0.3), (S::Finance, 0.1)],
            &[(S::Communication, 0.02), (S::Finance, 0.01)],
            &[(T::Extraversion, 0.8)],
            &["manager"], &[B::Market, B::Warehouse], true);

        // Technology
        add("programmer", "Programmer", F::Technology, 5000.0, 60.0,
            &[(S::Programming, 0.5), (S::ProblemSolving, 0.4)],
            &[(S::Programming, 0.03), (S::ProblemSolving, 0.02)],
            &[(T::Openness, 0.7), (T::Conscientiousness, 0.6)],
            &["system_analyst", "tech_leader"], &[B::Laboratory], true);
        add("system_analyst", "System Analyst", F::Technology, 6000.0, 70.0,
            &[(S::Programming, 0.6), (S::ProblemSolving, 0.6)],
            &[(S::ProblemSolving, 0.02)],
            &[(T::Openness, 0.7), (T::Conscientiousness, 0.7)],
            &["tech_leader"], &[B::Laboratory, B::ResearchCenter], false);
        add("tech_leader", "Tech Leader", F::Technology, 7500.0, 80.0,
            &[(S::Programming, 0.7), (S::Management, 0.4)],
            &[(S::Management, 0.02)],
            &[(T::Ambition, 0.8), (T::Extraversion, 0.5)],
            &[], &[B::Laboratory, B::ResearchCenter], false);

        // Art
        add("artist", "Artist", F::Art, 1800.0, 45.0,
            &[(S::Art, 0.3)],
            &[(S::Art, 0.03)],
            &[(T::Openness, 0.9), (T::Neuroticism, 0.6)],
            &["art_director"], &[B::Theater, B::Workshop], true);
        add("art_director", "Art Director", F::Art, 4000.0, 70.0,
            &[(S::Art, 0.6), (S::Management, 0.3)],
            &[(S::Management, 0.02), (S::Art, 0.01)],
            &[(T::Openness, 0.8), (T::Ambition, 0.7)],
            &[], &[B::Theater], false);

        // Education
        add("teacher", "Teacher", F::Education, 2600.0, 55.0,
            &[(S::Teaching, 0.3), (S::Communication, 0.3)],
            &[(S::Teaching, 0.02), (S::Communication, 0.01)],
            &[(T::Agreeableness, 0.8), (T::Conscientiousness, 0.6)],
            &["professor"], &[B::School], true);
        add("librarian", "Librarian", F::Education, 2100.0, 45.0,
            &[(S::Teaching, 0.2), (S::Research, 0.2)],
            &[(S::Research, 0.02)],
            &[(T::Conscientiousness, 0.8), (T::Extraversion, 0.3)],
            &["professor"], &[B::Library], true);
        add("professor", "Professor", F::Education, 4800.0, 80.0,
            &[(S::Teaching, 0.6), (S::Research, 0.5)],
            &[(S::Research, 0.02), (S::Teaching, 0.01)],
            &[(T::Openness, 0.8), (T::Conscientiousness, 0.7)],
            &[], &[B::School, B::Library, B::ResearchCenter], false);

        // Medical
        add("nurse", "Nurse", F::Medical, 2800.0, 50.0,
            &[(S::Medicine, 0.3)],
            &[(S::Medicine, 0.02)],
            &[(T::Agreeableness, 0.8), (T::Conscientiousness, 0.7)],
            &["doctor"], &[B::Hospital], true);
        add("doctor", "Doctor", F::Medical, 6000.0, 85.0,
            &[(S::Medicine, 0.5), (S::ProblemSolving, 0.3)],
            &[(S::Medicine, 0.02)],
            &[(T::Conscientiousness, 0.8), (T::Neuroticism, 0.3)],
            &[], &[B::Hospital], false);

        // Finance
        add("accountant", "Accountant", F::Finance, 3000.0, 50.0,
            &[(S::Finance, 0.3)],
            &[(S::Finance, 0.02)],
            &[(T::Conscientiousness, 0.9)],
            &["manager"], &[B::Market], true);

        // Government
        add("civil_servant", "Civil Servant", F::Government, 2700.0, 55.0,
            &[(S::Communication, 0.2), (S::Management, 0.1)],
            &[(S::Management, 0.02)],
            &[(T::Conscientiousness, 0.7), (T::Agreeableness, 0.6)],
            &["politician"], &[B::SocialCenter], true);
        add("politician", "Politician", F::Government, 6000.0, 90.0,
            &[(S::Communication, 0.6), (S::Management, 0.5)],
            &[(S::Communication, 0.02)],
            &[(T::Extraversion, 0.8), (T::Ambition, 0.9)],
            &[], &[B::SocialCenter], false);

        // Entertainment
        add("performer", "Performer", F::Entertainment, 2000.0, 40.0,
            &[(S::Art, 0.2), (S::Communication, 0.3)],
            &[(S::Art, 0.02), (S::Communication, 0.02)],
            &[(T::Extraversion, 0.9), (T::Openness, 0.7)],
            &["art_director"], &[B::Theater], true);

        catalog
    }

    /// Add or replace a career
    pub fn add(&mut self, record: CareerRecord) {
        if let Some(&i) = self.index.get(&record.id) {
            self.careers[i] = record;
        } else {
            self.index.insert(record.id.clone(), self.careers.len());
            self.careers.push(record);
        }
    }

    pub fn get(&self, id: &CareerId) -> Option<&CareerRecord> {
        self.index.get(id).map(|&i| &self.careers[i])
    }

    /// Like [`get`](Self::get) but logs unknown ids
    pub fn lookup(&self, id: &CareerId) -> Option<&CareerRecord> {
        let record = self.get(id);
        if record.is_none() {
            tracing::warn!(career = %id, "unknown career id");
        }
        record
    }

    pub fn all(&self) -> &[CareerRecord] {
        &self.careers
    }

    pub fn len(&self) -> usize {
        self.careers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.careers.is_empty()
    }

    pub fn entry_level(&self) -> impl Iterator<Item = &CareerRecord> {
        self.careers.iter().filter(|c| c.entry_level)
    }

    /// Careers practiced at a building type
    pub fn for_building(&self, building: BuildingType) -> impl Iterator<Item = &CareerRecord> {
        self.careers.iter().filter(move |c| c.works_at(building))
    }

    /// Load careers from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, CatalogLoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse careers from a TOML string
    ///
    /// Entries naming an unknown field are skipped, as are unknown skills,
    /// traits, building types and promotion targets within an entry. Each
    /// skip is logged.
    pub fn parse_toml(content: &str) -> Result<Self, CatalogLoadError> {
        let data: TomlCareers = toml::from_str(content)?;

        let mut catalog = Self::new();
        for career in data.careers {
            if let Some(record) = career.into_record() {
                catalog.add(record);
            }
        }

        let known: Vec<CareerId> = catalog.careers.iter().map(|c| c.id.clone()).collect();
        for career in &mut catalog.careers {
            career.promotions.retain(|target| {
                let ok = known.contains(target);
                if !ok {
                    tracing::warn!(career = %career.id, target = %target, "dropping unknown promotion target");
                }
                ok
            });
        }

        if catalog.is_empty() {
            return Err(CatalogLoadError::Empty);
        }
        Ok(catalog)
    }
}

/// TOML representation of a careers file
#[derive(Debug, Deserialize)]
struct TomlCareers {
    careers: Vec<TomlCareer>,
}

/// TOML representation of a single career
#[derive(Debug, Deserialize)]
struct TomlCareer {
    id: String,
    name: String,
    field: String,
    base_salary: f32,
    social_status: f32,
    #[serde(default)]
    entry_level: bool,
    #[serde(default)]
    required_skills: BTreeMap<String, f32>,
    #[serde(default)]
    skill_growth: BTreeMap<String, f32>,
    #[serde(default)]
    personality: BTreeMap<String, f32>,
    #[serde(default)]
    promotions: Vec<String>,
    #[serde(default)]
    workplaces: Vec<String>,
}

impl TomlCareer {
    fn into_record(self) -> Option<CareerRecord> {
        let Some(field) = CareerField::from_name(&self.field) else {
            tracing::warn!(career = %self.id, field = %self.field, "skipping career with unknown field");
            return None;
        };

        let id = self.id;
        let skills = |map: BTreeMap<String, f32>| -> Vec<(SkillType, f32)> {
            map.into_iter()
                .filter_map(|(name, value)| match SkillType::from_name(&name) {
                    Some(skill) => Some((skill, value)),
                    None => {
                        tracing::warn!(career = %id, skill = %name, "skipping unknown skill");
                        None
                    }
                })
                .collect()
        };
        let required_skills = skills(self.required_skills);
        let skill_growth = skills(self.skill_growth);

        let personality = self
            .personality
            .into_iter()
            .filter_map(|(name, value)| match TraitType::from_name(&name) {
                Some(t) => Some((t, value.clamp(0.0, 1.0))),
                None => {
                    tracing::warn!(career = %id, trait_name = %name, "skipping unknown trait");
                    None
                }
            })
            .collect();

        let workplaces = self
            .workplaces
            .into_iter()
            .filter_map(|name| match BuildingType::from_name(&name) {
                Some(b) => Some(b),
                None => {
                    tracing::warn!(career = %id, building = %name, "skipping unknown building type");
                    None
                }
            })
            .collect();

        Some(CareerRecord {
            id: CareerId::new(id),
            name: self.name,
            field,
            base_salary: self.base_salary.max(0.0),
            social_status: self.social_status.clamp(0.0, 100.0),
            required_skills,
            skill_growth,
            personality,
            promotions: self.promotions.into_iter().map(CareerId::new).collect(),
            workplaces,
            entry_level: self.entry_level,
        })
    }
}
