//! The agent - one member of the society
//!
//! An agent exclusively owns its needs, inventory, skills, personality,
//! ideology, relations and memory. Other agents are referenced by id only.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::career::catalog::{CareerCatalog, CareerId};
use crate::career::progression::{choose_entry_career, CareerState};
use crate::city::building::BuildingId;
use crate::core::clock::IntervalGate;
use crate::core::config::SimulationConfig;
use crate::core::types::{AgentId, Vec2};
use crate::economy::catalog::{ResourceCatalog, ResourceType};
use crate::economy::inventory::Inventory;
use crate::entity::demographics::Demographics;
use crate::entity::ideology::{Ideology, IdeologyAxis};
use crate::entity::needs::{NeedType, Needs};
use crate::entity::personality::{Personality, TraitType};
use crate::entity::skills::{SkillType, Skills};
use crate::entity::social::memory::MemoryLog;
use crate::entity::social::network::SocialNetwork;

/// Neutral resting value for bounded 0-100 scalars
pub const NEUTRAL: f32 = 50.0;

/// Fraction of the gap to neutral happiness closed per unit of time
const HAPPINESS_RELAXATION: f32 = 0.01;

/// What the agent is doing about its needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConsumptionState {
    Idle,
    /// Heading for a facility to satisfy `need`
    Seeking { need: NeedType, target: BuildingId },
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    /// Written by the movement layer
    pub position: Vec2,
    pub demographics: Demographics,
    pub needs: Needs,
    /// Money held here is the agent's wealth
    pub inventory: Inventory,
    pub skills: Skills,
    pub personality: Personality,
    pub ideology: Ideology,
    pub network: SocialNetwork,
    pub career: CareerState,
    pub memory: MemoryLog,
    pub happiness: f32,
    pub health: f32,
    pub morality: f32,
    pub cultural_identity: f32,
    pub innovation_drive: f32,
    pub social_influence: f32,
    pub network_influence: f32,
    pub workplace: Option<BuildingId>,
    pub consumption: ConsumptionState,
    pub(crate) need_gate: IntervalGate,
    /// Time spent in the current seeking state
    pub(crate) seek_elapsed: f32,
    /// Per-agent stream so per-agent phases give the same result in any order
    pub(crate) rng: ChaCha8Rng,
}

impl Agent {
    /// Agent with neutral attributes and an empty inventory
    pub fn new(id: AgentId, name: impl Into<String>, resources: &ResourceCatalog, config: &SimulationConfig) -> Self {
        Self {
            id,
            name: name.into(),
            position: Vec2::default(),
            demographics: Demographics::default(),
            needs: Needs::new(),
            inventory: Inventory::new(resources),
            skills: Skills::new(),
            personality: Personality::default(),
            ideology: Ideology::default(),
            network: SocialNetwork::new(),
            career: CareerState::default(),
            memory: MemoryLog::new(config.memory_capacity),
            happiness: NEUTRAL,
            health: 100.0,
            morality: NEUTRAL,
            cultural_identity: NEUTRAL,
            innovation_drive: NEUTRAL,
            social_influence: 0.0,
            network_influence: 0.0,
            workplace: None,
            consumption: ConsumptionState::Idle,
            need_gate: IntervalGate::primed(config.need_check_interval),
            seek_elapsed: 0.0,
            rng: ChaCha8Rng::seed_from_u64(id.0.as_u128() as u64),
        }
    }

    /// Randomized agent with an entry-level career
    pub fn generate<R: Rng + ?Sized>(
        id: AgentId,
        position: Vec2,
        resources: &ResourceCatalog,
        careers: &CareerCatalog,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let mut agent = Self::new(id, generate_name(rng), resources, config);
        agent.position = position;
        agent.rng = ChaCha8Rng::seed_from_u64(rng.gen());

        agent.demographics = Demographics::random(rng);
        let wealth = agent.demographics.starting_wealth(rng);
        agent.inventory.add(ResourceType::Money, wealth);
        agent.inventory.add(ResourceType::Food, rng.gen_range(10.0..=50.0));
        agent.inventory.add(ResourceType::Water, rng.gen_range(10.0..=50.0));

        agent.skills = Skills::random(rng, agent.demographics.education);
        agent.personality = Personality::random(rng);
        agent.ideology = Ideology::random(rng);
        agent.health = rng.gen_range(70.0..=100.0);

        let p = &agent.personality;
        agent.morality = 30.0
            + 40.0 * (p.get(TraitType::Agreeableness) + p.get(TraitType::Conscientiousness)) / 2.0;
        agent.innovation_drive =
            100.0 * (p.get(TraitType::Openness) + p.get(TraitType::Ambition)) / 2.0;
        agent.cultural_identity = agent.ideology.get(IdeologyAxis::Conservative);

        agent.career = CareerState::new(choose_entry_career(
            careers,
            &agent.skills,
            &agent.personality,
            agent.demographics.prestige,
            rng,
        ));
        agent.refresh_influence();
        agent
    }

    pub fn wealth(&self) -> f32 {
        self.inventory.get(ResourceType::Money)
    }

    pub fn career_id(&self) -> Option<&CareerId> {
        self.career.career.as_ref()
    }

    pub fn adjust_happiness(&mut self, delta: f32) {
        self.happiness = (self.happiness + delta).clamp(0.0, 100.0);
    }

    /// Decay needs, relax happiness toward neutral and track health
    pub fn update_needs(&mut self, dt: f32) {
        self.needs.update(dt);
        self.happiness += (NEUTRAL - self.happiness) * (HAPPINESS_RELAXATION * dt).min(1.0);

        if self.needs.get(NeedType::Health).is_critical() {
            self.health = (self.health - 0.1 * dt).max(0.0);
        } else {
            self.health = (self.health + 0.05 * dt).min(100.0);
        }
    }

    /// Decay every relation; optionally drop those with nothing left
    pub fn decay_relations(&mut self, dt: f32, prune: bool) -> usize {
        self.network.decay(dt);
        let pruned = if prune { self.network.prune_stale() } else { 0 };
        self.network_influence = self.network.influence();
        pruned
    }

    pub fn drift_ideology(&mut self, dt: f32) {
        self.ideology.drift(&mut self.rng, dt);
        self.refresh_influence();
    }

    /// `min(network*0.3 + education*0.2 + wealth*0.0001 + prestige*0.3, 100)`
    pub fn refresh_influence(&mut self) {
        self.network_influence = self.network.influence();
        self.social_influence = (self.network_influence * 0.3
            + self.demographics.education * 0.2
            + self.wealth() * 0.0001
            + self.demographics.prestige * 0.3)
            .min(100.0);
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            wealth: self.wealth(),
            social_class: self.demographics.social_class,
            needs: NeedType::ALL.map(|n| self.needs.get(n).value),
            inventory: self.inventory.snapshot(),
            skills: SkillType::ALL
                .iter()
                .map(|s| (*s, self.skills.level(*s)))
                .filter(|(_, level)| *level > 0.0)
                .collect(),
            ideology: *self.ideology.values(),
            relations: self.network.len(),
            career: self.career.career.clone(),
            experience: self.career.experience,
            satisfaction: self.career.satisfaction,
            happiness: self.happiness,
            social_influence: self.social_influence,
        }
    }
}

/// Read-only view of an agent for presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub position: Vec2,
    pub wealth: f32,
    pub social_class: crate::entity::demographics::SocialClass,
    pub needs: [f32; NeedType::COUNT],
    pub inventory: Vec<(ResourceType, f32)>,
    pub skills: Vec<(SkillType, f32)>,
    pub ideology: [f32; IdeologyAxis::COUNT],
    pub relations: usize,
    pub career: Option<CareerId>,
    pub experience: f32,
    pub satisfaction: f32,
    pub happiness: f32,
    pub social_influence: f32,
}

fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    const FIRST: [&str; 16] = [
        "Ada", "Bruno", "Cira", "Dmitri", "Elena", "Farid", "Greta", "Hiro", "Ines", "Jonas",
        "Kaya", "Lior", "Mira", "Nadia", "Omar", "Priya",
    ];
    const LAST: [&str; 16] = [
        "Alder", "Brook", "Castell", "Dunmore", "Ellery", "Fairweather", "Garner", "Holt",
        "Ivers", "Jarrow", "Keene", "Lowell", "Marsh", "Norwood", "Oakes", "Pryor",
    ];
    format!("{} {}", FIRST[rng.gen_range(0..FIRST.len())], LAST[rng.gen_range(0..LAST.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(seed: u64) -> Agent {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let id = AgentId::from_rng(&mut rng);
        Agent::generate(
            id,
            Vec2::default(),
            &ResourceCatalog::with_defaults(),
            &CareerCatalog::with_defaults(),
            &SimulationConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_generated_agent_starts_provisioned() {
        let agent = generated(1);
        assert!(agent.wealth() >= 1000.0);
        assert!((10.0..=50.0).contains(&agent.inventory.get(ResourceType::Food)));
        assert!((10.0..=50.0).contains(&agent.inventory.get(ResourceType::Water)));
        assert!(agent.career.is_employed());
        assert!((0.0..=100.0).contains(&agent.social_influence));
        assert_eq!(agent.needs.get(NeedType::Food).value, 100.0);
    }

    #[test]
    fn test_generation_is_seeded() {
        let a = generated(9);
        let b = generated(9);
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.wealth(), b.wealth());
        assert_eq!(a.ideology.values(), b.ideology.values());
        assert_eq!(a.career.career, b.career.career);
    }

    #[test]
    fn test_happiness_relaxes_toward_neutral() {
        let mut agent = generated(2);
        agent.happiness = 90.0;
        agent.update_needs(1.0);
        assert!(agent.happiness < 90.0 && agent.happiness > NEUTRAL);

        agent.adjust_happiness(500.0);
        assert_eq!(agent.happiness, 100.0);
    }

    #[test]
    fn test_social_influence_formula() {
        let config = SimulationConfig::default();
        let mut agent = Agent::new(AgentId::new(), "Test", &ResourceCatalog::with_defaults(), &config);
        agent.demographics.education = 50.0;
        agent.demographics.prestige = 40.0;
        agent.inventory.add(ResourceType::Money, 10000.0);
        agent.refresh_influence();
        // 0 + 10 + 1 + 12
        assert!((agent.social_influence - 23.0).abs() < 1e-3);
    }
}
