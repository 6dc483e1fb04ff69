//! Pairwise social interaction and ideology exchange

use rand::Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::Tick;
use crate::entity::agent::Agent;
use crate::entity::social::memory::MemoryKind;
use crate::entity::social::relation::{InteractionRecord, RelationKind};
use crate::society::events::NOTABLE_INFLUENCE;

/// Base chance that two neighbors interact in one pass
pub const BASE_INTERACTION: f32 = 0.3;

/// Experience lead that makes a coworker a superior
pub const SENIORITY_GAP: f32 = 50.0;

/// Below this alignment, strangers from different workplaces become rivals
pub const RIVAL_ALIGNMENT: f32 = 0.2;

/// What `b` is to `a`, judged from shared workplace, seniority and ideology
pub fn relation_kind(a: &Agent, b: &Agent, alignment: f32) -> RelationKind {
    if a.workplace.is_some() && a.workplace == b.workplace {
        let lead = b.career.experience - a.career.experience;
        if lead > SENIORITY_GAP {
            RelationKind::Superior
        } else if lead < -SENIORITY_GAP {
            RelationKind::Subordinate
        } else {
            RelationKind::Colleague
        }
    } else if alignment < RIVAL_ALIGNMENT {
        RelationKind::Rival
    } else {
        RelationKind::Friend
    }
}

/// `0.3 * status * relation * ideology`, clamped to `[0, 1]`
///
/// Read from `a`'s side: the relation factor uses `a`'s intimacy with `b`.
pub fn interaction_probability(a: &Agent, b: &Agent) -> f32 {
    let status = 1.0 - (a.social_influence - b.social_influence).abs() / 100.0 * 0.5;
    let intimacy = a.network.get(b.id).map_or(0.0, |r| r.intimacy);
    let relation = 1.0 + intimacy * 0.5;
    let ideology = a.ideology.alignment(&b.ideology);
    (BASE_INTERACTION * status * relation * ideology).clamp(0.0, 1.0)
}

/// What happened in one interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionOutcome {
    pub compatibility: f32,
    pub alignment: f32,
    pub combined_influence: f32,
}

impl InteractionOutcome {
    pub fn is_notable(&self) -> bool {
        self.combined_influence > NOTABLE_INFLUENCE
    }
}

/// Let two agents interact
///
/// Both sides get (or reinforce) a relation and a memory, and each moves
/// its ideology toward the other's pre-interaction position. A side whose
/// network is full still exchanges ideology but records no relation.
pub fn interact<R: Rng + ?Sized>(
    a: &mut Agent,
    b: &mut Agent,
    config: &SimulationConfig,
    tick: Tick,
    rng: &mut R,
) -> InteractionOutcome {
    let compatibility = a.personality.similarity(&b.personality);
    let alignment = a.ideology.alignment(&b.ideology);
    let combined_influence = a.social_influence + b.social_influence;

    let kind_a = relation_kind(a, b, alignment);
    let kind_b = kind_a.reciprocal();
    let record = InteractionRecord { tick, compatibility, alignment };

    let ideology_a = a.ideology.clone();
    let ideology_b = b.ideology.clone();
    let influence_a = a.social_influence;
    let influence_b = b.social_influence;
    let (id_a, id_b) = (a.id, b.id);

    for (me, peer, kind, theirs, their_influence) in [
        (&mut *a, id_b, kind_a, &ideology_b, influence_b),
        (&mut *b, id_a, kind_b, &ideology_a, influence_a),
    ] {
        if let Some(relation) = me.network.ensure(peer, kind, config.max_relations, rng) {
            relation.reinforce(compatibility, alignment);
            relation.record(record, config.relation_log_capacity);
        }
        me.memory.push(tick, MemoryKind::Interaction { peer });
        me.ideology.absorb(theirs, their_influence);
        me.refresh_influence();
    }

    InteractionOutcome { compatibility, alignment, combined_influence }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingId;
    use crate::core::types::AgentId;
    use crate::economy::catalog::ResourceCatalog;
    use crate::entity::ideology::{Ideology, IdeologyAxis};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn agent(ideology: f32) -> Agent {
        let mut a = Agent::new(
            AgentId::new(),
            "Peer",
            &ResourceCatalog::with_defaults(),
            &SimulationConfig::default(),
        );
        a.ideology = Ideology::new([ideology; IdeologyAxis::COUNT]);
        a
    }

    #[test]
    fn test_aligned_pair_more_likely_than_divergent() {
        let a = agent(50.0);
        let same = agent(50.0);
        let p_same = interaction_probability(&a, &same);
        assert!((p_same - 0.3).abs() < 1e-5);

        let low = agent(0.0);
        let high = agent(100.0);
        let p_divergent = interaction_probability(&low, &high);
        assert_eq!(p_divergent, 0.0);
        assert!(p_same > p_divergent);
    }

    #[test]
    fn test_status_gap_lowers_probability() {
        let a = agent(50.0);
        let mut b = agent(50.0);
        b.social_influence = 100.0;
        // 0.3 * (1 - 0.5)
        assert!((interaction_probability(&a, &b) - 0.15).abs() < 1e-5);
    }

    #[test]
    fn test_interaction_is_symmetric() {
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut a = agent(20.0);
        let mut b = agent(80.0);
        a.social_influence = 50.0;
        b.social_influence = 50.0;

        let outcome = interact(&mut a, &mut b, &config, 4, &mut rng);

        assert!(a.network.contains(b.id));
        assert!(b.network.contains(a.id));
        assert_eq!(a.network.get(b.id).map(|r| r.interactions), Some(1));
        assert_eq!(a.memory.len(), 1);
        assert_eq!(b.memory.len(), 1);
        assert!(!outcome.is_notable());

        // Each moved 60 * 0.5 * 0.1 = 3 toward the other's old position
        assert!((a.ideology.get(IdeologyAxis::Liberal) - 23.0).abs() < 1e-3);
        assert!((b.ideology.get(IdeologyAxis::Liberal) - 77.0).abs() < 1e-3);
    }

    #[test]
    fn test_full_network_still_exchanges_ideology() {
        let config = SimulationConfig { max_relations: 0, ..SimulationConfig::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut a = agent(20.0);
        let mut b = agent(80.0);
        b.social_influence = 100.0;

        interact(&mut a, &mut b, &config, 0, &mut rng);
        assert!(a.network.is_empty());
        assert!(a.ideology.get(IdeologyAxis::Liberal) > 20.0);
    }

    #[test]
    fn test_senior_coworker_is_superior() {
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let workplace = Some(BuildingId::new());
        let mut junior = agent(50.0);
        let mut senior = agent(50.0);
        junior.workplace = workplace;
        senior.workplace = workplace;
        senior.career.experience = 120.0;

        interact(&mut junior, &mut senior, &config, 0, &mut rng);

        assert_eq!(junior.network.get(senior.id).map(|r| r.kind), Some(RelationKind::Superior));
        assert_eq!(senior.network.get(junior.id).map(|r| r.kind), Some(RelationKind::Subordinate));
    }

    #[test]
    fn test_relation_kind_by_context() {
        let workplace = Some(BuildingId::new());
        let mut a = agent(50.0);
        let mut b = agent(50.0);
        assert_eq!(relation_kind(&a, &b, 0.9), RelationKind::Friend);
        assert_eq!(relation_kind(&a, &b, 0.1), RelationKind::Rival);

        a.workplace = workplace;
        b.workplace = workplace;
        // Coworkers stay colleagues whatever their politics
        assert_eq!(relation_kind(&a, &b, 0.1), RelationKind::Colleague);
        b.career.experience = SENIORITY_GAP + 1.0;
        assert_eq!(relation_kind(&a, &b, 0.9), RelationKind::Superior);
        assert_eq!(relation_kind(&b, &a, 0.9), RelationKind::Subordinate);
    }
}
