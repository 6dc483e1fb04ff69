use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Tick};

/// Kind of tie between two agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Family,
    Friend,
    Mentor,
    Colleague,
    Superior,
    Subordinate,
    Rival,
    Partner,
    Enemy,
    Lover,
    Spouse,
    Student,
    Teacher,
}

impl RelationKind {
    /// The kind as seen from the other side of the tie
    pub fn reciprocal(self) -> Self {
        match self {
            RelationKind::Mentor => RelationKind::Student,
            RelationKind::Student => RelationKind::Mentor,
            RelationKind::Superior => RelationKind::Subordinate,
            RelationKind::Subordinate => RelationKind::Superior,
            RelationKind::Teacher => RelationKind::Student,
            other => other,
        }
    }
}

/// One logged interaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub tick: Tick,
    pub compatibility: f32,
    pub alignment: f32,
}

/// A directed relationship edge, keyed by the peer's id in the owner's network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialRelation {
    pub peer: AgentId,
    pub kind: RelationKind,
    /// 0.0 = strangers, 1.0 = inseparable
    pub intimacy: f32,
    /// 0.0 = no trust, 1.0 = complete trust
    pub trust: f32,
    /// How much the peer sways the owner, 0.0 - 1.0
    pub influence: f32,
    /// Total time the relation has existed
    pub duration: f32,
    pub interactions: u32,
    log: VecDeque<InteractionRecord>,
}

impl SocialRelation {
    pub const INTIMACY_DECAY: f32 = 0.01;
    pub const TRUST_DECAY: f32 = 0.005;

    /// A fresh acquaintance with small random intimacy, trust and influence
    pub fn new<R: Rng + ?Sized>(peer: AgentId, kind: RelationKind, rng: &mut R) -> Self {
        Self {
            peer,
            kind,
            intimacy: rng.gen_range(0.1..=0.3),
            trust: rng.gen_range(0.1..=0.3),
            influence: rng.gen_range(0.0..=0.1),
            duration: 0.0,
            interactions: 0,
            log: VecDeque::new(),
        }
    }

    /// Continuous decay over `dt`
    pub fn decay(&mut self, dt: f32) {
        self.intimacy = (self.intimacy - Self::INTIMACY_DECAY * dt).max(0.0);
        self.trust = (self.trust - Self::TRUST_DECAY * dt).max(0.0);
        self.duration += dt;
    }

    /// Apply the relationship gains of one interaction
    pub fn reinforce(&mut self, compatibility: f32, alignment: f32) {
        self.intimacy = (self.intimacy + compatibility * 0.1).clamp(0.0, 1.0);
        self.trust = (self.trust + (compatibility + alignment) * 0.05).clamp(0.0, 1.0);
    }

    /// Append to the bounded interaction log
    pub fn record(&mut self, record: InteractionRecord, capacity: usize) {
        self.interactions += 1;
        self.log.push_back(record);
        while self.log.len() > capacity {
            self.log.pop_front();
        }
    }

    pub fn log(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.log.iter()
    }

    pub fn strength(&self) -> f32 {
        (self.intimacy + self.trust) / 2.0
    }

    /// Both intimacy and trust have decayed away
    pub fn is_stale(&self) -> bool {
        self.intimacy <= 0.0 && self.trust <= 0.0
    }
}
