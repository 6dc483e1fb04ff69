use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::relation::{RelationKind, SocialRelation};
use crate::core::types::AgentId;

/// An agent's outgoing relationship edges, keyed by peer id
///
/// Ordered by id so that sums over the network are reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialNetwork {
    relations: BTreeMap<AgentId, SocialRelation>,
}

impl SocialNetwork {
    /// Upper bound on network influence
    pub const MAX_INFLUENCE: f32 = 100.0;

    /// A full network gives up an edge weaker than this for a newcomer
    pub const EVICTION_STRENGTH: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn get(&self, peer: AgentId) -> Option<&SocialRelation> {
        self.relations.get(&peer)
    }

    pub fn get_mut(&mut self, peer: AgentId) -> Option<&mut SocialRelation> {
        self.relations.get_mut(&peer)
    }

    pub fn contains(&self, peer: AgentId) -> bool {
        self.relations.contains_key(&peer)
    }

    /// Get the relation to `peer`, creating it if there is room
    ///
    /// At capacity the weakest edge below [`Self::EVICTION_STRENGTH`] makes
    /// way; returns `None` when there is none to drop.
    pub fn ensure<R: Rng + ?Sized>(
        &mut self,
        peer: AgentId,
        kind: RelationKind,
        max_relations: usize,
        rng: &mut R,
    ) -> Option<&mut SocialRelation> {
        if !self.relations.contains_key(&peer) {
            if self.relations.len() >= max_relations {
                let weakest = self.weakest().filter(|r| r.strength() < Self::EVICTION_STRENGTH)?;
                let evicted = weakest.peer;
                self.relations.remove(&evicted);
            }
            self.relations.insert(peer, SocialRelation::new(peer, kind, rng));
        }
        self.relations.get_mut(&peer)
    }

    /// Lowest-strength edge, earliest peer id on ties
    pub fn weakest(&self) -> Option<&SocialRelation> {
        self.relations
            .values()
            .min_by(|a, b| a.strength().total_cmp(&b.strength()))
    }

    pub fn remove(&mut self, peer: AgentId) -> Option<SocialRelation> {
        self.relations.remove(&peer)
    }

    /// Decay every edge over `dt`
    pub fn decay(&mut self, dt: f32) {
        for relation in self.relations.values_mut() {
            relation.decay(dt);
        }
    }

    /// Drop edges whose intimacy and trust are both zero, returning how many
    pub fn prune_stale(&mut self) -> usize {
        let before = self.relations.len();
        self.relations.retain(|_, r| !r.is_stale());
        before - self.relations.len()
    }

    /// `min(sum(influence * trust), 100)`
    pub fn influence(&self) -> f32 {
        self.relations
            .values()
            .map(|r| r.influence * r.trust)
            .sum::<f32>()
            .min(Self::MAX_INFLUENCE)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocialRelation> {
        self.relations.values()
    }

    pub fn peers(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.relations.keys().copied()
    }
}
