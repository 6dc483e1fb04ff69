//! Agent registry - arena storage with an id index

use ahash::AHashMap;
use rand::Rng;

use crate::core::types::{AgentId, Vec2};
use crate::entity::agent::Agent;
use crate::simulation::context::SimContext;

/// Owns every agent; peers refer to each other by id through this registry
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    index: AHashMap<AgentId, usize>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Generate and register a random agent
    pub fn create<R: Rng + ?Sized>(&mut self, ctx: &SimContext, position: Vec2, rng: &mut R) -> AgentId {
        let id = self.fresh_id(rng);
        let agent = Agent::generate(id, position, &ctx.resources, &ctx.careers, &ctx.config, rng);
        self.push(agent)
    }

    /// Register an existing agent; a colliding id is replaced by a fresh one
    pub fn insert<R: Rng + ?Sized>(&mut self, mut agent: Agent, rng: &mut R) -> AgentId {
        if self.index.contains_key(&agent.id) {
            let id = self.fresh_id(rng);
            tracing::warn!(old = %agent.id, new = %id, "agent id collision, regenerated");
            agent.id = id;
        }
        self.push(agent)
    }

    fn fresh_id<R: Rng + ?Sized>(&self, rng: &mut R) -> AgentId {
        loop {
            let id = AgentId::from_rng(rng);
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    fn push(&mut self, agent: Agent) -> AgentId {
        let id = agent.id;
        self.index.insert(id, self.agents.len());
        self.agents.push(agent);
        id
    }

    /// Remove an agent; the last agent moves into its slot
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let idx = self.index.remove(&id)?;
        let removed = self.agents.swap_remove(idx);
        if let Some(moved) = self.agents.get(idx) {
            self.index.insert(moved.id, idx);
        }
        Some(removed)
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.index_of(id).map(|i| &self.agents[i])
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        let idx = self.index_of(id)?;
        self.agents.get_mut(idx)
    }

    pub fn list(&self) -> &[Agent] {
        &self.agents
    }

    pub(crate) fn list_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Arena indices ordered by agent id
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.agents.len()).collect();
        indices.sort_by_key(|&i| self.agents[i].id);
        indices
    }

    /// Two distinct agents mutably at once
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Agent, &mut Agent)> {
        if a == b || a >= self.agents.len() || b >= self.agents.len() {
            return None;
        }
        if a < b {
            let (left, right) = self.agents.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.agents.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn registry_with(n: usize) -> (AgentRegistry, Vec<AgentId>) {
        let ctx = SimContext::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut registry = AgentRegistry::new();
        let ids = (0..n)
            .map(|_| registry.create(&ctx, Vec2::default(), &mut rng))
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_create_and_get() {
        let (registry, ids) = registry_with(3);
        assert_eq!(registry.len(), 3);
        for id in ids {
            assert_eq!(registry.get(id).map(|a| a.id), Some(id));
        }
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let (mut registry, ids) = registry_with(4);
        let removed = registry.remove(ids[0]).unwrap();
        assert_eq!(removed.id, ids[0]);
        assert!(registry.get(ids[0]).is_none());
        assert!(registry.remove(ids[0]).is_none());
        for id in &ids[1..] {
            assert_eq!(registry.get(*id).map(|a| a.id), Some(*id));
        }
    }

    #[test]
    fn test_insert_regenerates_colliding_id() {
        let (mut registry, ids) = registry_with(1);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let duplicate = registry.get(ids[0]).cloned().unwrap();
        let new_id = registry.insert(duplicate, &mut rng);
        assert_ne!(new_id, ids[0]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(new_id));
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let (mut registry, _) = registry_with(3);
        let (a, b) = registry.pair_mut(2, 0).unwrap();
        a.happiness = 10.0;
        b.happiness = 20.0;
        assert_eq!(registry.list()[2].happiness, 10.0);
        assert_eq!(registry.list()[0].happiness, 20.0);
        assert!(registry.pair_mut(1, 1).is_none());
        assert!(registry.pair_mut(0, 9).is_none());
    }

    #[test]
    fn test_sorted_indices_follow_ids() {
        let (registry, _) = registry_with(5);
        let order = registry.sorted_indices();
        let ids: Vec<AgentId> = order.iter().map(|&i| registry.list()[i].id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
