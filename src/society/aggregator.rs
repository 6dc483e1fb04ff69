//! Society aggregator - population-level statistics at a coarse interval

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;
use crate::entity::agent::Agent;
use crate::entity::ideology::IdeologyAxis;
use crate::society::stats::{gini, mean, variance};

/// Per-axis variance at which ideological spread counts as maximal (uniform 0-100 ~ 833)
const MAX_VARIANCE: f32 = 2500.0;
const VARIANCE_WEIGHT: f32 = 0.6;
const INEQUALITY_WEIGHT: f32 = 0.4;

/// Snapshot of the whole population
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocietyStats {
    pub tick: Tick,
    pub population: usize,
    pub average_morality: f32,
    /// Mean per-axis ideological variance
    pub cultural_diversity: f32,
    pub ideology_means: [f32; IdeologyAxis::COUNT],
    pub ideology_variances: [f32; IdeologyAxis::COUNT],
    /// 0-100, from ideological spread and wealth inequality
    pub conflict_level: f32,
    /// `100 - conflict_level`
    pub social_stability: f32,
    /// Mean innovation drive
    pub innovation_index: f32,
    pub gini: f32,
    pub average_wealth: f32,
    pub average_happiness: f32,
    /// Head count per class, lowest first
    pub class_distribution: [usize; 4],
    pub employed: usize,
    /// Needs at or below the critical level, summed over everyone
    pub critical_needs: usize,
}

impl SocietyStats {
    pub fn collect(tick: Tick, agents: &[Agent]) -> Self {
        let wealth: Vec<f32> = agents.iter().map(|a| a.wealth()).collect();
        let morality: Vec<f32> = agents.iter().map(|a| a.morality).collect();
        let innovation: Vec<f32> = agents.iter().map(|a| a.innovation_drive).collect();
        let happiness: Vec<f32> = agents.iter().map(|a| a.happiness).collect();

        let mut ideology_means = [0.0; IdeologyAxis::COUNT];
        let mut ideology_variances = [0.0; IdeologyAxis::COUNT];
        for axis in IdeologyAxis::ALL {
            let values: Vec<f32> = agents.iter().map(|a| a.ideology.get(axis)).collect();
            ideology_means[axis.index()] = mean(&values);
            ideology_variances[axis.index()] = variance(&values);
        }
        let cultural_diversity = mean(&ideology_variances);

        let mut class_distribution = [0usize; 4];
        for agent in agents {
            class_distribution[agent.demographics.social_class.index()] += 1;
        }

        let gini = gini(&wealth);
        let conflict_level = 100.0
            * (VARIANCE_WEIGHT * (cultural_diversity / MAX_VARIANCE).min(1.0)
                + INEQUALITY_WEIGHT * gini);

        Self {
            tick,
            population: agents.len(),
            average_morality: mean(&morality),
            cultural_diversity,
            ideology_means,
            ideology_variances,
            conflict_level,
            social_stability: 100.0 - conflict_level,
            innovation_index: mean(&innovation),
            gini,
            average_wealth: mean(&wealth),
            average_happiness: mean(&happiness),
            class_distribution,
            employed: agents.iter().filter(|a| a.career.is_employed()).count(),
            critical_needs: agents.iter().map(|a| a.needs.critical().count()).sum(),
        }
    }
}

/// Bounded snapshot history, oldest dropped first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SocietyAggregator {
    history: VecDeque<SocietyStats>,
    capacity: usize,
}

impl SocietyAggregator {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.min(256)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, tick: Tick, agents: &[Agent]) -> &SocietyStats {
        let stats = SocietyStats::collect(tick, agents);
        tracing::info!(
            tick,
            population = stats.population,
            gini = stats.gini,
            stability = stats.social_stability,
            "society snapshot"
        );
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(stats);
        &self.history[self.history.len() - 1]
    }

    pub fn latest(&self) -> Option<&SocietyStats> {
        self.history.back()
    }

    /// Snapshots from oldest to newest
    pub fn history(&self) -> impl Iterator<Item = &SocietyStats> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::AgentId;
    use crate::economy::catalog::{ResourceCatalog, ResourceType};
    use crate::entity::ideology::Ideology;
    use crate::entity::needs::NeedType;

    fn agent(wealth: f32, ideology: f32) -> Agent {
        let mut a = Agent::new(
            AgentId::new(),
            "Test",
            &ResourceCatalog::with_defaults(),
            &SimulationConfig::default(),
        );
        a.inventory.add(ResourceType::Money, wealth);
        a.ideology = Ideology::new([ideology; IdeologyAxis::COUNT]);
        a
    }

    #[test]
    fn test_uniform_society_is_stable() {
        let agents = vec![agent(100.0, 50.0), agent(100.0, 50.0), agent(100.0, 50.0)];
        let stats = SocietyStats::collect(7, &agents);
        assert_eq!(stats.population, 3);
        assert_eq!(stats.gini, 0.0);
        assert_eq!(stats.cultural_diversity, 0.0);
        assert_eq!(stats.conflict_level, 0.0);
        assert_eq!(stats.social_stability, 100.0);
        assert_eq!(stats.class_distribution, [3, 0, 0, 0]);
        assert_eq!(stats.average_wealth, 100.0);
        assert_eq!(stats.critical_needs, 0);
    }

    #[test]
    fn test_critical_needs_counted() {
        let mut hungry = agent(0.0, 50.0);
        hungry.needs.get_mut(NeedType::Food).set_pressure(95.0);
        hungry.needs.get_mut(NeedType::Sleep).set_pressure(90.0);
        let mut tired = agent(0.0, 50.0);
        tired.needs.get_mut(NeedType::Sleep).set_pressure(85.0);
        // Pressure 50 is far from critical
        tired.needs.get_mut(NeedType::Social).set_pressure(50.0);

        let stats = SocietyStats::collect(0, &[hungry, tired]);
        assert_eq!(stats.critical_needs, 3);
    }

    #[test]
    fn test_polarized_society_has_conflict() {
        let agents = vec![agent(0.0, 0.0), agent(1000.0, 100.0)];
        let stats = SocietyStats::collect(0, &agents);
        // variance 2500 on every axis, gini 0.5
        assert!((stats.cultural_diversity - 2500.0).abs() < 1e-2);
        assert!((stats.conflict_level - 80.0).abs() < 1e-3);
        assert!((stats.social_stability - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_population() {
        let stats = SocietyStats::collect(0, &[]);
        assert_eq!(stats.population, 0);
        assert_eq!(stats.social_stability, 100.0);
    }

    #[test]
    fn test_aggregator_keeps_history() {
        let mut aggregator = SocietyAggregator::new(10);
        let agents = vec![agent(10.0, 20.0)];
        aggregator.record(1, &agents);
        aggregator.record(2, &agents);
        assert_eq!(aggregator.len(), 2);
        assert_eq!(aggregator.latest().map(|s| s.tick), Some(2));
    }

    #[test]
    fn test_aggregator_history_is_bounded() {
        let mut aggregator = SocietyAggregator::new(3);
        let agents = vec![agent(10.0, 20.0)];
        for tick in 0..8 {
            aggregator.record(tick, &agents);
        }
        assert_eq!(aggregator.len(), 3);
        let ticks: Vec<Tick> = aggregator.history().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![5, 6, 7]);
    }
}
