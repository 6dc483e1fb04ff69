//! Construction system - advances building sites and upgrades

use crate::city::building::{BuildingArchetype, BuildingId, ContributionResult};
use crate::core::types::Tick;

/// Base construction rate per unit of time
const BASE_RATE: f32 = 1.0;

/// Calculate team contribution with diminishing returns
///
/// Formula: sqrt(workers)
/// - 1 worker = 1.0
/// - 4 workers = 2.0
/// - 9 workers = 3.0
pub fn calculate_team_contribution(worker_count: u32, max_workers: u32) -> f32 {
    let effective = worker_count.min(max_workers) as f32;
    effective.sqrt()
}

/// Individual worker contribution from construction skill
///
/// Formula: BASE_RATE * (0.5 + skill * 0.5)
/// - Skill 0.0 => 0.5
/// - Skill 1.0 => 1.0
pub fn calculate_worker_contribution(construction_skill: f32) -> f32 {
    BASE_RATE * (0.5 + construction_skill.clamp(0.0, 1.0) * 0.5)
}

/// Work applied to a site over `dt`
///
/// Sites progress at the base rate on their own; assigned workers speed up
/// upgrades by their mean contribution scaled by team size.
pub fn construction_work(dt: f32, worker_skills: &[f32], max_workers: u32) -> f32 {
    if worker_skills.is_empty() {
        return BASE_RATE * dt;
    }
    let mean = worker_skills
        .iter()
        .map(|s| calculate_worker_contribution(*s))
        .sum::<f32>()
        / worker_skills.len() as f32;
    let team = calculate_team_contribution(worker_skills.len() as u32, max_workers);
    BASE_RATE * dt * (1.0 + team * mean)
}

/// Apply construction work to a building
pub fn apply_construction_work(
    buildings: &mut BuildingArchetype,
    building_idx: usize,
    work_amount: f32,
    current_tick: Tick,
) -> ContributionResult {
    if building_idx >= buildings.count() {
        return ContributionResult::NotApplicable;
    }
    buildings.advance_construction(building_idx, work_amount, current_tick)
}

/// Advance every site and upgrade; returns buildings that became operational
///
/// `worker_skills` yields the construction skill of each worker assigned to
/// the building at the given index.
pub fn tick_construction<F>(
    buildings: &mut BuildingArchetype,
    dt: f32,
    current_tick: Tick,
    worker_skills: F,
) -> Vec<BuildingId>
where
    F: Fn(usize) -> Vec<f32>,
{
    let sites: Vec<usize> = buildings.iter_under_construction().collect();

    let mut completed = Vec::new();
    for idx in sites {
        let skills = worker_skills(idx);
        let max = buildings.building_types[idx].max_workers();
        let work = construction_work(dt, &skills, max);
        if apply_construction_work(buildings, idx, work, current_tick) == ContributionResult::Completed {
            tracing::debug!(
                building = ?buildings.building_types[idx],
                level = buildings.levels[idx],
                "construction completed"
            );
            completed.push(buildings.ids[idx]);
        }
    }
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::{BuildingState, BuildingType};
    use crate::core::types::Vec2;
    use crate::economy::catalog::ResourceCatalog;

    #[test]
    fn test_team_contribution_diminishing_returns() {
        assert!((calculate_team_contribution(1, 5) - 1.0).abs() < 0.01);
        assert!((calculate_team_contribution(2, 5) - 1.414).abs() < 0.01);
        assert!((calculate_team_contribution(4, 5) - 2.0).abs() < 0.01);
        // Over max is capped
        assert!(
            (calculate_team_contribution(10, 5) - calculate_team_contribution(5, 5)).abs() < 0.01
        );
    }

    #[test]
    fn test_worker_contribution_formula() {
        assert!((calculate_worker_contribution(0.0) - 0.5).abs() < 0.01);
        assert!((calculate_worker_contribution(1.0) - 1.0).abs() < 0.01);
        assert!((calculate_worker_contribution(2.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_unstaffed_site_progresses_at_base_rate() {
        assert!((construction_work(1.0, &[], 5) - 1.0).abs() < 1e-6);
        // one worker at full skill doubles the rate
        assert!((construction_work(1.0, &[1.0], 5) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_tick_construction_completes_house() {
        let catalog = ResourceCatalog::with_defaults();
        let mut buildings = BuildingArchetype::new();
        let id = BuildingId::new();
        buildings.spawn(id, BuildingType::House, Vec2::new(0.0, 0.0), 0, &catalog, 0.0);

        // House takes 30 units of time; one spare tick absorbs rounding
        let mut completed = Vec::new();
        for tick in 1..=31 {
            completed.extend(tick_construction(&mut buildings, 1.0, tick, |_| Vec::new()));
        }
        assert_eq!(completed, vec![id]);
        assert_eq!(buildings.states[0], BuildingState::Operating);
    }

    #[test]
    fn test_apply_construction_out_of_range() {
        let mut buildings = BuildingArchetype::new();
        let result = apply_construction_work(&mut buildings, 0, 10.0, 100);
        assert_eq!(result, ContributionResult::NotApplicable);
    }
}
