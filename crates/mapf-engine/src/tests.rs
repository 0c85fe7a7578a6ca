//! End-to-end tests: every planner through the dispatch, checked by the
//! validator.

#[cfg(test)]
mod helpers {
    use mapf_core::Position;
    use mapf_map::{GridMap, Scenario, ScenarioBuilder};

    pub fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    /// Two agents crossing at (1,1); solvable by every planner, and the
    /// crossing cell is interior to its region so the hierarchical repair
    /// applies too.
    pub fn crossing_scenario() -> Scenario {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(5, 5));
        b.agent_with_goal("a", p(0, 1), p(3, 1));
        b.agent_with_goal("b", p(1, 0), p(1, 3));
        b.build().unwrap()
    }
}

#[cfg(test)]
mod dispatch {
    use super::helpers::{crossing_scenario, p};
    use crate::{ValidationMode, Validator, mapf};
    use mapf_core::{Algorithm, Deadline, PlannerParams};
    use mapf_map::{GridMap, ScenarioBuilder};

    #[test]
    fn every_classic_planner_validates() {
        let scenario = crossing_scenario();
        for algorithm in [
            Algorithm::CaStar,
            Algorithm::HierarchicalCbs,
            Algorithm::RuntimeReplanner,
            Algorithm::TrafficSimulator,
        ] {
            let params = PlannerParams::with_algorithm(algorithm);
            let solution = mapf(&scenario, &params, &Deadline::NONE)
                .unwrap()
                .unwrap_or_else(|| panic!("{algorithm:?} failed the crossing"));
            Validator::check(&scenario, &solution.plan, ValidationMode::Classic)
                .unwrap_or_else(|e| panic!("{algorithm:?} produced an invalid plan: {e}"));
        }
    }

    #[test]
    fn alternating_replanner_validates_dynamically() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(6, 6));
        b.agent_with_goal("a", p(0, 0), p(5, 0));
        b.agent_with_goal("b", p(0, 2), p(5, 2));
        let scenario = b.build().unwrap();

        let params = PlannerParams {
            algorithm: Algorithm::AlternatingRuntimeReplanner,
            direction_change_frequency: 2,
            ..PlannerParams::default()
        };
        let solution = mapf(&scenario, &params, &Deadline::NONE).unwrap().unwrap();
        Validator::check(&scenario, &solution.plan, ValidationMode::Dynamic(2)).unwrap();
    }

    #[test]
    fn token_passing_serves_the_stream() {
        let map = GridMap::parse(
            "P...P
             .....
             P...P",
        )
        .unwrap();
        let mut b = ScenarioBuilder::new(map);
        b.agent("a", p(0, 0));
        b.agent("b", p(4, 0));
        b.task(vec![p(2, 0), p(2, 2)], 0);
        b.task(vec![p(1, 1), p(3, 1)], 7);
        let scenario = b.build().unwrap();

        let params = PlannerParams::with_algorithm(Algorithm::TokenPassing);
        let solution = mapf(&scenario, &params, &Deadline::NONE).unwrap().unwrap();
        Validator::check(&scenario, &solution.plan, ValidationMode::Classic).unwrap();
        assert!(solution.tasks.iter().all(|t| t.completed_at.is_some()));
    }

    #[test]
    fn unsolvable_is_none_not_error() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(2, 1));
        b.agent_with_goal("a", p(0, 0), p(1, 0));
        b.agent_with_goal("b", p(1, 0), p(0, 0));
        let scenario = b.build().unwrap();

        let params = PlannerParams::with_algorithm(Algorithm::CaStar);
        assert!(mapf(&scenario, &params, &Deadline::NONE).unwrap().is_none());
    }

    #[test]
    fn deep_copy_validates_identically() {
        let scenario = crossing_scenario();
        let params = PlannerParams::with_algorithm(Algorithm::CaStar);
        let solution = mapf(&scenario, &params, &Deadline::NONE).unwrap().unwrap();

        let copy = solution.plan.clone();
        let original = Validator::check(&scenario, &solution.plan, ValidationMode::Classic);
        let copied = Validator::check(&scenario, &copy, ValidationMode::Classic);
        assert_eq!(original, copied);
    }
}

#[cfg(test)]
mod validator {
    use super::helpers::{crossing_scenario, p};
    use crate::{ValidationError, ValidationMode, Validator};
    use mapf_core::{CommonPlan, Plan};
    use mapf_map::{GridMap, ScenarioBuilder};

    #[test]
    fn accepts_a_hand_built_valid_plan() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(3, 1));
        b.agent_with_goal("a", p(0, 0), p(2, 0));
        let scenario = b.build().unwrap();

        let mut plan = Plan::new(p(0, 0).at(0));
        plan.push(p(1, 0));
        plan.push(p(2, 0));
        let common = CommonPlan::new(vec![plan]);
        Validator::check(&scenario, &common, ValidationMode::Classic).unwrap();
    }

    #[test]
    fn rejects_wrong_plan_count() {
        let scenario = crossing_scenario();
        let common = CommonPlan::new(vec![Plan::new(p(0, 2).at(0))]);
        assert!(matches!(
            Validator::check(&scenario, &common, ValidationMode::Classic),
            Err(ValidationError::PlanCountMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn rejects_wrong_start() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(3, 1));
        b.agent_with_goal("a", p(0, 0), p(2, 0));
        let scenario = b.build().unwrap();

        let mut plan = Plan::new(p(1, 0).at(0));
        plan.push(p(2, 0));
        let common = CommonPlan::new(vec![plan]);
        assert!(matches!(
            Validator::check(&scenario, &common, ValidationMode::Classic),
            Err(ValidationError::WrongStart { agent: 0, .. })
        ));
    }

    #[test]
    fn rejects_teleports_as_illegal_moves() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(3, 1));
        b.agent_with_goal("a", p(0, 0), p(2, 0));
        let scenario = b.build().unwrap();

        let plan = Plan::from_steps(vec![p(0, 0).at(0), p(2, 0).at(1)]);
        let common = CommonPlan::new(vec![plan]);
        assert!(matches!(
            Validator::check(&scenario, &common, ValidationMode::Classic),
            Err(ValidationError::IllegalMove { agent: 0, tick: 0, .. })
        ));
    }

    #[test]
    fn rejects_vertex_conflicts_under_resting() {
        // Agent 0 parks on (1,0); agent 1 walks into it one tick later.
        let mut b = ScenarioBuilder::new(GridMap::open_grid(3, 2));
        b.agent_with_goal("a", p(0, 0), p(1, 0));
        b.agent_with_goal("b", p(2, 0), p(1, 0));
        let scenario = b.build().unwrap();

        let mut a = Plan::new(p(0, 0).at(0));
        a.push(p(1, 0));
        let mut bee = Plan::new(p(2, 0).at(0));
        bee.push(p(2, 0));
        bee.push(p(1, 0));
        let common = CommonPlan::new(vec![a, bee]);
        assert!(matches!(
            Validator::check(&scenario, &common, ValidationMode::Classic),
            Err(ValidationError::VertexConflict { .. })
        ));
    }

    #[test]
    fn rejects_edge_swaps() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(2, 1));
        b.agent_with_goal("a", p(0, 0), p(1, 0));
        b.agent_with_goal("b", p(1, 0), p(0, 0));
        let scenario = b.build().unwrap();

        let mut a = Plan::new(p(0, 0).at(0));
        a.push(p(1, 0));
        let mut bee = Plan::new(p(1, 0).at(0));
        bee.push(p(0, 0));
        let common = CommonPlan::new(vec![a, bee]);
        assert!(matches!(
            Validator::check(&scenario, &common, ValidationMode::Classic),
            Err(ValidationError::EdgeConflict { tick: 0, .. })
        ));
    }

    #[test]
    fn rejects_unreached_goals() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(3, 1));
        b.agent_with_goal("a", p(0, 0), p(2, 0));
        let scenario = b.build().unwrap();

        let mut plan = Plan::new(p(0, 0).at(0));
        plan.push(p(1, 0));
        let common = CommonPlan::new(vec![plan]);
        assert!(matches!(
            Validator::check(&scenario, &common, ValidationMode::Classic),
            Err(ValidationError::GoalNotReached { agent: 0, .. })
        ));
    }

    #[test]
    fn dynamic_mode_rejects_wrong_phase_moves() {
        let map = GridMap::open_grid(4, 4);
        let mut b = ScenarioBuilder::new(map);
        b.agent_with_goal("a", p(0, 0), p(0, 1));
        let scenario = b.build().unwrap();

        // South move (0,0) → (0,1) at t = 0 under f = 2: period is
        // 0/2 + 0/2 + 0 + 1 = 1, odd — vertical passage needs even.
        let plan = Plan::from_steps(vec![p(0, 0).at(0), p(0, 1).at(1)]);
        let common = CommonPlan::new(vec![plan.clone()]);
        assert!(matches!(
            Validator::check(&scenario, &common, ValidationMode::Dynamic(2)),
            Err(ValidationError::IllegalMove { .. })
        ));
        // The same plan is fine on the static map.
        Validator::check(&scenario, &common, ValidationMode::Classic).unwrap();
    }
}
