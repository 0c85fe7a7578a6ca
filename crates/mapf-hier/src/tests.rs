//! Unit tests for regions, traversals, and the hierarchical planner.

#[cfg(test)]
mod helpers {
    use mapf_core::{CommonPlan, Position};

    pub fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    pub fn assert_conflict_free(common: &CommonPlan) {
        let makespan = common.makespan() as u32;
        let n = common.plans.len();
        for t in 0..makespan {
            for i in 0..n {
                for j in (i + 1)..n {
                    let (a0, b0) = (common.position_at(i, t), common.position_at(j, t));
                    assert!(
                        a0 != b0 || a0.is_none(),
                        "agents {i} and {j} share a cell at t = {t}"
                    );
                    let (a1, b1) = (common.position_at(i, t + 1), common.position_at(j, t + 1));
                    if let (Some(a0), Some(b0), Some(a1), Some(b1)) = (a0, b0, a1, b1) {
                        assert!(
                            !(a0 == b1 && b0 == a1 && a0 != a1),
                            "agents {i} and {j} swap at t = {t}"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod region {
    use super::helpers::p;
    use crate::RegionGrid;
    use mapf_core::RegionId;
    use mapf_map::{GridMap, GridMapBuilder};

    #[test]
    fn ten_by_ten_splits_into_sqrt_sized_regions() {
        // dim 10 → side 3 → 4×4 regions.
        let map = GridMap::open_grid(10, 10);
        let regions = RegionGrid::build(&map);
        assert_eq!(regions.regions().len(), 16);
        assert_eq!(regions.region_of(p(0, 0)), RegionId(0));
        assert_eq!(regions.region_of(p(3, 0)), RegionId(1));
        assert_eq!(regions.region_of(p(9, 0)), RegionId(3));
        assert_eq!(regions.region_of(p(0, 3)), RegionId(4));
        assert_eq!(regions.region_of(p(9, 9)), RegionId(15));
    }

    #[test]
    fn regions_own_interior_edges_and_share_borders() {
        let map = GridMap::open_grid(6, 6); // side 2 → 3×3 regions
        let regions = RegionGrid::build(&map);

        let interior = p(0, 0).to(p(1, 0));
        let owner = regions.region(regions.region_of(p(0, 0)));
        assert!(owner.has_edge(interior));
        assert!(!regions.is_border_edge(interior));

        let crossing = p(1, 0).to(p(2, 0));
        assert!(regions.is_border_edge(crossing));
        assert!(regions.is_border_edge(crossing.reversed()), "both originals survive");
        assert!(!owner.has_edge(crossing));
        assert!(regions.is_route_edge(crossing));
    }

    #[test]
    fn undirected_copies_are_stripped_from_borders() {
        // One-way passage (1,0) → (2,0) across the region boundary of a
        // 4-wide strip (side 2).  Undirecting adds the copy back edge; the
        // region layer must drop it.
        let mut b = GridMapBuilder::new(4, 1);
        b.corridor(p(0, 0), p(1, 0));
        b.edge(p(1, 0), p(2, 0));
        b.corridor(p(2, 0), p(3, 0));
        let mut map = b.build().unwrap();
        map.undirect();

        let regions = RegionGrid::build(&map);
        let original = p(1, 0).to(p(2, 0));
        assert!(regions.is_border_edge(original));
        assert!(regions.is_route_edge(original));
        assert!(!regions.is_border_edge(original.reversed()));
        assert!(!regions.is_route_edge(original.reversed()), "copy must be stripped");
    }
}

#[cfg(test)]
mod traversal {
    use super::helpers::p;
    use crate::planner::split_route;
    use crate::{RegionGrid, TraversalArena};
    use mapf_core::{AgentId, TraversalId};
    use mapf_map::GridMap;

    #[test]
    fn route_splits_at_region_boundaries() {
        let map = GridMap::open_grid(10, 10); // side 3
        let regions = RegionGrid::build(&map);
        let cells: Vec<_> = (0..10).map(|x| p(x, 4)).collect();

        let mut arena = TraversalArena::new();
        let high = split_route(AgentId(0), &cells, &regions, &mut arena);

        // x ∈ 0..2 | 3..5 | 6..8 | 9 → four traversals.
        assert_eq!(high.traversals.len(), 4);
        let first = arena.get(high.traversals[0]);
        assert_eq!((first.start, first.target), (p(0, 4), p(2, 4)));
        assert_eq!(first.start_time, 0);
        assert!(!first.goal_region);
        assert_eq!(first.prev, TraversalId::INVALID);

        let last = arena.get(high.traversals[3]);
        assert_eq!((last.start, last.target), (p(9, 4), p(9, 4)));
        assert_eq!(last.start_time, 9);
        assert!(last.goal_region);
        assert_eq!(last.next, TraversalId::INVALID);

        // Chain links and slice contiguity.
        for pair in high.traversals.windows(2) {
            let a = arena.get(pair[0]);
            let b = arena.get(pair[1]);
            assert_eq!(a.next, b.id);
            assert_eq!(b.prev, a.id);
            assert_eq!(b.plan.start_time(), a.plan.end_time() + 1);
        }

        // Reassembly reproduces the untimed route.
        let assembled = high.assemble(&arena);
        assert_eq!(assembled.len(), 10);
        assert_eq!(assembled.position_at(9, false), Some(p(9, 4)));
    }

    #[test]
    fn resting_semantics_differ_by_goal_flag() {
        let map = GridMap::open_grid(10, 10);
        let regions = RegionGrid::build(&map);
        let cells: Vec<_> = (0..4).map(|x| p(x, 0)).collect();

        let mut arena = TraversalArena::new();
        let high = split_route(AgentId(0), &cells, &regions, &mut arena);
        let passing = arena.get(high.traversals[0]);
        let goal = arena.get(high.traversals[1]);

        assert_eq!(passing.position_at(10), None, "a passing traversal vanishes");
        assert_eq!(goal.position_at(10), Some(p(3, 0)), "a goal traversal rests");
    }
}

#[cfg(test)]
mod planner {
    use super::helpers::{assert_conflict_free, p};
    use crate::HierarchicalCbsPlanner;
    use mapf_core::{Deadline, PlannerParams};
    use mapf_map::{GridMap, ScenarioBuilder};

    #[test]
    fn lone_agent_crosses_regions() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(10, 10));
        b.agent_with_goal("a", p(0, 4), p(9, 4));
        let scenario = b.build().unwrap();

        let solution = HierarchicalCbsPlanner
            .solve(&scenario, &PlannerParams::default(), &Deadline::NONE)
            .unwrap()
            .unwrap();
        assert_eq!(solution.plan.plans[0].len(), 10);
        assert_eq!(solution.plan.plans[0].last().unwrap().pos, p(9, 4));
    }

    #[test]
    fn crossing_inside_one_region_is_repaired_by_cbs() {
        // Both routes live inside the region x ∈ 0..2, y ∈ 3..5 and meet at
        // (1,4) at t = 1; one added constraint deconflicts them.
        let mut b = ScenarioBuilder::new(GridMap::open_grid(10, 10));
        b.agent_with_goal("a", p(0, 4), p(2, 4));
        b.agent_with_goal("b", p(1, 3), p(1, 5));
        let scenario = b.build().unwrap();

        let solution = HierarchicalCbsPlanner
            .solve(&scenario, &PlannerParams::default(), &Deadline::NONE)
            .unwrap()
            .expect("one wait resolves the crossing");
        assert_conflict_free(&solution.plan);
        assert_eq!(solution.plan.plans[0].last().unwrap().pos, p(2, 4));
        assert_eq!(solution.plan.plans[1].last().unwrap().pos, p(1, 5));
        // One agent keeps its 3-step plan, the other pays one wait.
        assert_eq!(solution.plan.flowtime(), 7);
    }

    #[test]
    fn trivial_start_is_goal() {
        let mut b = ScenarioBuilder::new(GridMap::open_grid(10, 10));
        b.agent_with_goal("a", p(5, 5), p(5, 5));
        let scenario = b.build().unwrap();

        let solution = HierarchicalCbsPlanner
            .solve(&scenario, &PlannerParams::default(), &Deadline::NONE)
            .unwrap()
            .unwrap();
        assert_eq!(solution.plan.plans[0].len(), 1);
    }
}
