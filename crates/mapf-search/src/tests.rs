//! Unit tests for the search engines.

#[cfg(test)]
mod helpers {
    use mapf_core::Position;
    use mapf_map::{GridMap, MapManager};

    pub fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    /// Legality closure for a lone agent on a map: moves need a permitted
    /// edge, waits only need the map (no other agents to collide with).
    pub fn map_legal<'m>(
        mgr: MapManager<'m>,
    ) -> impl FnMut(Position, Position, u32) -> bool + 'm {
        move |from, to, t| {
            if from == to {
                mgr.map().in_bounds(from) && !mgr.map().is_obstacle(from)
            } else {
                mgr.permitted(from.to(to), t)
            }
        }
    }

    /// Narrow corridor with a forced detour:
    ///
    /// ```text
    /// .....
    /// .@@@.
    /// .....
    /// ```
    ///
    /// (0,1) → (4,1) costs 6 instead of the Manhattan 4.
    pub fn detour_map() -> GridMap {
        GridMap::parse(
            ".....
             .@@@.
             .....",
        )
        .unwrap()
    }
}

#[cfg(test)]
mod timed {
    use std::time::Duration;

    use super::helpers::{detour_map, map_legal, p};
    use crate::{SearchOutcome, timed_astar};
    use mapf_core::{Deadline, MapfError};
    use mapf_map::{GridMap, MapManager};

    #[test]
    fn open_grid_diagonal_corner() {
        // 5×5 open grid, (0,0) → (4,4): 8 moves, 9 steps.
        let map = GridMap::open_grid(5, 5);
        let goal = p(4, 4);
        let outcome = timed_astar(
            p(0, 0).at(0),
            map_legal(MapManager::new(&map, 0)),
            |pos| pos.manhattan(goal),
            |node| node.pos == goal,
            64,
            &Deadline::NONE,
        )
        .unwrap();
        let plan = outcome.into_plan().expect("open grid must be solvable");
        assert_eq!(plan.len(), 9);
        assert_eq!(plan.first().unwrap(), p(0, 0).at(0));
        assert_eq!(plan.last().unwrap().pos, goal);
    }

    #[test]
    fn detour_around_wall() {
        let map = detour_map();
        let goal = p(4, 1);
        let outcome = timed_astar(
            p(0, 1).at(0),
            map_legal(MapManager::new(&map, 0)),
            |pos| pos.manhattan(goal),
            |node| node.pos == goal,
            64,
            &Deadline::NONE,
        )
        .unwrap();
        assert_eq!(outcome.into_plan().unwrap().len(), 7, "detour costs 6 moves");
    }

    #[test]
    fn waits_through_a_timed_block() {
        // A lone corridor cell blocked at exactly t = 1 forces one wait.
        let map = GridMap::open_grid(3, 1);
        let goal = p(2, 0);
        let mgr = MapManager::new(&map, 0);
        let outcome = timed_astar(
            p(0, 0).at(0),
            |from: mapf_core::Position, to: mapf_core::Position, t: u32| {
                if to == p(1, 0) && t + 1 == 1 {
                    return false;
                }
                if from == to {
                    return true;
                }
                mgr.permitted(from.to(to), t)
            },
            |pos| pos.manhattan(goal),
            |node| node.pos == goal,
            16,
            &Deadline::NONE,
        )
        .unwrap();
        let plan = outcome.into_plan().unwrap();
        assert_eq!(plan.len(), 4, "one wait inserted before entering (1,0)");
        assert_eq!(plan.position_at(1, false), Some(p(0, 0)));
    }

    #[test]
    fn zero_horizon_trivial_goal() {
        let map = GridMap::open_grid(2, 2);
        let outcome = timed_astar(
            p(0, 0).at(0),
            map_legal(MapManager::new(&map, 0)),
            |pos| pos.manhattan(p(0, 0)),
            |node| node.pos == p(0, 0),
            0,
            &Deadline::NONE,
        )
        .unwrap();
        assert_eq!(outcome.into_plan().unwrap().len(), 1);
    }

    #[test]
    fn horizon_exceeded_is_distinct_from_exhausted() {
        let map = GridMap::open_grid(5, 1);
        let goal = p(4, 0);
        let tight = timed_astar(
            p(0, 0).at(0),
            map_legal(MapManager::new(&map, 0)),
            |pos| pos.manhattan(goal),
            |node| node.pos == goal,
            2,
            &Deadline::NONE,
        )
        .unwrap();
        assert_eq!(tight, SearchOutcome::HorizonExceeded);

        // A true-distance heuristic reports the goal unreachable from the
        // start: every successor is pruned and the open set runs dry with
        // the horizon untouched.
        let split = mapf_map::GridMap::parse("..@..").unwrap();
        let blocked = timed_astar(
            p(0, 0).at(0),
            map_legal(MapManager::new(&split, 0)),
            |pos| if pos.x < 3 { u32::MAX } else { pos.manhattan(p(4, 0)) },
            |node| node.pos == p(4, 0),
            100,
            &Deadline::NONE,
        )
        .unwrap();
        assert_eq!(blocked, SearchOutcome::Exhausted);
    }

    #[test]
    fn expired_deadline_surfaces_timeout() {
        let map = GridMap::open_grid(4, 4);
        let deadline = Deadline::within(Duration::ZERO);
        let result = timed_astar(
            p(0, 0).at(0),
            map_legal(MapManager::new(&map, 0)),
            |pos| pos.manhattan(p(3, 3)),
            |node| node.pos == p(3, 3),
            64,
            &deadline,
        );
        assert_eq!(result.unwrap_err(), MapfError::Timeout);
    }

    #[test]
    fn deterministic_across_runs() {
        let map = detour_map();
        let goal = p(4, 1);
        let run = || {
            timed_astar(
                p(0, 1).at(0),
                map_legal(MapManager::new(&map, 0)),
                |pos| pos.manhattan(goal),
                |node| node.pos == goal,
                64,
                &Deadline::NONE,
            )
            .unwrap()
            .into_plan()
            .unwrap()
        };
        assert_eq!(run(), run());
    }
}

#[cfg(test)]
mod untimed {
    use super::helpers::{detour_map, p};
    use crate::grid_astar;
    use mapf_core::Deadline;
    use mapf_map::GridMap;

    #[test]
    fn shortest_cell_sequence() {
        let map = detour_map();
        let cells = grid_astar(
            p(0, 1),
            p(4, 1),
            |from, to| map.has_edge(from.to(to)),
            &Deadline::NONE,
        )
        .unwrap()
        .expect("detour map is connected");
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0], p(0, 1));
        assert_eq!(*cells.last().unwrap(), p(4, 1));
    }

    #[test]
    fn unreachable_returns_none() {
        let map = GridMap::parse("..@..").unwrap();
        let cells = grid_astar(
            p(0, 0),
            p(4, 0),
            |from, to| map.has_edge(from.to(to)),
            &Deadline::NONE,
        )
        .unwrap();
        assert!(cells.is_none());
    }

    #[test]
    fn trivial_when_start_is_goal() {
        let map = GridMap::open_grid(2, 2);
        let cells = grid_astar(
            p(1, 1),
            p(1, 1),
            |from, to| map.has_edge(from.to(to)),
            &Deadline::NONE,
        )
        .unwrap()
        .unwrap();
        assert_eq!(cells, vec![p(1, 1)]);
    }
}

#[cfg(test)]
mod alternating {
    use super::helpers::{map_legal, p};
    use crate::alternating_astar;
    use mapf_core::Deadline;
    use mapf_map::{GridMap, MapManager};

    #[test]
    fn rides_the_direction_wave() {
        // 10×10 alternating map, f = 2: (0,0) → (9,0) in 10 steps.
        let map = GridMap::open_grid(10, 10);
        let outcome = alternating_astar(
            p(0, 0).at(0),
            p(9, 0),
            map_legal(MapManager::new(&map, 2)),
            2,
            128,
            &Deadline::NONE,
        )
        .unwrap();
        assert_eq!(outcome.into_plan().unwrap().len(), 10);
    }

    #[test]
    fn zero_frequency_matches_static_search() {
        let map = GridMap::open_grid(10, 10);
        let outcome = alternating_astar(
            p(0, 0).at(0),
            p(9, 0),
            map_legal(MapManager::new(&map, 0)),
            0,
            128,
            &Deadline::NONE,
        )
        .unwrap();
        assert_eq!(outcome.into_plan().unwrap().len(), 10, "pure moves, no waits");
    }

    #[test]
    fn plan_respects_the_passage_predicate() {
        let map = GridMap::open_grid(6, 6);
        let mgr = MapManager::new(&map, 2);
        let outcome = alternating_astar(
            p(0, 0).at(0),
            p(0, 3),
            map_legal(mgr),
            2,
            128,
            &Deadline::NONE,
        )
        .unwrap();
        let plan = outcome.into_plan().expect("goal must be reachable");
        for pair in plan.steps().windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.pos != b.pos {
                assert!(
                    mgr.permitted(a.pos.to(b.pos), a.time),
                    "illegal move {} → {} at t = {}",
                    a.pos,
                    b.pos,
                    a.time
                );
            }
        }
        assert_eq!(plan.last().unwrap().pos, p(0, 3));
    }

    #[test]
    fn nonzero_start_time_folds_phase() {
        let map = GridMap::open_grid(10, 1);
        let run_at = |t0: u32| {
            alternating_astar(
                p(0, 0).at(t0),
                p(9, 0),
                map_legal(MapManager::new(&map, 2)),
                2,
                256,
                &Deadline::NONE,
            )
            .unwrap()
            .into_plan()
            .map(|plan| plan.len())
        };
        // Start times a full period apart behave identically.
        assert_eq!(run_at(0), run_at(4));
    }
}
