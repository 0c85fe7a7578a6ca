//! Decentralized traffic simulation.
//!
//! Every agent routes once with plain A*, forbidden to pass through any
//! other agent's goal cell.  Execution is greedy: agents move into free
//! cells until a scan makes no progress, then blocked agents walk their
//! "blocked-by" chain; a chain that returns to one of its own members is a
//! rotation — all members advance simultaneously, no cell ever becoming
//! free because each is reclaimed in the same instant.  Two-agent chains
//! are head-on swaps, not rotations, and are left waiting.

use rustc_hash::{FxHashMap, FxHashSet};

use mapf_core::{
    AgentId, CommonPlan, Deadline, MapfResult, Plan, PlannerParams, Position, Solution,
};
use mapf_map::Scenario;
use mapf_search::grid_astar;

pub struct TrafficSimulator;

impl TrafficSimulator {
    pub fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        let n = scenario.agent_count();
        let goals: Vec<Position> = scenario
            .agents
            .iter()
            .map(|a| scenario.goal_of(a.id).unwrap_or(a.start))
            .collect();
        let goal_cells: FxHashSet<Position> = goals.iter().copied().collect();

        // Route once per agent, other goals off-limits.
        let mut routes: Vec<Vec<Position>> = Vec::with_capacity(n);
        for agent in &scenario.agents {
            let own_goal = goals[agent.id.index()];
            let map = &scenario.map;
            let passable = |from: Position, to: Position| {
                map.has_edge(from.to(to)) && (to == own_goal || !goal_cells.contains(&to))
            };
            match grid_astar(agent.start, own_goal, passable, deadline)? {
                Some(cells) => routes.push(cells),
                None => return Ok(None),
            }
        }

        let mut progress: Vec<usize> = vec![0; n];
        let mut plans: Vec<Plan> =
            scenario.agents.iter().map(|a| Plan::new(a.start.at(0))).collect();
        let mut occupied: FxHashMap<Position, AgentId> =
            scenario.agents.iter().map(|a| (a.start, a.id)).collect();

        let at_goal = |progress: &[usize], i: usize| progress[i] + 1 >= routes[i].len();

        for _now in 0..params.time_horizon {
            if (0..n).all(|i| at_goal(&progress, i)) {
                break;
            }
            deadline.check()?;

            let mut moved = vec![false; n];

            // Greedy passes until a scan moves nobody.
            loop {
                let mut any = false;
                for i in 0..n {
                    if moved[i] || at_goal(&progress, i) {
                        continue;
                    }
                    let next = routes[i][progress[i] + 1];
                    if occupied.contains_key(&next) {
                        continue;
                    }
                    occupied.remove(&routes[i][progress[i]]);
                    occupied.insert(next, AgentId(i as u32));
                    progress[i] += 1;
                    moved[i] = true;
                    any = true;
                }
                if !any {
                    break;
                }
            }

            // Cycle resolution for the still-blocked agents.
            for i in 0..n {
                if moved[i] || at_goal(&progress, i) {
                    continue;
                }
                if let Some(cycle) = find_cycle(i, &routes, &progress, &occupied, &moved) {
                    rotate(&cycle, &routes, &mut progress, &mut occupied, &mut moved);
                }
            }

            // Record movements, and waits for agents still under way.
            for i in 0..n {
                if moved[i] || !at_goal(&progress, i) {
                    plans[i].push(routes[i][progress[i]]);
                }
            }
        }

        if (0..n).all(|i| at_goal(&progress, i)) {
            Ok(Some(Solution { plan: CommonPlan::new(plans), tasks: scenario.tasks.clone() }))
        } else {
            Ok(None)
        }
    }
}

/// Walk the blocked-by chain from `start`.  A chain that reaches a prior
/// member closes a rotation of length ≥ 3; reaching an agent that already
/// moved — or a two-agent swap — is not a cycle.
fn find_cycle(
    start: usize,
    routes: &[Vec<Position>],
    progress: &[usize],
    occupied: &FxHashMap<Position, AgentId>,
    moved: &[bool],
) -> Option<Vec<usize>> {
    let mut chain: Vec<usize> = vec![start];
    let mut members: FxHashSet<usize> = FxHashSet::default();
    members.insert(start);

    let mut cur = start;
    loop {
        if progress[cur] + 1 >= routes[cur].len() {
            return None; // blocked by a parked agent
        }
        let next_cell = routes[cur][progress[cur] + 1];
        let blocker = occupied.get(&next_cell)?.index();
        if moved[blocker] {
            return None;
        }
        if members.contains(&blocker) {
            let at = chain.iter().position(|&m| m == blocker).expect("member is in chain");
            let cycle = chain[at..].to_vec();
            // A two-member "cycle" is a swap along one edge, not a rotation.
            return (cycle.len() >= 3).then_some(cycle);
        }
        chain.push(blocker);
        members.insert(blocker);
        cur = blocker;
    }
}

/// Advance every member of `cycle` one step simultaneously.  The occupancy
/// map never loses a cell: each vacated cell is the next member's target.
fn rotate(
    cycle: &[usize],
    routes: &[Vec<Position>],
    progress: &mut [usize],
    occupied: &mut FxHashMap<Position, AgentId>,
    moved: &mut [bool],
) {
    for &member in cycle {
        let next = routes[member][progress[member] + 1];
        occupied.insert(next, AgentId(member as u32));
        progress[member] += 1;
        moved[member] = true;
    }
}
