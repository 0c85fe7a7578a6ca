//! Token-Passing: online tick-driven MAPD scheduling.
//!
//! The token is the run's single source of truth: it owns the reservation
//! table, every agent's plan, the free-agent set, and the task queues.
//! Within a tick, each agent's plan extensions are committed to the table
//! before the next agent plans, so the tick loop is an ordinary sequential
//! fold over the free set.
//!
//! # Resting policy
//!
//! A free agent that cannot win a task first checks whether its current
//! cell is a legal resting place — not the delivery cell of any available
//! task, and free of later reservations.  Only a *blocking* agent moves: it
//! plans to the nearest reachable endpoint, falling back to a one-tick wait
//! in place, and the scenario fails if even the wait is denied.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use rustc_hash::{FxHashMap, FxHashSet};

use mapf_core::{
    AgentId, CommonPlan, Deadline, MapfResult, Plan, PlannerParams, Position, Solution, Task,
    TaskId, TimedPosition,
};
use mapf_map::{MapManager, Scenario, TrueDistance};
use mapf_reserve::ReservationTable;
use mapf_search::timed_astar;

pub struct TokenPassingPlanner;

impl TokenPassingPlanner {
    pub fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        let mut token = Token::new(scenario, params, deadline)?;
        let task_horizon = scenario.tasks.iter().map(|t| t.available_at).max();

        let mut now: u32 = 0;
        loop {
            deadline.check()?;
            token.release_available(now);

            // Task assignment over a snapshot of the free set.
            let free: Vec<AgentId> = token.free.iter().copied().collect();
            for agent in free {
                if token.free.contains(&agent) {
                    token.plan_for_task(agent, now, params, deadline)?;
                }
            }

            // Resting decision for agents that are free *and* idle.
            let free: Vec<AgentId> = token.free.iter().copied().collect();
            for agent in free {
                if token.plans[agent.index()].end_time() > now {
                    continue; // still walking to an endpoint
                }
                if !token.settle_idle(agent, now, params, deadline)? {
                    return Ok(None);
                }
            }

            let all_served =
                token.completed == token.tasks.len() && task_horizon.is_none_or(|h| now > h);
            if all_served {
                break;
            }
            if now >= params.time_horizon {
                return Ok(None);
            }
            now += 1;
            token.step(now)?;
        }

        Ok(Some(Solution { plan: CommonPlan::new(token.plans), tasks: token.tasks }))
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

/// All mutable state of one Token-Passing run.
struct Token<'m> {
    manager: MapManager<'m>,
    dist: TrueDistance,
    table: ReservationTable,

    plans: Vec<Plan>,
    positions: Vec<Position>,
    claimed_task: Vec<Option<TaskId>>,
    free: BTreeSet<AgentId>,

    tasks: Vec<Task>,
    /// Tasks not yet released, keyed by availability tick.
    pending: BTreeMap<u32, Vec<TaskId>>,
    available: BTreeSet<TaskId>,
    claimed: FxHashSet<TaskId>,
    completed: usize,
    /// Delivery cells of currently available tasks, with multiplicity.
    available_deliveries: FxHashMap<Position, u32>,

    endpoints: Vec<Position>,
}

impl<'m> Token<'m> {
    fn new(
        scenario: &'m Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Self> {
        // Endpoints: task cells, agent starts, and parking cells.
        let mut endpoint_set: BTreeSet<Position> = BTreeSet::new();
        for task in &scenario.tasks {
            endpoint_set.extend(task.targets.iter().copied());
        }
        endpoint_set.extend(scenario.agents.iter().map(|a| a.start));
        endpoint_set.extend(scenario.map.parking_cells());
        let endpoints: Vec<Position> = endpoint_set.into_iter().collect();

        let dist = TrueDistance::build(&scenario.map, endpoints.iter().copied(), deadline)?;

        let mut table = ReservationTable::new();
        let mut plans = Vec::with_capacity(scenario.agent_count());
        let mut positions = Vec::with_capacity(scenario.agent_count());
        for agent in &scenario.agents {
            table.reserve_cell(agent.id, agent.start, 0, true);
            plans.push(Plan::new(agent.start.at(0)));
            positions.push(agent.start);
        }

        let mut pending: BTreeMap<u32, Vec<TaskId>> = BTreeMap::new();
        for task in &scenario.tasks {
            pending.entry(task.available_at).or_default().push(task.id);
        }

        Ok(Self {
            manager: scenario.manager(params.direction_change_frequency),
            dist,
            table,
            plans,
            positions,
            claimed_task: vec![None; scenario.agent_count()],
            free: scenario.agents.iter().map(|a| a.id).collect(),
            tasks: scenario.tasks.clone(),
            pending,
            available: BTreeSet::new(),
            claimed: FxHashSet::default(),
            completed: 0,
            available_deliveries: FxHashMap::default(),
            endpoints,
        })
    }

    /// Move tasks whose availability time has arrived into the available set.
    fn release_available(&mut self, now: u32) {
        let Some(ids) = self.pending.remove(&now) else { return };
        for tid in ids {
            let delivery = self.tasks[tid.index()].delivery();
            *self.available_deliveries.entry(delivery).or_insert(0) += 1;
            self.available.insert(tid);
        }
    }

    // ── Task assignment ───────────────────────────────────────────────────

    /// Try to win a task for `agent`: nearest available pickup first, a
    /// timed search per task leg, commit on full success only.
    fn plan_for_task(
        &mut self,
        agent: AgentId,
        now: u32,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<()> {
        let pos = self.positions[agent.index()];

        // Cells some other agent's plan currently ends on are poisoned: a
        // task into one of them would park us under a resting agent.
        let mut terminals: FxHashSet<Position> = FxHashSet::default();
        for other in &self.plans {
            terminals.extend(other.last().map(|s| s.pos));
        }
        terminals.remove(&self.plans[agent.index()].last().expect("plans are never empty").pos);

        let mut candidates: BinaryHeap<Reverse<(u32, TaskId)>> = BinaryHeap::new();
        for &tid in &self.available {
            let task = &self.tasks[tid.index()];
            if terminals.contains(&task.pickup()) || terminals.contains(&task.delivery()) {
                continue;
            }
            if let Some(d) = self.dist.distance(pos, task.pickup())? {
                candidates.push(Reverse((d, tid)));
            }
        }
        if candidates.is_empty() {
            return Ok(());
        }

        let snapshot = self.table.reservations_of(agent);
        self.table.cancel_agent(agent);

        while let Some(Reverse((_, tid))) = candidates.pop() {
            if let Some(legs) = self.search_task_legs(pos.at(now), tid, params, deadline)? {
                // Commit: reservations first, then the plan splice.  A plan
                // that ended on an earlier resting tick is padded with the
                // waits the agent actually spent there.
                let mut skip_first = false;
                let plan = &mut self.plans[agent.index()];
                plan.cut_after(now);
                plan.fill_up_to(now);
                let last = legs.len() - 1;
                for (i, leg) in legs.into_iter().enumerate() {
                    self.table.reserve_path(agent, leg.steps(), skip_first, i == last);
                    plan.append_plan(leg);
                    skip_first = true;
                }
                self.claim_task(agent, tid);
                return Ok(());
            }
        }

        // Every candidate failed: this attempt leaves no trace.
        self.table.restore(agent, snapshot);
        Ok(())
    }

    /// One timed search per task target; `None` as soon as any leg fails.
    fn search_task_legs(
        &self,
        seed: TimedPosition,
        tid: TaskId,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Vec<Plan>>> {
        let targets = self.tasks[tid.index()].targets.clone();
        let mut legs = Vec::with_capacity(targets.len());
        let mut seed = seed;
        for (k, &target) in targets.iter().enumerate() {
            let rest_at_end = k + 1 == targets.len();
            match self.search_leg(seed, target, rest_at_end, params, deadline)? {
                Some(leg) => {
                    seed = leg.last().expect("a found leg is never empty");
                    legs.push(leg);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(legs))
    }

    /// A single timed A* leg against the table, using the true-distance
    /// heuristic.  With `rest_at_end` the target must be free forever at
    /// arrival.
    fn search_leg(
        &self,
        seed: TimedPosition,
        target: Position,
        rest_at_end: bool,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Plan>> {
        let table = &self.table;
        let manager = self.manager;
        let heuristic = self.dist.heuristic_to(target)?;
        let legal = |from: Position, to: Position, t: u32| {
            if !table.is_cell_free(to, t + 1) {
                return false;
            }
            from == to || (table.is_edge_free(from, to, t) && manager.permitted(from.to(to), t))
        };
        let accept = |node: TimedPosition| {
            node.pos == target && (!rest_at_end || table.is_free_forever(target, node.time))
        };
        let outcome =
            timed_astar(seed, legal, heuristic, accept, params.time_horizon, deadline)?;
        Ok(outcome.into_plan())
    }

    fn claim_task(&mut self, agent: AgentId, tid: TaskId) {
        self.available.remove(&tid);
        self.claimed.insert(tid);
        self.claimed_task[agent.index()] = Some(tid);
        self.free.remove(&agent);

        let delivery = self.tasks[tid.index()].delivery();
        if let Some(count) = self.available_deliveries.get_mut(&delivery) {
            *count -= 1;
            if *count == 0 {
                self.available_deliveries.remove(&delivery);
            }
        }
    }

    // ── Resting ───────────────────────────────────────────────────────────

    /// Decide what a free, idle agent does this tick.  Returns `false` when
    /// the agent can neither rest, nor reach an endpoint, nor wait — which
    /// fails the scenario.
    fn settle_idle(
        &mut self,
        agent: AgentId,
        now: u32,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<bool> {
        let pos = self.positions[agent.index()];
        self.table.cancel_agent(agent);

        let blocking = self.available_deliveries.contains_key(&pos)
            || !self.table.resting_allowed(pos, now);
        if !blocking {
            // The current cell is a legal resting place; anchor it so no
            // other agent plans to rest or pass here later.
            self.table.reserve_cell(agent, pos, now, true);
            return Ok(true);
        }

        if self.plan_for_endpoint(agent, now, params, deadline)? {
            return Ok(true);
        }

        // Last resort: wait one tick in place and retry next tick.
        if self.table.is_cell_free(pos, now) && self.table.is_cell_free(pos, now + 1) {
            self.table.reserve_cell(agent, pos, now, false);
            self.table.reserve_cell(agent, pos, now + 1, false);
            let plan = &mut self.plans[agent.index()];
            plan.fill_up_to(now);
            plan.push(pos);
            return Ok(true);
        }
        Ok(false)
    }

    /// Move a blocking agent to the nearest endpoint that is no available
    /// task's delivery cell and admits resting.
    fn plan_for_endpoint(
        &mut self,
        agent: AgentId,
        now: u32,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<bool> {
        let pos = self.positions[agent.index()];

        let mut candidates: Vec<(u32, Position)> = Vec::new();
        for &endpoint in &self.endpoints {
            if self.available_deliveries.contains_key(&endpoint)
                || !self.table.resting_allowed(endpoint, now)
            {
                continue;
            }
            if let Some(d) = self.dist.distance(pos, endpoint)? {
                candidates.push((d, endpoint));
            }
        }
        candidates.sort_unstable();

        for (_, endpoint) in candidates {
            if let Some(leg) = self.search_leg(pos.at(now), endpoint, true, params, deadline)? {
                self.table.reserve_path(agent, leg.steps(), false, true);
                let plan = &mut self.plans[agent.index()];
                plan.cut_after(now);
                plan.fill_up_to(now);
                plan.append_plan(leg);
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ── Advancing ─────────────────────────────────────────────────────────

    /// Advance every agent one tick along its plan, stamping pickup and
    /// delivery events.
    fn step(&mut self, now: u32) -> MapfResult<()> {
        for index in 0..self.plans.len() {
            let pos = self.plans[index]
                .position_at(now, true)
                .expect("plans start at tick 0");
            self.positions[index] = pos;

            let Some(tid) = self.claimed_task[index] else { continue };
            let plan_ended = self.plans[index].end_time() <= now;
            let task = &mut self.tasks[tid.index()];
            if task.started_at.is_none() && pos == task.pickup() {
                task.mark_started(now)?;
            }
            if plan_ended && pos == task.delivery() {
                task.mark_completed(now)?;
                self.claimed.remove(&tid);
                self.claimed_task[index] = None;
                self.free.insert(AgentId(index as u32));
                self.completed += 1;
            }
        }
        Ok(())
    }
}
