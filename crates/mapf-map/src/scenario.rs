//! Scenario: the immutable input of every planner run.

use rustc_hash::FxHashSet;

use mapf_core::{Agent, AgentId, MapfError, MapfResult, Position, Task, TaskId};

use crate::{GridMap, MapManager};

/// A map, the agents on it, and the task set.
///
/// Planners never mutate a scenario; Token-Passing copies the task records
/// into its token before stamping timestamps.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub map: GridMap,
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
}

impl Scenario {
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }

    /// `true` when any task is a pickup/delivery pair (MAPD mode).
    pub fn is_pickup_delivery(&self) -> bool {
        self.tasks.iter().any(Task::is_pickup_delivery)
    }

    /// Borrowing passage view with the given direction-change frequency.
    pub fn manager(&self, frequency: u32) -> MapManager<'_> {
        MapManager::new(&self.map, frequency)
    }

    /// The final goal of an agent's pre-assigned task, if it has one.
    pub fn goal_of(&self, agent: AgentId) -> Option<Position> {
        let task = self.agents[agent.index()].task?;
        Some(self.task(task).delivery())
    }
}

// ── ScenarioBuilder ──────────────────────────────────────────────────────────

/// Assigns sequential ids and validates cells once in [`build`](Self::build).
pub struct ScenarioBuilder {
    map: GridMap,
    agents: Vec<Agent>,
    tasks: Vec<Task>,
}

impl ScenarioBuilder {
    pub fn new(map: GridMap) -> Self {
        Self { map, agents: Vec::new(), tasks: Vec::new() }
    }

    /// Add a task-less agent (MAPD worker).
    pub fn agent(&mut self, name: &str, start: Position) -> AgentId {
        let id = AgentId(self.agents.len() as u32);
        self.agents.push(Agent { id, name: name.to_owned(), start, task: None });
        id
    }

    /// Add an agent with a single-goal task available at tick 0 (classic MAPF).
    pub fn agent_with_goal(&mut self, name: &str, start: Position, goal: Position) -> AgentId {
        let task = self.task(vec![goal], 0);
        let id = AgentId(self.agents.len() as u32);
        self.agents.push(Agent { id, name: name.to_owned(), start, task: Some(task) });
        id
    }

    /// Add a free-floating task (picked up by Token-Passing).
    pub fn task(&mut self, targets: Vec<Position>, available_at: u32) -> TaskId {
        let id = TaskId(self.tasks.len() as u32);
        self.tasks.push(Task::new(id, targets, available_at));
        id
    }

    pub fn build(self) -> MapfResult<Scenario> {
        let mut seen_starts = FxHashSet::default();
        for agent in &self.agents {
            self.check_cell(agent.start, "agent start")?;
            if !seen_starts.insert(agent.start) {
                return Err(MapfError::Scenario(format!(
                    "two agents share start cell {}",
                    agent.start
                )));
            }
        }
        for task in &self.tasks {
            if task.targets.is_empty() {
                return Err(MapfError::Scenario(format!("task {} has no targets", task.id)));
            }
            for &target in &task.targets {
                self.check_cell(target, "task target")?;
            }
        }
        Ok(Scenario { map: self.map, agents: self.agents, tasks: self.tasks })
    }

    fn check_cell(&self, pos: Position, what: &str) -> MapfResult<()> {
        if !self.map.in_bounds(pos) {
            return Err(MapfError::Scenario(format!("{what} {pos} out of bounds")));
        }
        if self.map.is_obstacle(pos) {
            return Err(MapfError::Scenario(format!("{what} {pos} is an obstacle")));
        }
        Ok(())
    }
}
