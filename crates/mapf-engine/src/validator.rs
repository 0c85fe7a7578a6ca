//! Common-plan validation against a scenario.
//!
//! Every check failure names the offending agent and tick, so a planner
//! bug surfaces as a precise message rather than a boolean.

use rustc_hash::FxHashMap;

use mapf_core::{AgentId, CommonPlan, Plan, Position, TaskId};
use mapf_map::{MapManager, Scenario};
use thiserror::Error;

/// Classic validates against the static passage rule; Dynamic applies the
/// alternating rule with the given frequency.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValidationMode {
    Classic,
    Dynamic(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected {expected} plans, got {got}")]
    PlanCountMismatch { expected: usize, got: usize },

    #[error("agent {agent} has an empty plan")]
    EmptyPlan { agent: usize },

    #[error("agent {agent} starts at {got}, expected {expected} at tick 0")]
    WrongStart { agent: usize, expected: Position, got: Position },

    #[error("agent {agent} has time {got} at step {index}, expected {index}")]
    NonContiguousTime { agent: usize, index: usize, got: u32 },

    #[error("agent {agent} stands on obstacle {pos} at tick {tick}")]
    ObstacleHit { agent: usize, tick: u32, pos: Position },

    #[error("agent {agent} takes an impassable step {from} → {to} at tick {tick}")]
    IllegalMove { agent: usize, tick: u32, from: Position, to: Position },

    #[error("agent {agent} ends at {got}, expected goal {expected}")]
    GoalNotReached { agent: usize, expected: Position, got: Position },

    #[error("agents {first} and {second} share cell {pos} at tick {tick}")]
    VertexConflict { first: usize, second: usize, tick: u32, pos: Position },

    #[error("agents {first} and {second} swap between {from} and {to} at tick {tick}")]
    EdgeConflict { first: usize, second: usize, tick: u32, from: Position, to: Position },

    #[error("task {task} is not served by any plan")]
    TaskNotServed { task: TaskId },
}

pub struct Validator;

impl Validator {
    pub fn check(
        scenario: &Scenario,
        common: &CommonPlan,
        mode: ValidationMode,
    ) -> Result<(), ValidationError> {
        let frequency = match mode {
            ValidationMode::Classic => 0,
            ValidationMode::Dynamic(f) => f,
        };
        let manager = scenario.manager(frequency);

        if common.plans.len() != scenario.agent_count() {
            return Err(ValidationError::PlanCountMismatch {
                expected: scenario.agent_count(),
                got: common.plans.len(),
            });
        }

        for (agent, plan) in common.plans.iter().enumerate() {
            check_single(scenario, agent, plan, manager)?;
        }
        check_cross(common)?;

        if scenario.is_pickup_delivery() {
            check_tasks_served(scenario, common)?;
        } else {
            check_goals(scenario, common)?;
        }
        Ok(())
    }
}

/// Per-plan checks: start, contiguity, obstacles, passage.
fn check_single(
    scenario: &Scenario,
    agent: usize,
    plan: &Plan,
    manager: MapManager<'_>,
) -> Result<(), ValidationError> {
    let steps = plan.steps();
    let Some(first) = steps.first() else {
        return Err(ValidationError::EmptyPlan { agent });
    };

    let start = scenario.agents[agent].start;
    if first.pos != start || first.time != 0 {
        return Err(ValidationError::WrongStart { agent, expected: start, got: first.pos });
    }

    for (index, step) in steps.iter().enumerate() {
        if step.time != index as u32 {
            return Err(ValidationError::NonContiguousTime { agent, index, got: step.time });
        }
        if scenario.map.is_obstacle(step.pos) {
            return Err(ValidationError::ObstacleHit { agent, tick: step.time, pos: step.pos });
        }
    }

    for pair in steps.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from.pos != to.pos && !manager.passage_permitted(from.pos.to(to.pos).at(from.time)) {
            return Err(ValidationError::IllegalMove {
                agent,
                tick: from.time,
                from: from.pos,
                to: to.pos,
            });
        }
    }
    Ok(())
}

/// Cross-plan checks under the resting assumption: vertex and swap conflicts.
fn check_cross(common: &CommonPlan) -> Result<(), ValidationError> {
    let makespan = common.makespan() as u32;
    for t in 0..makespan {
        let mut seen: FxHashMap<Position, usize> = FxHashMap::default();
        for agent in 0..common.plans.len() {
            let Some(pos) = common.position_at(agent, t) else { continue };
            if let Some(&other) = seen.get(&pos) {
                return Err(ValidationError::VertexConflict {
                    first: other,
                    second: agent,
                    tick: t,
                    pos,
                });
            }
            seen.insert(pos, agent);
        }

        for first in 0..common.plans.len() {
            for second in (first + 1)..common.plans.len() {
                let (Some(a0), Some(b0)) =
                    (common.position_at(first, t), common.position_at(second, t))
                else {
                    continue;
                };
                let (Some(a1), Some(b1)) =
                    (common.position_at(first, t + 1), common.position_at(second, t + 1))
                else {
                    continue;
                };
                if a0 == b1 && b0 == a1 && a0 != a1 {
                    return Err(ValidationError::EdgeConflict {
                        first,
                        second,
                        tick: t,
                        from: a0,
                        to: a1,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Classic MAPF: each plan must end on its agent's goal.
fn check_goals(scenario: &Scenario, common: &CommonPlan) -> Result<(), ValidationError> {
    for (agent, plan) in common.plans.iter().enumerate() {
        let goal = scenario
            .goal_of(AgentId(agent as u32))
            .unwrap_or(scenario.agents[agent].start);
        let last = plan.last().expect("checked non-empty").pos;
        if last != goal {
            return Err(ValidationError::GoalNotReached { agent, expected: goal, got: last });
        }
    }
    Ok(())
}

/// MAPD: every task's target sequence appears, in order, in some plan.
fn check_tasks_served(scenario: &Scenario, common: &CommonPlan) -> Result<(), ValidationError> {
    for task in &scenario.tasks {
        let served = common.plans.iter().any(|plan| {
            let mut want = task.targets.iter();
            let mut next = want.next();
            for step in plan.steps() {
                if Some(&step.pos) == next {
                    next = want.next();
                }
            }
            next.is_none()
        });
        if !served {
            return Err(ValidationError::TaskNotServed { task: task.id });
        }
    }
    Ok(())
}
