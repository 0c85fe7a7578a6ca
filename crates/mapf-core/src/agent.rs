//! Scenario-side agent and task records.
//!
//! These are the *immutable* inputs a planner consumes.  Mutable per-run
//! state (an agent's current cell, the task it is executing) belongs to the
//! planner that owns the run — e.g. the Token-Passing planner's token — so
//! scenarios can be shared between repeated runs without copying.

use crate::{AgentId, MapfError, MapfResult, Position, TaskId};

// ── Agent ────────────────────────────────────────────────────────────────────

/// One agent: a stable id, a display name, a start cell, and an optional
/// pre-assigned task (classic MAPF).  MAPD agents start task-less and pick
/// tasks up from the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub start: Position,
    pub task: Option<TaskId>,
}

// ── Task ─────────────────────────────────────────────────────────────────────

/// An ordered sequence of target cells with an availability time.
///
/// One target is a classic MAPF goal; two targets are a pickup/delivery
/// pair.  `started_at` / `completed_at` are stamped by the Token-Passing
/// planner; the invariant `completed ≥ started ≥ available` holds once set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub id: TaskId,
    pub targets: Vec<Position>,
    pub available_at: u32,
    pub started_at: Option<u32>,
    pub completed_at: Option<u32>,
}

impl Task {
    pub fn new(id: TaskId, targets: Vec<Position>, available_at: u32) -> Self {
        Self { id, targets, available_at, started_at: None, completed_at: None }
    }

    /// First target (the pickup cell for MAPD tasks).
    pub fn pickup(&self) -> Position {
        self.targets[0]
    }

    /// Last target (the delivery cell for MAPD tasks, the goal otherwise).
    pub fn delivery(&self) -> Position {
        self.targets[self.targets.len() - 1]
    }

    /// `true` for pickup/delivery tasks.
    pub fn is_pickup_delivery(&self) -> bool {
        self.targets.len() >= 2
    }

    /// Stamp the start time, checking the availability ordering.
    pub fn mark_started(&mut self, t: u32) -> MapfResult<()> {
        if t < self.available_at {
            return Err(MapfError::Scenario(format!(
                "task {} started at {t} before availability {}",
                self.id, self.available_at
            )));
        }
        self.started_at = Some(t);
        Ok(())
    }

    /// Stamp the completion time, checking the start ordering.
    pub fn mark_completed(&mut self, t: u32) -> MapfResult<()> {
        match self.started_at {
            Some(s) if t >= s => {
                self.completed_at = Some(t);
                Ok(())
            }
            _ => Err(MapfError::Scenario(format!(
                "task {} completed at {t} without a valid start",
                self.id
            ))),
        }
    }

    /// Completion minus availability, once both are known.
    pub fn service_time(&self) -> Option<u32> {
        self.completed_at.map(|c| c - self.available_at)
    }
}

// ── Solution ─────────────────────────────────────────────────────────────────

/// What a successful planner run returns: the common plan plus the task
/// records.  Token-Passing fills in the task timestamps; planners that do
/// not execute tasks return the scenario's records unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    pub plan: crate::CommonPlan,
    pub tasks: Vec<Task>,
}
