//! Per-agent timed plans and the scenario-wide common plan.
//!
//! # Invariants
//!
//! A [`Plan`] is a sequence of [`TimedPosition`]s whose times are contiguous
//! and ascending; the first entry carries the plan's construction start time.
//! Position lookup by tick is O(1) (`time - start_time` indexes the backing
//! vector).  All mutating operations preserve contiguity; violations are
//! programmer errors and are caught by debug assertions.

use crate::{Position, TimedPosition};

// ── Plan ─────────────────────────────────────────────────────────────────────

/// One agent's trajectory: a contiguous sequence of timed positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    steps: Vec<TimedPosition>,
}

impl Plan {
    /// A plan with a single entry (the agent standing at `start`).
    pub fn new(start: TimedPosition) -> Self {
        Self { steps: vec![start] }
    }

    /// Build from a pre-assembled step sequence.
    ///
    /// Debug-asserts time contiguity; release builds trust the caller.
    pub fn from_steps(steps: Vec<TimedPosition>) -> Self {
        debug_assert!(
            steps.windows(2).all(|w| w[1].time == w[0].time + 1),
            "plan times must be contiguous ascending"
        );
        Self { steps }
    }

    pub fn steps(&self) -> &[TimedPosition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<TimedPosition> {
        self.steps.first().copied()
    }

    pub fn last(&self) -> Option<TimedPosition> {
        self.steps.last().copied()
    }

    /// Time of the first entry.  Panics on an empty plan.
    pub fn start_time(&self) -> u32 {
        self.steps[0].time
    }

    /// Time of the last entry.  Panics on an empty plan.
    pub fn end_time(&self) -> u32 {
        self.steps[self.steps.len() - 1].time
    }

    /// Position at tick `t`.
    ///
    /// Outside the plan's range the result is `None`, except past the end
    /// with `resting = true`, where the agent is assumed to remain at its
    /// last position forever.
    pub fn position_at(&self, t: u32, resting: bool) -> Option<Position> {
        let first = self.steps.first()?;
        if t < first.time {
            return None;
        }
        match self.steps.get((t - first.time) as usize) {
            Some(step) => Some(step.pos),
            None if resting => self.last().map(|s| s.pos),
            None => None,
        }
    }

    /// Append `pos` one tick after the current end.  Panics on an empty plan.
    pub fn push(&mut self, pos: Position) {
        let t = self.end_time() + 1;
        self.steps.push(pos.at(t));
    }

    /// Append a pre-stamped step, which must be contiguous with the end.
    pub fn push_timed(&mut self, step: TimedPosition) {
        debug_assert!(
            self.steps.is_empty() || step.time == self.end_time() + 1,
            "push_timed would break contiguity"
        );
        self.steps.push(step);
    }

    /// Append another plan.
    ///
    /// If `other` starts with exactly the step this plan ends with (the
    /// common case when concatenating search legs that share a junction),
    /// the duplicate is dropped.  Otherwise `other` must start one tick
    /// after this plan ends.
    pub fn append_plan(&mut self, other: Plan) {
        let mut rest = other.steps.into_iter();
        if let (Some(last), Some(&first)) = (self.last(), rest.as_slice().first()) {
            if first == last {
                rest.next();
            } else {
                debug_assert!(first.time == last.time + 1, "append_plan would break contiguity");
            }
        }
        self.steps.extend(rest);
    }

    /// Drop every step strictly after tick `t`.
    pub fn cut_after(&mut self, t: u32) {
        if let Some(first) = self.steps.first() {
            let keep = (t + 1).saturating_sub(first.time) as usize;
            self.steps.truncate(keep);
        }
    }

    /// Pad with the last known position until the plan ends at tick `t`.
    pub fn fill_up_to(&mut self, t: u32) {
        let Some(last) = self.last() else { return };
        for time in (last.time + 1)..=t {
            self.steps.push(last.pos.at(time));
        }
    }

    /// Delay the suffix starting at `index` by `delta` ticks, waiting at the
    /// preceding position meanwhile.  `index` must be ≥ 1.
    pub fn delay_from(&mut self, index: usize, delta: u32) {
        debug_assert!(index >= 1 && index <= self.steps.len());
        let hold = self.steps[index - 1].pos;
        let hold_from = self.steps[index - 1].time + 1;
        for step in &mut self.steps[index..] {
            step.time += delta;
        }
        let waits = (0..delta).map(|k| hold.at(hold_from + k));
        self.steps.splice(index..index, waits);
    }

    /// Shift every time stamp by `delta` (used when a preceding plan slice
    /// changes length).  The shifted start must not become negative.
    pub fn shift_times(&mut self, delta: i32) {
        for step in &mut self.steps {
            step.time = step.time.checked_add_signed(delta).expect("plan shifted before tick 0");
        }
    }
}

// ── CommonPlan ───────────────────────────────────────────────────────────────

/// One plan per agent, in agent-index order.  `Clone` is a deep copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommonPlan {
    pub plans: Vec<Plan>,
}

impl CommonPlan {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    /// Length of the longest plan, in steps.
    pub fn makespan(&self) -> usize {
        self.plans.iter().map(Plan::len).max().unwrap_or(0)
    }

    /// Sum of all plan lengths (sum of costs).
    pub fn flowtime(&self) -> usize {
        self.plans.iter().map(Plan::len).sum()
    }

    /// Position of agent `index` at tick `t` under the resting assumption.
    pub fn position_at(&self, index: usize, t: u32) -> Option<Position> {
        self.plans.get(index)?.position_at(t, true)
    }
}
