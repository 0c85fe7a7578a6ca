//! Per-region conflict-based search.
//!
//! A constraint-tree node carries its constraint set and a full solution —
//! one plan per traversal in the region, cloned from its parent with
//! exactly one traversal replanned.  Nodes are expanded lowest
//! sum-of-costs first; equal costs pop in insertion order, so the tree
//! shape is deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use mapf_core::{Deadline, MapfResult, Plan, PlannerParams, Position, TimedPosition, TraversalId};
use mapf_reserve::{ConstraintSet, EdgeConstraint, VertexConstraint};
use mapf_search::timed_astar;

use crate::region::Region;
use crate::traversal::{Traversal, TraversalArena};

/// First conflict found while validating a node's solution.
enum Conflict {
    Vertex { first: usize, second: usize, at: TimedPosition },
    Edge { first: usize, second: usize, from: Position, to: Position, time: u32 },
}

struct CbsNode {
    constraints: ConstraintSet,
    /// One plan per region traversal, parallel to the `traversals` slice.
    solution: Vec<Plan>,
}

impl CbsNode {
    fn cost(&self) -> u32 {
        self.solution.iter().map(|p| p.len() as u32).sum()
    }
}

/// Resolve all conflicts between `traversals` inside `region`.
///
/// Returns the repaired `(traversal, plan)` pairs, or `None` when the
/// constraint tree is exhausted.
pub fn resolve_region(
    region: &Region,
    traversals: &[TraversalId],
    arena: &TraversalArena,
    params: &PlannerParams,
    deadline: &Deadline,
) -> MapfResult<Option<Vec<(TraversalId, Plan)>>> {
    let root = CbsNode {
        constraints: ConstraintSet::new(),
        solution: traversals.iter().map(|&id| arena.get(id).plan.clone()).collect(),
    };

    // Min-heap on (cost, insertion sequence); node payloads live beside it.
    let mut nodes: FxHashMap<u64, CbsNode> = FxHashMap::default();
    let mut queue: BinaryHeap<Reverse<(u32, u64)>> = BinaryHeap::new();
    let mut seq: u64 = 0;
    queue.push(Reverse((root.cost(), seq)));
    nodes.insert(seq, root);

    while let Some(Reverse((_, id))) = queue.pop() {
        deadline.check()?;
        let node = nodes.remove(&id).expect("queued nodes are stored");

        let Some(conflict) = first_conflict(&node.solution, traversals, arena) else {
            let pairs = traversals.iter().copied().zip(node.solution).collect();
            return Ok(Some(pairs));
        };

        for (idx, constraint) in branch(&conflict, traversals) {
            let mut constraints = node.constraints.clone();
            match constraint {
                Branch::Vertex(c) => constraints.insert_vertex(c),
                Branch::Edge(c) => constraints.insert_edge(c),
            }

            let traversal = arena.get(traversals[idx]);
            let replanned = replan(traversal, region, &constraints, params, deadline)?;
            let Some(plan) = replanned else { continue };

            let mut solution = node.solution.clone();
            solution[idx] = plan;
            let child = CbsNode { constraints, solution };
            seq += 1;
            queue.push(Reverse((child.cost(), seq)));
            nodes.insert(seq, child);
        }
    }
    Ok(None)
}

enum Branch {
    Vertex(VertexConstraint),
    Edge(EdgeConstraint),
}

/// The two children of a conflict: one constraint for each traversal.
fn branch(conflict: &Conflict, traversals: &[TraversalId]) -> Vec<(usize, Branch)> {
    match *conflict {
        Conflict::Vertex { first, second, at } => vec![
            (first, Branch::Vertex(VertexConstraint { traversal: traversals[first], at })),
            (second, Branch::Vertex(VertexConstraint { traversal: traversals[second], at })),
        ],
        Conflict::Edge { first, second, from, to, time } => vec![
            (
                first,
                Branch::Edge(EdgeConstraint {
                    traversal: traversals[first],
                    at: from.to(to).at(time),
                }),
            ),
            (
                second,
                Branch::Edge(EdgeConstraint {
                    traversal: traversals[second],
                    at: to.to(from).at(time),
                }),
            ),
        ],
    }
}

/// Scan the solution tick by tick for the first vertex or edge conflict.
///
/// A goal-region traversal rests on its target past the end of its slice;
/// any other traversal simply does not appear outside it.
fn first_conflict(
    solution: &[Plan],
    traversals: &[TraversalId],
    arena: &TraversalArena,
) -> Option<Conflict> {
    let start = solution.iter().map(Plan::start_time).min()?;
    let end = solution.iter().map(Plan::end_time).max()?;

    let position = |idx: usize, t: u32| -> Option<Position> {
        solution[idx].position_at(t, arena.get(traversals[idx]).goal_region)
    };

    for t in start..=end {
        for i in 0..solution.len() {
            for j in (i + 1)..solution.len() {
                let (a0, b0) = (position(i, t), position(j, t));
                if let (Some(a0), Some(b0)) = (a0, b0) {
                    if a0 == b0 {
                        return Some(Conflict::Vertex { first: i, second: j, at: a0.at(t) });
                    }
                    if let (Some(a1), Some(b1)) = (position(i, t + 1), position(j, t + 1)) {
                        if a0 == b1 && b0 == a1 && a0 != a1 {
                            return Some(Conflict::Edge {
                                first: i,
                                second: j,
                                from: a0,
                                to: a1,
                                time: t,
                            });
                        }
                    }
                }
            }
        }
    }
    None
}

/// Re-run the low-level search for one traversal under a constraint set.
fn replan(
    traversal: &Traversal,
    region: &Region,
    constraints: &ConstraintSet,
    params: &PlannerParams,
    deadline: &Deadline,
) -> MapfResult<Option<Plan>> {
    let id = traversal.id;
    let target = traversal.target;
    let goal_region = traversal.goal_region;

    let legal = |from: Position, to: Position, t: u32| {
        if constraints.forbids_cell(id, to.at(t + 1)) {
            return false;
        }
        if from == to {
            return true;
        }
        region.has_edge(from.to(to)) && !constraints.forbids_edge(id, from.to(to).at(t))
    };
    let accept = |node: TimedPosition| {
        node.pos == target
            && (!goal_region || !constraints.forbids_cell_after(id, target, node.time))
    };

    let outcome = timed_astar(
        traversal.start.at(traversal.start_time),
        legal,
        |pos| pos.manhattan(target),
        accept,
        params.time_horizon,
        deadline,
    )?;
    Ok(outcome.into_plan())
}
