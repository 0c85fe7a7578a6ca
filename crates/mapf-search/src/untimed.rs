//! Plain 4-connected grid A* with Manhattan heuristic.
//!
//! Used wherever a single agent plans in isolation: runtime-replanner seed
//! plans, hierarchical high-level routes, and traffic-simulator routes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use mapf_core::{Deadline, MapfResult, Position};

/// Heap key: f-score, then g, then `(x, y)` for deterministic tie-breaks.
type HeapKey = (u32, u32, i32, i32);

/// Shortest cell sequence from `start` to `goal`, inclusive of both, or
/// `None` if unreachable.  `passable(from, to)` gates every step.
pub fn grid_astar<P>(
    start: Position,
    goal: Position,
    mut passable: P,
    deadline: &Deadline,
) -> MapfResult<Option<Vec<Position>>>
where
    P: FnMut(Position, Position) -> bool,
{
    let mut open: BinaryHeap<Reverse<HeapKey>> = BinaryHeap::new();
    let mut g_score: FxHashMap<Position, u32> = FxHashMap::default();
    let mut parent: FxHashMap<Position, Position> = FxHashMap::default();

    g_score.insert(start, 0);
    open.push(Reverse((start.manhattan(goal), 0, start.x, start.y)));

    while let Some(Reverse((_, g, x, y))) = open.pop() {
        deadline.check()?;
        let node = Position::new(x, y);

        if node == goal {
            return Ok(Some(reconstruct(&parent, goal)));
        }
        // Skip stale heap entries.
        if g > g_score[&node] {
            continue;
        }

        for to in node.neighbours() {
            if !passable(node, to) {
                continue;
            }
            let tentative = g + 1;
            if g_score.get(&to).is_none_or(|&best| tentative < best) {
                g_score.insert(to, tentative);
                parent.insert(to, node);
                open.push(Reverse((tentative + to.manhattan(goal), tentative, to.x, to.y)));
            }
        }
    }

    Ok(None)
}

fn reconstruct(parent: &FxHashMap<Position, Position>, goal: Position) -> Vec<Position> {
    let mut cells = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = parent.get(&cur) {
        cells.push(prev);
        cur = prev;
    }
    cells.reverse();
    cells
}
