//! Space-time A* over a 4-connected grid with waiting.
//!
//! Nodes are `(position, tick)` pairs; every move or wait costs one tick, so
//! a node's g-score *is* its tick and each space-time state is reached at
//! most once.  That collapses the usual g-score bookkeeping: a state is
//! pushed the first time it is generated and never improved afterwards.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use mapf_core::{Deadline, MapfResult, Plan, Position, TimedPosition};

use crate::SearchOutcome;

/// Heap key: f-score first, then `(t, x, y)` for deterministic tie-breaks.
type HeapKey = (u32, u32, i32, i32);

/// Run a timed A* from `start`.
///
/// * `legal(from, to, t)` — may the step departing at `t` be taken?  Waits
///   (`from == to`) pass through the same predicate.
/// * `heuristic(pos)` — admissible estimate to the goal; `u32::MAX` prunes.
/// * `accept(node)` — termination test on the popped node (goal equality,
///   optionally conjoined with a free-forever check).
/// * `horizon` — successors past this tick are pruned; if only they
///   remained, the result is [`SearchOutcome::HorizonExceeded`].
///
/// The deadline is polled once per expansion.
pub fn timed_astar<L, H, A>(
    start: TimedPosition,
    mut legal: L,
    heuristic: H,
    accept: A,
    horizon: u32,
    deadline: &Deadline,
) -> MapfResult<SearchOutcome>
where
    L: FnMut(Position, Position, u32) -> bool,
    H: Fn(Position) -> u32,
    A: Fn(TimedPosition) -> bool,
{
    let mut open: BinaryHeap<Reverse<HeapKey>> = BinaryHeap::new();
    let mut parent: FxHashMap<TimedPosition, TimedPosition> = FxHashMap::default();
    let mut seen: FxHashSet<TimedPosition> = FxHashSet::default();
    let mut horizon_hit = false;

    let h0 = heuristic(start.pos);
    if h0 == u32::MAX {
        return Ok(SearchOutcome::Exhausted);
    }
    seen.insert(start);
    open.push(Reverse((start.time + h0, start.time, start.pos.x, start.pos.y)));

    while let Some(Reverse((_, t, x, y))) = open.pop() {
        deadline.check()?;
        let node = Position::new(x, y).at(t);

        if accept(node) {
            return Ok(SearchOutcome::Found(reconstruct(&parent, node)));
        }

        let t_next = t + 1;
        if t_next > horizon {
            horizon_hit = true;
            continue;
        }
        let [e, w, s, n] = node.pos.neighbours();
        for to in [e, w, s, n, node.pos] {
            let succ = to.at(t_next);
            if seen.contains(&succ) || !legal(node.pos, to, t) {
                continue;
            }
            let h = heuristic(to);
            if h == u32::MAX {
                continue;
            }
            seen.insert(succ);
            parent.insert(succ, node);
            open.push(Reverse((t_next.saturating_add(h), t_next, to.x, to.y)));
        }
    }

    Ok(if horizon_hit { SearchOutcome::HorizonExceeded } else { SearchOutcome::Exhausted })
}

fn reconstruct(parent: &FxHashMap<TimedPosition, TimedPosition>, goal: TimedPosition) -> Plan {
    let mut steps = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = parent.get(&cur) {
        steps.push(prev);
        cur = prev;
    }
    steps.reverse();
    Plan::from_steps(steps)
}
