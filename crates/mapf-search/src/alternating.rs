//! A* over a direction-alternating map with the time coordinate stored
//! modulo `2f`.
//!
//! On an alternating map the passage predicate is periodic in `t` with
//! period `2f`, so two states `(pos, t₁)` and `(pos, t₂)` with
//! `t₁ ≡ t₂ (mod 2f)` have identical futures.  Folding the time coordinate
//! collapses the search space to `|cells| · 2f` states while still allowing
//! waits (a wait advances the phase).  The reconstructed plan carries real
//! tick stamps counted from the start time.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use mapf_core::{Deadline, MapfResult, Plan, Position, TimedPosition};

use crate::SearchOutcome;

/// State: a cell and the phase `t mod 2f`.
type PhaseNode = (Position, u32);

/// Heap key: f-score, then `(g, x, y, phase)` for deterministic tie-breaks.
type HeapKey = (u32, u32, i32, i32, u32);

/// Run the phase-folded A* from `start` to `goal`.
///
/// `legal(from, to, t)` receives real ticks; `frequency` is the map's
/// direction-change frequency (`0` degrades to a single phase, i.e. a
/// static map).  `horizon` bounds the *real* arrival tick.
pub fn alternating_astar<L>(
    start: TimedPosition,
    goal: Position,
    mut legal: L,
    frequency: u32,
    horizon: u32,
    deadline: &Deadline,
) -> MapfResult<SearchOutcome>
where
    L: FnMut(Position, Position, u32) -> bool,
{
    let period = (2 * frequency).max(1);
    let phase_of = |t: u32| t % period;

    let mut open: BinaryHeap<Reverse<HeapKey>> = BinaryHeap::new();
    let mut parent: FxHashMap<PhaseNode, PhaseNode> = FxHashMap::default();
    let mut g_of: FxHashMap<PhaseNode, u32> = FxHashMap::default();
    let mut horizon_hit = false;

    let start_node: PhaseNode = (start.pos, phase_of(start.time));
    g_of.insert(start_node, 0);
    open.push(Reverse((start.pos.manhattan(goal), 0, start.pos.x, start.pos.y, start_node.1)));

    while let Some(Reverse((_, g, x, y, phase))) = open.pop() {
        deadline.check()?;
        let node: PhaseNode = (Position::new(x, y), phase);

        if node.0 == goal {
            return Ok(SearchOutcome::Found(reconstruct(&parent, node, start, g)));
        }
        if g > g_of[&node] {
            continue;
        }

        let t = start.time + g;
        if t + 1 > horizon {
            horizon_hit = true;
            continue;
        }
        let [e, w, s, n] = node.0.neighbours();
        for to in [e, w, s, n, node.0] {
            if !legal(node.0, to, t) {
                continue;
            }
            let succ: PhaseNode = (to, phase_of(t + 1));
            let tentative = g + 1;
            if g_of.get(&succ).is_none_or(|&best| tentative < best) {
                g_of.insert(succ, tentative);
                parent.insert(succ, node);
                open.push(Reverse((
                    tentative.saturating_add(to.manhattan(goal)),
                    tentative,
                    to.x,
                    to.y,
                    succ.1,
                )));
            }
        }
    }

    Ok(if horizon_hit { SearchOutcome::HorizonExceeded } else { SearchOutcome::Exhausted })
}

fn reconstruct(
    parent: &FxHashMap<PhaseNode, PhaseNode>,
    goal: PhaseNode,
    start: TimedPosition,
    g: u32,
) -> Plan {
    let mut cells = vec![goal.0];
    let mut cur = goal;
    while let Some(&prev) = parent.get(&cur) {
        cells.push(prev.0);
        cur = prev;
    }
    cells.reverse();
    debug_assert_eq!(cells.len() as u32, g + 1);
    let steps = cells
        .into_iter()
        .enumerate()
        .map(|(i, pos)| pos.at(start.time + i as u32))
        .collect();
    Plan::from_steps(steps)
}
