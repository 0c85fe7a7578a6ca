//! True-distance oracle: exact shortest-path distances *to* selected
//! endpoint cells.
//!
//! A BFS from each endpoint over the **reversed** directed graph yields, in
//! one pass, the length of the shortest directed path from every cell to
//! that endpoint.  The tables double as admissible heuristics for the timed
//! searches (true distance never overestimates the timed cost).
//!
//! Querying an endpoint that was never precomputed is a programmer error and
//! surfaces as [`MapfError::DistanceTableMiss`] — never `None`.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use mapf_core::{Deadline, MapfError, MapfResult, Position};

use crate::GridMap;

/// Precomputed per-endpoint distance tables.
pub struct TrueDistance {
    tables: FxHashMap<Position, FxHashMap<Position, u32>>,
}

impl TrueDistance {
    /// BFS from every endpoint.  The deadline is polled once per endpoint.
    pub fn build(
        map: &GridMap,
        endpoints: impl IntoIterator<Item = Position>,
        deadline: &Deadline,
    ) -> MapfResult<Self> {
        // Reverse adjacency: rev[q] lists every p with a directed edge p→q.
        let mut rev: FxHashMap<Position, Vec<Position>> = FxHashMap::default();
        for edge in map.edges() {
            rev.entry(edge.to).or_default().push(edge.from);
        }

        let mut tables = FxHashMap::default();
        for endpoint in endpoints {
            deadline.check()?;
            if tables.contains_key(&endpoint) {
                continue;
            }
            tables.insert(endpoint, bfs(&rev, endpoint));
        }
        Ok(Self { tables })
    }

    pub fn has_endpoint(&self, endpoint: Position) -> bool {
        self.tables.contains_key(&endpoint)
    }

    /// Shortest directed-path length from `from` to `endpoint`, or `None` if
    /// unreachable.  Errs on an endpoint that was never precomputed.
    pub fn distance(&self, from: Position, endpoint: Position) -> MapfResult<Option<u32>> {
        let table = self
            .tables
            .get(&endpoint)
            .ok_or(MapfError::DistanceTableMiss { cell: from, endpoint })?;
        Ok(table.get(&from).copied())
    }

    /// Heuristic closure for the timed searches: unreachable cells map to
    /// `u32::MAX`, which the search engines treat as "prune".
    pub fn heuristic_to(&self, endpoint: Position) -> MapfResult<impl Fn(Position) -> u32 + '_> {
        let table = self.tables.get(&endpoint).ok_or(MapfError::DistanceTableMiss {
            cell: endpoint,
            endpoint,
        })?;
        Ok(move |pos: Position| table.get(&pos).copied().unwrap_or(u32::MAX))
    }
}

fn bfs(rev: &FxHashMap<Position, Vec<Position>>, endpoint: Position) -> FxHashMap<Position, u32> {
    let mut dist = FxHashMap::default();
    let mut queue = VecDeque::new();
    dist.insert(endpoint, 0u32);
    queue.push_back(endpoint);
    while let Some(cell) = queue.pop_front() {
        let d = dist[&cell];
        if let Some(preds) = rev.get(&cell) {
            for &pred in preds {
                dist.entry(pred).or_insert_with(|| {
                    queue.push_back(pred);
                    d + 1
                });
            }
        }
    }
    dist
}
