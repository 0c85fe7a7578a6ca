//! Axis-aligned region partitioning of a grid map.
//!
//! Every cell belongs to exactly one region; a region owns the edges whose
//! endpoints both lie inside it.  Edges straddling a region boundary are
//! *border edges*, held by the grid container.  Where the map was
//! undirected by copy, copy-flagged border edges are dropped, so region
//! boundaries are always directed — the asymmetry the conflict-repair layer
//! relies on.

use rustc_hash::FxHashSet;

use mapf_core::{GridEdge, Position, RegionId};
use mapf_map::GridMap;

/// One rectangle of cells (inclusive bounds) and the edges inside it.
#[derive(Clone, Debug)]
pub struct Region {
    pub id: RegionId,
    pub min: Position,
    pub max: Position,
    edges: FxHashSet<GridEdge>,
}

impl Region {
    pub fn contains(&self, pos: Position) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x) && (self.min.y..=self.max.y).contains(&pos.y)
    }

    pub fn has_edge(&self, edge: GridEdge) -> bool {
        self.edges.contains(&edge)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// The full partition: regions in row-major order plus the border edges.
pub struct RegionGrid {
    side: u32,
    cols: u32,
    regions: Vec<Region>,
    border: FxHashSet<GridEdge>,
}

impl RegionGrid {
    /// Partition `map` with both the region count per row and the region
    /// side length near `√dim`.
    pub fn build(map: &GridMap) -> Self {
        let dim = map.width().max(map.height()).max(1);
        let side = (f64::from(dim).sqrt().round() as u32).max(1);
        let cols = map.width().div_ceil(side).max(1);
        let rows = map.height().div_ceil(side).max(1);

        let mut regions = Vec::with_capacity((cols * rows) as usize);
        for ry in 0..rows {
            for rx in 0..cols {
                let min = Position::new((rx * side) as i32, (ry * side) as i32);
                let max = Position::new(
                    ((rx * side + side - 1).min(map.width() - 1)) as i32,
                    ((ry * side + side - 1).min(map.height() - 1)) as i32,
                );
                regions.push(Region {
                    id: RegionId(regions.len() as u32),
                    min,
                    max,
                    edges: FxHashSet::default(),
                });
            }
        }

        let mut grid = Self { side, cols, regions, border: FxHashSet::default() };
        for edge in map.edges() {
            let from = grid.region_of(edge.from);
            let to = grid.region_of(edge.to);
            if from == to {
                grid.regions[from.index()].edges.insert(edge);
            } else if !map.is_copy(edge) {
                grid.border.insert(edge);
            }
            // Copy-flagged border edges are dropped entirely.
        }
        grid
    }

    /// The region owning `pos`.
    pub fn region_of(&self, pos: Position) -> RegionId {
        let rx = pos.x as u32 / self.side;
        let ry = pos.y as u32 / self.side;
        RegionId(ry * self.cols + rx)
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn is_border_edge(&self, edge: GridEdge) -> bool {
        self.border.contains(&edge)
    }

    /// May a high-level route use `edge`?  Region-owned and border edges
    /// qualify; dropped copies do not.
    pub fn is_route_edge(&self, edge: GridEdge) -> bool {
        if self.border.contains(&edge) {
            return true;
        }
        self.regions[self.region_of(edge.from).index()].has_edge(edge)
    }
}
