//! Grid map representation, builder, and ASCII fixture parser.
//!
//! # Edge model
//!
//! Passages are *directed* edges between orthogonally adjacent cells.  An
//! undirected corridor is simply both directions present.  [`GridMap::undirect`]
//! adds the missing reverse of every edge and remembers which reverses it
//! added (`copy`-flagged) so the region layer can strip exactly those where a
//! reverse would straddle a region border.

use rustc_hash::FxHashSet;
use thiserror::Error;

use mapf_core::{GridEdge, Position};

/// Errors from building or parsing a grid map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("empty map text")]
    Empty,

    #[error("row {row} width mismatch: expected {expected}, got {got}")]
    RowWidthMismatch { row: usize, expected: usize, got: usize },

    #[error("unknown map character {0:?}")]
    UnknownTile(char),

    #[error("edge endpoint {0} out of bounds")]
    OutOfBounds(Position),

    #[error("edge {0} is not between orthogonal neighbours")]
    NotAdjacent(GridEdge),
}

// ── GridMap ──────────────────────────────────────────────────────────────────

/// A grid with directed passages, obstacles, and parking cells.
#[derive(Clone, Debug, Default)]
pub struct GridMap {
    width: u32,
    height: u32,
    edges: FxHashSet<GridEdge>,
    /// Reverse edges added by [`undirect`](Self::undirect).
    copies: FxHashSet<GridEdge>,
    obstacles: FxHashSet<Position>,
    parking: FxHashSet<Position>,
}

impl GridMap {
    /// A fully open `width × height` grid: every orthogonal neighbour pair is
    /// connected in both directions.
    pub fn open_grid(width: u32, height: u32) -> Self {
        let mut builder = GridMapBuilder::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let from = Position::new(x, y);
                for to in from.neighbours() {
                    if builder.in_bounds(to) {
                        builder.edge(from, to);
                    }
                }
            }
        }
        builder.build().expect("open grid edges are always valid")
    }

    /// Parse an ASCII fixture map.
    ///
    /// One character per cell: `.` open, `@` obstacle, `P` open parking
    /// cell.  Open cells are connected to open orthogonal neighbours in both
    /// directions.
    ///
    /// ```text
    /// .P...
    /// .@@@.
    /// .....
    /// ```
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let height = rows.len();
        let width = rows.first().ok_or(MapError::Empty)?.chars().count();

        let mut open = FxHashSet::default();
        let mut obstacles = FxHashSet::default();
        let mut parking = FxHashSet::default();
        for (y, row) in rows.iter().enumerate() {
            let cells: Vec<char> = row.chars().collect();
            if cells.len() != width {
                return Err(MapError::RowWidthMismatch { row: y, expected: width, got: cells.len() });
            }
            for (x, c) in cells.into_iter().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match c {
                    '.' => {
                        open.insert(pos);
                    }
                    'P' => {
                        open.insert(pos);
                        parking.insert(pos);
                    }
                    '@' => {
                        obstacles.insert(pos);
                    }
                    other => return Err(MapError::UnknownTile(other)),
                }
            }
        }

        let mut builder = GridMapBuilder::new(width as u32, height as u32);
        for &from in &open {
            for to in from.neighbours() {
                if open.contains(&to) {
                    builder.edge(from, to);
                }
            }
        }
        for &pos in &obstacles {
            builder.obstacle(pos);
        }
        for &pos in &parking {
            builder.parking(pos);
        }
        builder.build()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    #[inline]
    pub fn has_edge(&self, edge: GridEdge) -> bool {
        self.edges.contains(&edge)
    }

    /// `true` if `edge` only exists because [`undirect`](Self::undirect)
    /// added it as the reverse of a directed original.
    #[inline]
    pub fn is_copy(&self, edge: GridEdge) -> bool {
        self.copies.contains(&edge)
    }

    #[inline]
    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    #[inline]
    pub fn is_parking(&self, pos: Position) -> bool {
        self.parking.contains(&pos)
    }

    pub fn edges(&self) -> impl Iterator<Item = GridEdge> + '_ {
        self.edges.iter().copied()
    }

    pub fn parking_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.parking.iter().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add, for each edge, its reverse if absent, marking each added reverse
    /// as a copy.  Idempotent: a second call adds nothing.
    pub fn undirect(&mut self) {
        let originals: Vec<GridEdge> = self.edges.iter().copied().collect();
        for edge in originals {
            let rev = edge.reversed();
            if self.edges.insert(rev) {
                self.copies.insert(rev);
            }
        }
    }
}

// ── GridMapBuilder ───────────────────────────────────────────────────────────

/// Incremental map construction.  Collects edges and cell sets, validating
/// everything once in [`build`](Self::build).
pub struct GridMapBuilder {
    width: u32,
    height: u32,
    edges: Vec<GridEdge>,
    obstacles: Vec<Position>,
    parking: Vec<Position>,
}

impl GridMapBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, edges: Vec::new(), obstacles: Vec::new(), parking: Vec::new() }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Add a directed edge.
    pub fn edge(&mut self, from: Position, to: Position) -> &mut Self {
        self.edges.push(GridEdge::new(from, to));
        self
    }

    /// Add both directions of a passage.
    pub fn corridor(&mut self, a: Position, b: Position) -> &mut Self {
        self.edge(a, b).edge(b, a)
    }

    pub fn obstacle(&mut self, pos: Position) -> &mut Self {
        self.obstacles.push(pos);
        self
    }

    pub fn parking(&mut self, pos: Position) -> &mut Self {
        self.parking.push(pos);
        self
    }

    pub fn build(self) -> Result<GridMap, MapError> {
        let mut map = GridMap {
            width: self.width,
            height: self.height,
            ..GridMap::default()
        };
        for edge in self.edges {
            if !map.in_bounds(edge.from) {
                return Err(MapError::OutOfBounds(edge.from));
            }
            if !map.in_bounds(edge.to) {
                return Err(MapError::OutOfBounds(edge.to));
            }
            if edge.from.manhattan(edge.to) != 1 {
                return Err(MapError::NotAdjacent(edge));
            }
            map.edges.insert(edge);
        }
        for pos in self.obstacles {
            if !map.in_bounds(pos) {
                return Err(MapError::OutOfBounds(pos));
            }
            map.obstacles.insert(pos);
        }
        for pos in self.parking {
            if !map.in_bounds(pos) {
                return Err(MapError::OutOfBounds(pos));
            }
            map.parking.insert(pos);
        }
        Ok(map)
    }
}
