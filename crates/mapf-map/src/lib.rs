//! `mapf-map` — grid maps and everything derived purely from them.
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`map`]      | `GridMap`, `GridMapBuilder`, ASCII fixture parser       |
//! | [`manager`]  | `MapManager` — static / alternating passage predicate   |
//! | [`distance`] | `TrueDistance` — per-endpoint reversed-graph BFS        |
//! | [`scenario`] | `Scenario`, `ScenarioBuilder`                           |
//!
//! Maps are immutable once built (apart from [`map::GridMap::undirect`],
//! which is idempotent); planners borrow them through [`manager::MapManager`]
//! and never mutate them.

pub mod distance;
pub mod manager;
pub mod map;
pub mod scenario;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use distance::TrueDistance;
pub use manager::MapManager;
pub use map::{GridMap, GridMapBuilder, MapError};
pub use scenario::{Scenario, ScenarioBuilder};
