//! `mapf-core` — foundational types for the mapf planning workspace.
//!
//! This crate is a dependency of every other `mapf-*` crate.  It intentionally
//! has no `mapf-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `TaskId`, `RegionId`, `TraversalId`            |
//! | [`grid`]   | `Position`, `GridEdge`, `TimedPosition`, `TimedEdge`      |
//! | [`plan`]   | `Plan`, `CommonPlan`                                      |
//! | [`agent`]  | `Agent`, `Task`, `Solution`                               |
//! | [`params`] | `Algorithm`, `PlannerParams`, `Deadline`                  |
//! | [`error`]  | `MapfError`, `MapfResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod agent;
pub mod error;
pub mod grid;
pub mod ids;
pub mod params;
pub mod plan;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{Agent, Solution, Task};
pub use error::{MapfError, MapfResult};
pub use grid::{GridEdge, Position, TimedEdge, TimedPosition};
pub use ids::{AgentId, RegionId, TaskId, TraversalId};
pub use params::{Algorithm, Deadline, PlannerParams};
pub use plan::{CommonPlan, Plan};
