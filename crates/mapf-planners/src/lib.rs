//! `mapf-planners` — the four flat (non-hierarchical) planners.
//!
//! | Module      | Planner                                                   |
//! |-------------|-----------------------------------------------------------|
//! | [`ca_star`] | Cooperative A* — prioritized planning over a reservation  |
//! |             | table with shuffled agent orders                          |
//! | [`token`]   | Token-Passing — online lifelong pickup-and-delivery       |
//! | [`replan`]  | Runtime replanner — per-tick claim-based deconfliction,   |
//! |             | static and direction-alternating variants                 |
//! | [`traffic`] | Traffic simulator — decentralized greedy stepping with    |
//! |             | cycle rotation                                            |
//!
//! Every planner consumes an immutable [`mapf_map::Scenario`] and returns
//! `Ok(Some(solution))`, `Ok(None)` for an unsolvable scenario, or an error
//! for faults (timeout, distance-table miss).  Planner state — tables,
//! claims, tokens — is created per run and dropped with it.

pub mod ca_star;
pub mod replan;
pub mod token;
pub mod traffic;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ca_star::CaStarPlanner;
pub use replan::RuntimeReplanner;
pub use token::TokenPassingPlanner;
pub use traffic::TrafficSimulator;
