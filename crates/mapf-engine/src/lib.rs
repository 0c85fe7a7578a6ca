//! `mapf-engine` — the facade a caller drives.
//!
//! [`mapf`] dispatches a scenario to the planner named by
//! [`PlannerParams::algorithm`]; [`Validator`] checks any common plan
//! against its scenario.  Planners are also reachable through the
//! [`Planner`] trait for callers that want to hold one as an object.
//!
//! ```rust,ignore
//! use mapf_core::{Algorithm, Deadline, PlannerParams};
//! use mapf_engine::{mapf, Validator, ValidationMode};
//!
//! let params = PlannerParams::with_algorithm(Algorithm::CaStar);
//! if let Some(solution) = mapf(&scenario, &params, &Deadline::NONE)? {
//!     Validator::check(&scenario, &solution.plan, ValidationMode::Classic)?;
//! }
//! ```

pub mod planner;
pub mod validator;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use planner::{Planner, mapf};
pub use validator::{ValidationError, ValidationMode, Validator};
