//! `mapf-reserve` — the shared space-time claim substrate.
//!
//! Three cooperating pieces, each owned by exactly one planner run:
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`table`]      | `ReservationTable` — committed space-time occupancy   |
//! | [`claim`]      | `ClaimContainer` — tentative one-tick claims          |
//! | [`constraint`] | `ConstraintSet` — CBS vertex/edge prohibitions        |
//!
//! Every acquisition is paired with an exit-path release: success commits,
//! failure rolls back via [`table::ReservationTable::cancel_agent`] or
//! [`claim::ClaimContainer::remove_claims`].  No reservation survives a
//! failed plan attempt.

pub mod claim;
pub mod constraint;
pub mod table;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use claim::{ClaimContainer, ClaimEdge};
pub use constraint::{ConstraintSet, EdgeConstraint, VertexConstraint};
pub use table::{Reservation, ReservationTable};
