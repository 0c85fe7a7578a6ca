//! Workspace error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `MapfError` via `From` impls, or keep them separate and wrap `MapfError`
//! as one variant.  Both patterns are acceptable; prefer whichever keeps
//! error sites clean.
//!
//! Note that "the scenario is unsolvable" is *not* an error: planners signal
//! it by returning `Ok(None)`.  Errors are faults — timeouts, programmer
//! errors, invalid inputs — that abort the current call.

use thiserror::Error;

use crate::Position;

/// The top-level error type for `mapf-core` and a common base for sub-crates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapfError {
    /// The cooperative deadline passed at a checkpoint.
    #[error("planning deadline exceeded")]
    Timeout,

    /// The true-distance oracle was queried for a cell it never precomputed.
    /// Always a programmer error; never masked.
    #[error("no true-distance entry for endpoint {endpoint} (queried from {cell})")]
    DistanceTableMiss { cell: Position, endpoint: Position },

    /// Malformed scenario input (off-map start, obstacle target, …).
    #[error("invalid scenario: {0}")]
    Scenario(String),
}

/// Shorthand result type for all `mapf-*` crates.
pub type MapfResult<T> = Result<T, MapfError>;
