//! `mapf-eval` — metric collection around the planning engine.
//!
//! [`evaluate`] runs one scenario through its planner three times — on the
//! directed map, the undirected-by-copy map, and the dynamic map — and
//! records makespan, flowtime, service time, and planning wall time per
//! run.  Rows go to any [`EvalWriter`]; the bundled [`CsvEvalWriter`]
//! writes one `evaluation.csv`.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `parallel` | [`evaluate_batch`] fans scenarios out via Rayon.  |

pub mod csv;
pub mod error;
pub mod eval;
pub mod row;
pub mod writer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use csv::CsvEvalWriter;
pub use error::{EvalError, EvalResult};
pub use eval::{MapMode, evaluate};
pub use row::EvalRow;
pub use writer::{EvalWriter, VecEvalWriter};

#[cfg(feature = "parallel")]
pub use eval::evaluate_batch;
