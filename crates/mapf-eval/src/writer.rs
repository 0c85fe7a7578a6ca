//! The `EvalWriter` trait implemented by metric backends.

use crate::{EvalResult, EvalRow};

/// Sink for evaluation rows.
pub trait EvalWriter {
    /// Write one row.
    fn write_row(&mut self, row: &EvalRow) -> EvalResult<()>;

    /// Flush and close the underlying sink.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> EvalResult<()>;
}

/// Collects rows in memory; the test and library-consumer backend.
#[derive(Default)]
pub struct VecEvalWriter {
    pub rows: Vec<EvalRow>,
}

impl EvalWriter for VecEvalWriter {
    fn write_row(&mut self, row: &EvalRow) -> EvalResult<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> EvalResult<()> {
        Ok(())
    }
}
