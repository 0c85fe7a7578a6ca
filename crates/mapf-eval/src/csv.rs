//! CSV output backend.
//!
//! Creates one file, `evaluation.csv`, in the configured output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{EvalResult, EvalRow};
use crate::writer::EvalWriter;

/// Writes evaluation rows to a single CSV file.
pub struct CsvEvalWriter {
    rows: Writer<File>,
    finished: bool,
}

impl CsvEvalWriter {
    /// Open (or create) `evaluation.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> EvalResult<Self> {
        let mut rows = Writer::from_path(dir.join("evaluation.csv"))?;
        rows.write_record([
            "scenario",
            "algorithm",
            "map_mode",
            "solved",
            "makespan",
            "flowtime",
            "service_time",
            "planning_ns",
        ])?;
        Ok(Self { rows, finished: false })
    }
}

impl EvalWriter for CsvEvalWriter {
    fn write_row(&mut self, row: &EvalRow) -> EvalResult<()> {
        self.rows.write_record(&[
            row.scenario.clone(),
            format!("{:?}", row.algorithm),
            format!("{:?}", row.map_mode),
            (row.solved as u8).to_string(),
            row.makespan.to_string(),
            row.flowtime.to_string(),
            row.service_time.to_string(),
            row.planning_ns.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> EvalResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rows.flush()?;
        Ok(())
    }
}
