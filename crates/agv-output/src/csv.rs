//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `poses.csv`
//! - `steps.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, PoseRow, StepRow};

pub struct CsvWriter {
    poses:    Writer<File>,
    steps:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut poses = Writer::from_path(dir.join("poses.csv"))?;
        poses.write_record(["time", "kind", "name", "x", "y", "z", "heading", "state"])?;

        let mut steps = Writer::from_path(dir.join("steps.csv"))?;
        steps.write_record(["seq", "time", "label", "active_agvs"])?;

        Ok(Self { poses, steps, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_poses(&mut self, rows: &[PoseRow]) -> OutputResult<()> {
        for row in rows {
            self.poses.write_record(&[
                row.time.to_string(),
                row.kind.to_string(),
                row.name.clone(),
                row.x.to_string(),
                row.y.to_string(),
                row.z.to_string(),
                row.heading.to_string(),
                row.state.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_step(&mut self, row: &StepRow) -> OutputResult<()> {
        self.steps.write_record(&[
            row.seq.to_string(),
            row.time.to_string(),
            row.label.to_string(),
            row.active_agvs.to_string(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.poses.flush()?;
        self.steps.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush()
    }
}
