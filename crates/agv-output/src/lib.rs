//! `agv-output` — simulation output writers for the AGV fleet kernel.
//!
//! | Feature   | Backend | Files created              |
//! |-----------|---------|----------------------------|
//! | *(none)*  | CSV     | `poses.csv`, `steps.csv`   |
//! | `sqlite`  | SQLite  | `output.db`                |
//!
//! Both backends implement [`OutputWriter`] and are driven by
//! [`SnapshotObserver`], which implements `agv_sim::SimObserver<Warehouse>`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use agv_output::{CsvWriter, SnapshotObserver, run_sampled};
//!
//! let mut obs = SnapshotObserver::new(CsvWriter::new(Path::new("./output"))?);
//! run_sampled(&mut sim, SimTime(600.0), 0.5, &mut obs)?;
//! obs.finish()?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{SnapshotObserver, run_sampled};
pub use row::{PoseRow, StepRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
