//! Error types for agv-output.

use agv_fleet::FleetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The world could not produce a snapshot.
    #[error("snapshot failed: {0}")]
    Snapshot(#[from] FleetError),
}

pub type OutputResult<T> = Result<T, OutputError>;
