//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutputResult, PoseRow, StepRow};

/// Implemented by the CSV and SQLite writers.
///
/// Errors surface to the observer, which stores them; see
/// [`SnapshotObserver::take_error`](crate::SnapshotObserver::take_error).
pub trait OutputWriter {
    /// Write every pose of one snapshot.
    fn write_poses(&mut self, rows: &[PoseRow]) -> OutputResult<()>;

    /// Write one dispatched-event row.
    fn write_step(&mut self, row: &StepRow) -> OutputResult<()>;

    /// Push buffered rows to disk without closing anything.
    fn flush(&mut self) -> OutputResult<()>;

    /// Flush and finalise the output.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
