//! SQLite output backend (feature `sqlite`).
//!
//! Creates `output.db` in the output directory with two tables, `poses` and
//! `steps`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OutputResult, PoseRow, StepRow};

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS poses (
                 time    REAL    NOT NULL,
                 kind    TEXT    NOT NULL,
                 name    TEXT    NOT NULL,
                 x       REAL    NOT NULL,
                 y       REAL    NOT NULL,
                 z       REAL    NOT NULL,
                 heading REAL    NOT NULL,
                 state   TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS steps (
                 seq         INTEGER PRIMARY KEY,
                 time        REAL    NOT NULL,
                 label       TEXT    NOT NULL,
                 active_agvs INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_poses(&mut self, rows: &[PoseRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO poses (time, kind, name, x, y, z, heading, state) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.time, row.kind, row.name, row.x, row.y, row.z, row.heading, row.state,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_step(&mut self, row: &StepRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO steps (seq, time, label, active_agvs) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![row.seq as i64, row.time, row.label, row.active_agvs],
        )?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
