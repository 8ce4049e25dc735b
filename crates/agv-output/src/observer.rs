//! `SnapshotObserver<W>` — bridges `SimObserver<Warehouse>` to an
//! `OutputWriter`.

use agv_core::SimTime;
use agv_fleet::{AgvState, Warehouse};
use agv_sim::{SimObserver, SimResult, Simulator};
use tracing::warn;

use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult, PoseRow, StepRow};

/// Writes one step row per dispatched event and a full pose snapshot at the
/// end of every run segment.
///
/// `SimObserver` methods have no return value, so the first write error is
/// stored; check it with [`take_error`][Self::take_error] once the run
/// returns.  Drive it with [`run_sampled`] to get poses at a fixed interval
/// of simulated time.
pub struct SnapshotObserver<W: OutputWriter> {
    writer:     W,
    seq:        u64,
    samples:    u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SnapshotObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, seq: 0, samples: 0, last_error: None }
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to finish it explicitly).
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Snapshots written so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Write the poses of `world` at `now`.
    pub fn sample(&mut self, world: &Warehouse, now: SimTime) {
        let result = self.write_sample(world, now);
        self.store_err(result);
    }

    /// Flush and finalise the writer.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    fn write_sample(&mut self, world: &Warehouse, now: SimTime) -> OutputResult<()> {
        let snap = world.snapshot(now)?;
        self.writer.write_poses(&PoseRow::from_snapshot(&snap))?;
        self.samples += 1;
        Ok(())
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver<Warehouse> for SnapshotObserver<W> {
    fn on_dispatch(&mut self, now: SimTime, label: &'static str, world: &Warehouse) {
        let row = StepRow {
            seq:         self.seq,
            time:        now.0,
            label,
            active_agvs: world.agvs().iter().filter(|a| a.state() != AgvState::Idle).count() as u32,
        };
        self.seq += 1;
        let result = self.writer.write_step(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, now: SimTime, _dispatched: u64, world: &Warehouse) {
        self.sample(world, now);
        let result = self.writer.flush();
        self.store_err(result);
    }
}

/// Run `sim` to `until` in segments of `every` seconds, so `obs` samples
/// poses at the start time and at every segment end.  A non-positive
/// `every` runs in one segment.
pub fn run_sampled<W: OutputWriter>(
    sim:   &mut Simulator<Warehouse>,
    until: SimTime,
    every: f64,
    obs:   &mut SnapshotObserver<W>,
) -> SimResult<()> {
    obs.sample(sim.world(), sim.now());
    if every <= 0.0 {
        return sim.run_until_observed(until, obs);
    }
    while sim.now() < until {
        let next = (sim.now() + every).min(until);
        sim.run_until_observed(next, obs)?;
    }
    Ok(())
}
