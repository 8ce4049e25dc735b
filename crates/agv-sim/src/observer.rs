//! Simulation observer trait for progress reporting and data collection.

use agv_core::SimTime;

/// Callbacks invoked by [`Simulator::run_until_observed`][crate::Simulator::run_until_observed].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — dispatch counter
///
/// ```rust,ignore
/// struct Counter(u64);
///
/// impl<W> SimObserver<W> for Counter {
///     fn on_dispatch(&mut self, _now: SimTime, _label: &'static str, _world: &W) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver<W> {
    /// Called after each event's action has run, with the clock at the
    /// event's dispatch time.
    fn on_dispatch(&mut self, _now: SimTime, _label: &'static str, _world: &W) {}

    /// Called once when a run reaches its horizon, after the clock snapped.
    ///
    /// `dispatched` is the number of events executed by this run.
    fn on_run_end(&mut self, _now: SimTime, _dispatched: u64, _world: &W) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl<W> SimObserver<W> for NoopObserver {}
