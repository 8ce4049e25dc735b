//! Simulation time model.
//!
//! # Design
//!
//! Time is a continuous `SimTime` in simulated seconds.  Unlike a tick
//! counter it only moves when an event is dispatched or when a run snaps the
//! clock to its horizon, so the clock never reads a wall clock and never
//! drifts between events.
//!
//! `SimClock` enforces monotonicity: every advance is checked against the
//! current value and a backward move is reported as
//! [`PreconditionError::TimeTravel`].

use std::fmt;
use std::ops::{Add, Sub};

use crate::{OrderingMode, PreconditionError, PreconditionResult};

// ── SimTime ──────────────────────────────────────────────────────────────────

/// An absolute simulation time in seconds.
///
/// `SimTime` orders by numeric value, so `-0.0` and `0.0` are the same
/// instant.  NaN is rejected at every entry point that could store one; if
/// one slips through it falls back to [`f64::total_cmp`] to keep the order
/// total.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);
    pub const INFINITY: SimTime = SimTime(f64::INFINITY);

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    #[inline]
    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or_else(|| self.0.total_cmp(&other.0))
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl From<f64> for SimTime {
    fn from(secs: f64) -> Self {
        SimTime(secs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}s", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The logical clock owned by the simulator.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    now: SimTime,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that starts at `start` rather than zero.
    pub fn starting_at(start: SimTime) -> Self {
        Self { now: start }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock forward to `to`.
    ///
    /// Fails with [`PreconditionError::TimeTravel`] if `to` is earlier than
    /// the current time or is NaN.
    pub fn advance_to(&mut self, to: SimTime) -> PreconditionResult<()> {
        if to.is_nan() || to < self.now {
            return Err(PreconditionError::TimeTravel { due: to, now: self.now });
        }
        self.now = to;
        Ok(())
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.now)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from JSON by the application crate and passed to the
/// simulator.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Tie-break policy for timed events sharing a due time.
    pub ordering: OrderingMode,
}

impl SimConfig {
    pub fn new(seed: u64, ordering: OrderingMode) -> Self {
        Self { seed, ordering }
    }
}
