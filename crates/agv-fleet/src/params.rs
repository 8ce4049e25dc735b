//! Tunables of the task timeline and the navigation protocol.

use std::f64::consts::FRAC_PI_2;

use agv_scene::{Attribute, Scope};
use serde::{Deserialize, Serialize};

use crate::{FleetError, FleetResult};

/// Every duration is in simulated seconds.
///
/// Missing fields take their defaults, so a partial JSON object is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetParams {
    /// Dwell at the shelf point before the shelf is lifted.
    pub grab_secs: f64,
    /// Time to set the shelf down at the destination, and to pick it back
    /// up before the dwell ends.
    pub drop_secs: f64,
    /// Total time spent at the destination.
    pub dwell_secs: f64,
    /// Dwell at the shelf's home before it is set down again.
    pub return_secs: f64,
    /// Give up waiting on a contested node after this long and re-plan.
    pub blocked_timeout_secs: f64,
    /// Retry interval when no route exists at all.
    pub no_plan_timeout_secs: f64,
    /// Distance units per second.
    pub travel_speed: f64,
    /// Radians per second for in-place rotation.
    pub turn_rate: f64,
    /// Headings closer than this count as aligned.
    pub heading_epsilon: f64,
    /// Period of the dispatcher tick.
    pub dispatch_interval_secs: f64,
    /// Plan nodes reserved ahead of the current one.
    pub lookahead: usize,
}

impl Default for FleetParams {
    fn default() -> Self {
        Self {
            grab_secs:              3.0,
            drop_secs:              3.0,
            dwell_secs:             16.0,
            return_secs:            3.0,
            blocked_timeout_secs:   5.0,
            no_plan_timeout_secs:   1.0,
            travel_speed:           1.0,
            turn_rate:              FRAC_PI_2,
            heading_epsilon:        1e-7,
            dispatch_interval_secs: 0.05,
            lookahead:              2,
        }
    }
}

impl FleetParams {
    /// Reject values the task timeline or the navigation protocol cannot
    /// run with: non-positive rates, negative or non-finite durations, a
    /// drop that outlasts the dwell, and a lookahead of zero.
    pub fn validate(&self) -> FleetResult<()> {
        let durations = [
            ("grab_secs", self.grab_secs),
            ("drop_secs", self.drop_secs),
            ("dwell_secs", self.dwell_secs),
            ("return_secs", self.return_secs),
            ("blocked_timeout_secs", self.blocked_timeout_secs),
            ("no_plan_timeout_secs", self.no_plan_timeout_secs),
            ("heading_epsilon", self.heading_epsilon),
        ];
        for (name, v) in durations {
            if !(v.is_finite() && v >= 0.0) {
                return Err(FleetError::Config(format!("{name} must be finite and >= 0, got {v}")));
            }
        }
        for (name, v) in [
            ("travel_speed", self.travel_speed),
            ("turn_rate", self.turn_rate),
            ("dispatch_interval_secs", self.dispatch_interval_secs),
        ] {
            check_rate(name, v)?;
        }
        if self.drop_secs > self.dwell_secs {
            return Err(FleetError::Config(format!(
                "drop_secs ({}) exceeds dwell_secs ({})",
                self.drop_secs, self.dwell_secs
            )));
        }
        if self.lookahead == 0 {
            return Err(FleetError::Config("lookahead must be at least 1".into()));
        }
        Ok(())
    }
}

/// `v` must be finite and strictly positive.
pub(crate) fn check_rate(name: &str, v: f64) -> FleetResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(FleetError::Config(format!("{name} must be finite and > 0, got {v}")))
    }
}

// ── Class attributes ──────────────────────────────────────────────────────────

/// Fleet-wide travel speed, seeded from [`FleetParams::travel_speed`].
pub struct TravelSpeed;

impl Attribute for TravelSpeed {
    type Value = f64;
    const OWNER: &'static str = "Agv";
    const NAME:  &'static str = "travel_speed";
    const SCOPE: Scope        = Scope::Class;
}

/// Fleet-wide rotation rate, seeded from [`FleetParams::turn_rate`].
pub struct TurnRate;

impl Attribute for TurnRate {
    type Value = f64;
    const OWNER: &'static str = "Agv";
    const NAME:  &'static str = "turn_rate";
    const SCOPE: Scope        = Scope::Class;
}

/// Per-shelf count of completed deliveries.
pub struct Deliveries;

impl Attribute for Deliveries {
    type Value = u32;
    const OWNER: &'static str = "Shelf";
    const NAME:  &'static str = "deliveries";
    const SCOPE: Scope        = Scope::Instance;
}
