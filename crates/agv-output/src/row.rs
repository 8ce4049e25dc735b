//! Plain data row types written by output backends.

use agv_fleet::{PoseRecord, Snapshot};

/// One entity's global pose at a sample time.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseRow {
    pub time:    f64,
    /// `"agv"` or `"shelf"`.
    pub kind:    &'static str,
    pub name:    String,
    pub x:       f64,
    pub y:       f64,
    pub z:       f64,
    pub heading: f64,
    /// Behaviour state for AGVs; empty for shelves.
    pub state:   &'static str,
}

impl PoseRow {
    fn from_record(time: f64, kind: &'static str, rec: &PoseRecord) -> Self {
        Self {
            time,
            kind,
            name:    rec.name.clone(),
            x:       rec.position.x,
            y:       rec.position.y,
            z:       rec.position.z,
            heading: rec.heading,
            state:   rec.state.map_or("", |s| s.as_str()),
        }
    }

    /// Flatten a snapshot: AGVs first, then shelves, each in id order.
    pub fn from_snapshot(snap: &Snapshot) -> Vec<PoseRow> {
        let t = snap.time.0;
        snap.agvs
            .iter()
            .map(|r| Self::from_record(t, "agv", r))
            .chain(snap.shelves.iter().map(|r| Self::from_record(t, "shelf", r)))
            .collect()
    }
}

/// One dispatched event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRow {
    /// Dispatch sequence number, from 0.
    pub seq:         u64,
    pub time:        f64,
    pub label:       &'static str,
    /// AGVs not `Idle` after the event ran.
    pub active_agvs: u32,
}
