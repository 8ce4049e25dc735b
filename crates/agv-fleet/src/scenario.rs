//! Scenario description and loading.
//!
//! The JSON layout indexes points by position in `network.points`:
//!
//! ```json
//! {
//!   "network": {
//!     "points": [["p0", [0.0, 0.0, 0.0]], ["p1", [1.5, 0.0, 0.0]]],
//!     "paths":  [["p0-p1", 0, 1], ["p1-p0", 1, 0]]
//!   },
//!   "dest_points": [1],
//!   "agvs":    [["agv0", 0]],
//!   "shelves": [["shelf0", 0]]
//! }
//! ```
//!
//! Paths are directed; a two-way aisle lists both directions.

use std::path::Path;

use agv_core::{NodeId, Vec3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{FleetError, FleetParams, FleetResult, Warehouse, WarehouseBuilder};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub points: Vec<(String, [f64; 3])>,
    pub paths:  Vec<(String, usize, usize)>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub network:     NetworkSpec,
    pub dest_points: Vec<usize>,
    pub agvs:        Vec<(String, usize)>,
    pub shelves:     Vec<(String, usize)>,
}

impl Scenario {
    pub fn from_json(text: &str) -> FleetResult<Self> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> FleetResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_json(&text)?;
        info!(path = %path.display(), points = scenario.network.points.len(), "scenario loaded");
        Ok(scenario)
    }

    pub fn to_json(&self) -> FleetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> FleetResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Check every point index.
    pub fn validate(&self) -> FleetResult<()> {
        let n = self.network.points.len();
        let bad = |what: String, i: usize| {
            FleetError::Scenario(format!("{what} refers to point {i}, but there are only {n}"))
        };
        for (name, from, to) in &self.network.paths {
            for i in [*from, *to] {
                if i >= n {
                    return Err(bad(format!("path `{name}`"), i));
                }
            }
        }
        for &d in &self.dest_points {
            if d >= n {
                return Err(bad("destination".into(), d));
            }
        }
        for (name, i) in &self.agvs {
            if *i >= n {
                return Err(bad(format!("agv `{name}`"), *i));
            }
        }
        for (name, i) in &self.shelves {
            if *i >= n {
                return Err(bad(format!("shelf `{name}`"), *i));
            }
        }
        Ok(())
    }

    /// Build the world this scenario describes.
    pub fn build(&self, params: FleetParams, seed: u64) -> FleetResult<Warehouse> {
        self.validate()?;
        let mut b = WarehouseBuilder::new(params, seed);
        let mut ids = Vec::with_capacity(self.network.points.len());
        for (name, [x, y, z]) in &self.network.points {
            ids.push(b.add_point(name.as_str(), Vec3::new(*x, *y, *z))?);
        }
        let node = |i: usize| -> NodeId { ids[i] };
        for (name, from, to) in &self.network.paths {
            b.add_path(name.as_str(), node(*from), node(*to))?;
        }
        for &d in &self.dest_points {
            b.add_destination(node(d));
        }
        for (name, i) in &self.agvs {
            b.add_agv(name.as_str(), node(*i));
        }
        for (name, i) in &self.shelves {
            b.add_shelf(name.as_str(), node(*i));
        }
        b.build()
    }
}
