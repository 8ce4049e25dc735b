//! Synthetic square warehouse used when no scenario file is given.
//!
//! ```text
//!          x=0  x=1  x=2 … x=8  …  x=n-1
//!   z=0     A    .    .     .        D       A  AGV home
//!   z=1     A    .    s     s        D       s  shelf home
//!   z=2     A    .    s     s        D       .  aisle point
//!   z=3     A    .    .     .        D       D  destination
//!   …
//! ```
//!
//! Shelves fill columns `2..=n-5` in the row pairs `z ≡ 1, 2 (mod 3)`, so
//! every third row stays a free cross-aisle for loaded AGVs.

use agv_fleet::{NetworkSpec, Scenario};

/// Build a `side × side` grid `spacing` units apart, with two-way paths
/// between 4-neighbours.  Points are numbered column by column.
pub fn grid_scenario(side: usize, spacing: f64) -> Scenario {
    let idx = |x: usize, z: usize| z + side * x;

    let mut network = NetworkSpec::default();
    for x in 0..side {
        for z in 0..side {
            network.points.push((
                format!("Point{}", idx(x, z)),
                [x as f64 * spacing, 0.0, z as f64 * spacing],
            ));
        }
    }
    let mut link = |a: usize, b: usize| {
        network.paths.push((format!("Path[{a}, {b}]"), a, b));
        network.paths.push((format!("Path[{b}, {a}]"), b, a));
    };
    for x in 0..side {
        for z in 0..side {
            if x + 1 < side {
                link(idx(x, z), idx(x + 1, z));
            }
            if z + 1 < side {
                link(idx(x, z), idx(x, z + 1));
            }
        }
    }

    let last = side.saturating_sub(1);
    let dest_points = (0..side).map(|z| idx(last, z)).collect();
    let agvs = (0..side).map(|z| (format!("AGV{z}"), idx(0, z))).collect();

    let mut shelves = Vec::new();
    for x in 2..=side.saturating_sub(5) {
        for z in (0..side).filter(|z| matches!(z % 3, 1 | 2)) {
            shelves.push((format!("Shelf{}", shelves.len()), idx(x, z)));
        }
    }

    Scenario { network, dest_points, agvs, shelves }
}

#[cfg(test)]
mod tests {
    use agv_fleet::FleetParams;

    use super::grid_scenario;

    #[test]
    fn default_grid_builds() {
        let s = grid_scenario(13, 1.5);
        assert_eq!(s.network.points.len(), 169);
        assert_eq!(s.agvs.len(), 13);
        assert_eq!(s.shelves.len(), 7 * 8);
        assert_eq!(s.dest_points.len(), 13);
        assert_eq!(s.network.points[14].1, [1.5, 0.0, 1.5]);
        let w = s.build(FleetParams::default(), 0).unwrap();
        assert_eq!(w.graph().edge_count(), 4 * 13 * 12);
    }
}
