//! 3-D vector and rigid transform types.
//!
//! The warehouse floor is the X–Z plane with +Y up.  Headings are yaw angles
//! about +Y measured so that heading 0 faces +X and heading π/2 faces −Z,
//! which is what `atan2(-dz, dx)` yields for a direction `(dx, dz)`.
//! Headings are kept normalised to `[0, 2π)`.

use std::f64::consts::TAU;
use std::ops::{Add, Mul, Sub};

// ── Vec3 ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance.  Used both as edge length and as the search
    /// heuristic, so the heuristic is always admissible.
    #[inline]
    pub fn distance(self, other: Vec3) -> f64 {
        (other - self).length()
    }

    /// Linear interpolation; `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline]
    pub fn lerp(self, other: Vec3, t: f64) -> Vec3 {
        self + (other - self) * t
    }

    /// Heading from `self` towards `other` on the floor plane.
    pub fn heading_to(self, other: Vec3) -> f64 {
        let d = other - self;
        normalize_heading((-d.z).atan2(d.x))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

// ── Heading helpers ───────────────────────────────────────────────────────────

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn normalize_heading(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if a >= TAU { 0.0 } else { a }
}

/// Smallest absolute angle between two headings, in `[0, π]`.
#[inline]
pub fn heading_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(TAU);
    d.min(TAU - d)
}

// ── Transform3 ────────────────────────────────────────────────────────────────

/// A rigid transform: a 3×3 rotation basis (row-major) plus a translation.
///
/// `apply(p) = basis · p + origin`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform3 {
    pub basis:  [[f64; 3]; 3],
    pub origin: Vec3,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform3 {
    pub const IDENTITY: Transform3 = Transform3 {
        basis:  [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        origin: Vec3::ZERO,
    };

    /// Pure translation.
    pub fn translation(origin: Vec3) -> Self {
        Self { origin, ..Self::IDENTITY }
    }

    /// Rotation by `heading` about +Y, placed at `origin`.
    pub fn from_heading(heading: f64, origin: Vec3) -> Self {
        let (s, c) = heading.sin_cos();
        Self {
            basis: [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
            origin,
        }
    }

    /// Rotate a direction (no translation).
    #[inline]
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let b = &self.basis;
        Vec3::new(
            b[0][0] * v.x + b[0][1] * v.y + b[0][2] * v.z,
            b[1][0] * v.x + b[1][1] * v.y + b[1][2] * v.z,
            b[2][0] * v.x + b[2][1] * v.y + b[2][2] * v.z,
        )
    }

    /// Transform a point.
    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.rotate(p) + self.origin
    }

    /// Compose: the result applies `self` first, then `outer`.
    ///
    /// A scene node's global transform is
    /// `local.then(parent).then(grandparent)…then(root)`.
    pub fn then(&self, outer: &Transform3) -> Transform3 {
        let a = &outer.basis;
        let b = &self.basis;
        let mut basis = [[0.0; 3]; 3];
        for (i, row) in basis.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Transform3 {
            basis,
            origin: outer.apply(self.origin),
        }
    }

    /// Yaw about +Y recovered from the basis, normalised to `[0, 2π)`.
    pub fn heading(&self) -> f64 {
        // basis · (1, 0, 0) = (cos h, 0, −sin h)
        normalize_heading((-self.basis[2][0]).atan2(self.basis[0][0]))
    }
}
