//! # Plane
//!
//! Oriented planes in Hessian normal form, `normal · p = offset`. The front
//! half-space is the one the normal points into.

use config::constants::{EPSILON, PLANE_EPSILON};
use glam::DVec3;

/// Side of a plane a point falls on, within [`PLANE_EPSILON`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: DVec3,
    offset: f64,
}

impl Plane {
    /// `normal` must be unit length.
    pub fn new(normal: DVec3, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Plane of a planar polygon, oriented by its winding.
    ///
    /// Uses Newell's normal so collinear leading corners do not matter.
    /// Returns `None` when the polygon encloses no area.
    pub fn through(points: &[DVec3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let next = points.iter().cycle().skip(1);
        let (normal, sum) = points.iter().zip(next).fold(
            (DVec3::ZERO, DVec3::ZERO),
            |(n, sum), (a, b)| {
                let term = DVec3::new(
                    (a.y - b.y) * (a.z + b.z),
                    (a.z - b.z) * (a.x + b.x),
                    (a.x - b.x) * (a.y + b.y),
                );
                (n + term, sum + *a)
            },
        );

        let area2 = normal.length();
        if area2 < EPSILON {
            return None;
        }
        let normal = normal / area2;
        let centroid = sum / points.len() as f64;
        Some(Self::new(normal, normal.dot(centroid)))
    }

    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Same plane, opposite orientation.
    pub fn flipped(&self) -> Self {
        Self::new(-self.normal, -self.offset)
    }

    /// Same orientation, moved by `delta`.
    pub fn translated(&self, delta: DVec3) -> Self {
        Self::new(self.normal, self.offset + self.normal.dot(delta))
    }

    /// Signed distance of `point`; positive in front.
    pub fn distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.offset
    }

    pub fn side(&self, point: DVec3) -> Side {
        match self.distance(point) {
            d if d > PLANE_EPSILON => Side::Front,
            d if d < -PLANE_EPSILON => Side::Back,
            _ => Side::On,
        }
    }
}
