//! # Exact Predicates
//!
//! Face validity checks. Degeneracy is decided with the adaptive-precision
//! `orient2d` predicate from the `robust` crate, so a face is rejected only
//! when it truly has no area.

use super::plane::Plane;
use config::constants::{EPSILON, PLANE_EPSILON};
use glam::DVec3;
use robust::{orient2d, Coord};

/// Returns true if `a`, `b` and `c` lie on a common line.
///
/// Three points are collinear in 3D exactly when their projections onto
/// the xy, yz and zx planes are all collinear.
pub fn collinear(a: DVec3, b: DVec3, c: DVec3) -> bool {
    let xy = orient2d(
        Coord { x: a.x, y: a.y },
        Coord { x: b.x, y: b.y },
        Coord { x: c.x, y: c.y },
    );
    let yz = orient2d(
        Coord { x: a.y, y: a.z },
        Coord { x: b.y, y: b.z },
        Coord { x: c.y, y: c.z },
    );
    let zx = orient2d(
        Coord { x: a.z, y: a.x },
        Coord { x: b.z, y: b.x },
        Coord { x: c.z, y: c.x },
    );
    xy == 0.0 && yz == 0.0 && zx == 0.0
}

/// Returns true if the points span no area: fewer than three distinct
/// positions, or every position on one line.
pub fn is_degenerate(points: &[DVec3]) -> bool {
    let Some(&first) = points.first() else {
        return true;
    };
    let Some(&second) = points.iter().find(|&&p| p != first) else {
        return true;
    };
    points.iter().all(|&p| collinear(first, second, p))
}

/// Returns true if the points form a planar polygon without reflex corners.
///
/// Collinear runs are accepted. Such polygons can be handed to the BSP
/// clipper as a single piece; anything else is triangulated first.
pub fn is_convex_planar(points: &[DVec3]) -> bool {
    let Some(plane) = Plane::through(points) else {
        return false;
    };
    if points
        .iter()
        .any(|&p| plane.distance(p).abs() > PLANE_EPSILON)
    {
        return false;
    }

    let n = points.len();
    (0..n).all(|i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        (b - a).cross(c - b).dot(plane.normal()) >= -EPSILON
    })
}
