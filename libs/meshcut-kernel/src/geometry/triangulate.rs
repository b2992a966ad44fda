//! # Ear Clipping
//!
//! Triangulation of simple faces that may be concave or slightly bent.
//! The face is projected onto the coordinate plane its normal is most
//! aligned with, and ears are cut using the exact `orient2d` predicate.

use super::plane::Plane;
use glam::DVec3;
use robust::{orient2d, Coord};

type Point2 = (f64, f64);

/// Signed doubled area of the triangle `abc`, exact in sign.
fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    orient2d(
        Coord { x: a.0, y: a.1 },
        Coord { x: b.0, y: b.1 },
        Coord { x: c.0, y: c.1 },
    )
}

/// Drops the coordinate `normal` is dominated by.
fn project(points: &[DVec3], normal: DVec3) -> Vec<Point2> {
    let n = normal.abs();
    points
        .iter()
        .map(|p| {
            if n.z >= n.x && n.z >= n.y {
                (p.x, p.y)
            } else if n.x >= n.y {
                (p.y, p.z)
            } else {
                (p.z, p.x)
            }
        })
        .collect()
}

/// Returns true if the corner at `ring[i]` can be cut off.
fn is_ear(flat: &[Point2], ring: &[usize], i: usize, winding: f64) -> bool {
    let m = ring.len();
    let (prev, cur, next) = (ring[(i + m - 1) % m], ring[i], ring[(i + 1) % m]);
    let (a, b, c) = (flat[prev], flat[cur], flat[next]);
    if orient(a, b, c) * winding <= 0.0 {
        return false;
    }

    ring.iter()
        .filter(|&&j| j != prev && j != cur && j != next)
        .map(|&j| flat[j])
        .filter(|&p| p != a && p != b && p != c)
        .all(|p| {
            orient(a, b, p) * winding < 0.0
                || orient(b, c, p) * winding < 0.0
                || orient(c, a, p) * winding < 0.0
        })
}

/// Splits a simple polygon into triangles of indices into `points`.
///
/// Triangles keep the winding of the input ring. Returns `None` if the
/// polygon has no area or cannot be clipped (self-intersecting rings).
pub fn ear_clip(points: &[DVec3]) -> Option<Vec<[usize; 3]>> {
    let plane = Plane::through(points)?;
    let flat = project(points, plane.normal());
    let n = flat.len();

    let area: f64 = (0..n)
        .map(|i| {
            let (a, b) = (flat[i], flat[(i + 1) % n]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum();
    if area == 0.0 {
        return None;
    }
    let winding = area.signum();

    let mut ring: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n.saturating_sub(2));
    while ring.len() > 3 {
        let m = ring.len();
        if let Some(i) = (0..m).find(|&i| is_ear(&flat, &ring, i, winding)) {
            triangles.push([ring[(i + m - 1) % m], ring[i], ring[(i + 1) % m]]);
            ring.remove(i);
            continue;
        }

        // Straight corners cover no area and can be skipped.
        let straight = (0..m).find(|&i| {
            orient(flat[ring[(i + m - 1) % m]], flat[ring[i]], flat[ring[(i + 1) % m]]) == 0.0
        })?;
        ring.remove(straight);
    }

    if orient(flat[ring[0]], flat[ring[1]], flat[ring[2]]) * winding > 0.0 {
        triangles.push([ring[0], ring[1], ring[2]]);
    }
    (!triangles.is_empty()).then_some(triangles)
}
