//! # Polygon
//!
//! Convex planar polygons carrying the input face they were carved from.
//! Splitting a polygon keeps its face origin and tags every new corner as
//! introduced.

use super::plane::{Plane, Side};
use super::vertex::Vertex;
use crate::mesh::FaceOrigin;
use config::constants::PLANE_EPSILON;
use glam::DVec3;

/// Where a whole polygon lies relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
    Coplanar,
    Spanning,
}

/// Output bins of [`Polygon::split`].
///
/// Coplanar polygons are binned by whether they face the same way as the
/// splitting plane.
#[derive(Debug, Default)]
pub struct Partition {
    pub coplanar_front: Vec<Polygon>,
    pub coplanar_back: Vec<Polygon>,
    pub front: Vec<Polygon>,
    pub back: Vec<Polygon>,
}

impl Partition {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            coplanar_front: Vec::new(),
            coplanar_back: Vec::new(),
            front: Vec::with_capacity(capacity),
            back: Vec::with_capacity(capacity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
    origin: FaceOrigin,
}

impl Polygon {
    /// Builds a polygon from corners in counter-clockwise order, or `None`
    /// if they enclose no area.
    pub fn from_vertices(vertices: Vec<Vertex>, origin: FaceOrigin) -> Option<Self> {
        let plane = area_plane(&vertices)?;
        Some(Self {
            vertices,
            plane,
            origin,
        })
    }

    /// A sub-polygon of `self`. It keeps the parent plane so repeated
    /// splits do not drift.
    fn piece(&self, vertices: Vec<Vertex>) -> Option<Self> {
        area_plane(&vertices)?;
        Some(Self {
            vertices,
            plane: self.plane,
            origin: self.origin,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn origin(&self) -> FaceOrigin {
        self.origin
    }

    /// The same polygon facing the other way.
    pub fn flip(&self) -> Self {
        Self {
            vertices: self.vertices.iter().rev().copied().collect(),
            plane: self.plane.flipped(),
            origin: self.origin,
        }
    }

    /// Moves every corner by `delta`; corners keep their origins.
    pub fn translate(&mut self, delta: DVec3) {
        for v in &mut self.vertices {
            v.pos += delta;
        }
        self.plane = self.plane.translated(delta);
    }

    pub fn placement(&self, plane: &Plane) -> Placement {
        let (front, back) = self
            .vertices
            .iter()
            .fold((false, false), |(front, back), v| match plane.side(v.pos) {
                Side::Front => (true, back),
                Side::Back => (front, true),
                Side::On => (front, back),
            });
        match (front, back) {
            (true, true) => Placement::Spanning,
            (true, false) => Placement::Front,
            (false, true) => Placement::Back,
            (false, false) => Placement::Coplanar,
        }
    }

    /// Sorts `self` into `out` by `plane`, cutting it in two if it spans
    /// the plane. Slivers left by a cut are discarded.
    pub fn split(self, plane: &Plane, out: &mut Partition) {
        match self.placement(plane) {
            Placement::Front => out.front.push(self),
            Placement::Back => out.back.push(self),
            Placement::Coplanar if self.plane.normal().dot(plane.normal()) > 0.0 => {
                out.coplanar_front.push(self)
            }
            Placement::Coplanar => out.coplanar_back.push(self),
            Placement::Spanning => {
                let mut front = Vec::with_capacity(self.vertices.len() + 1);
                let mut back = Vec::with_capacity(self.vertices.len() + 1);

                let next = self.vertices.iter().cycle().skip(1);
                for (a, b) in self.vertices.iter().zip(next) {
                    let (side_a, side_b) = (plane.side(a.pos), plane.side(b.pos));
                    match side_a {
                        Side::Front => front.push(*a),
                        Side::Back => back.push(*a),
                        Side::On => {
                            front.push(*a);
                            back.push(*a);
                        }
                    }
                    if matches!(
                        (side_a, side_b),
                        (Side::Front, Side::Back) | (Side::Back, Side::Front)
                    ) {
                        let (da, db) = (plane.distance(a.pos), plane.distance(b.pos));
                        let crossing = a.lerp(b, da / (da - db));
                        front.push(crossing);
                        back.push(crossing);
                    }
                }

                out.front.extend(self.piece(front));
                out.back.extend(self.piece(back));
            }
        }
    }

    /// Whether `point` lies on this polygon, boundary included.
    pub fn contains_point(&self, point: DVec3) -> bool {
        if self.plane.distance(point).abs() > PLANE_EPSILON {
            return false;
        }

        let normal = self.plane.normal();
        let next = self.vertices.iter().cycle().skip(1);
        self.vertices.iter().zip(next).all(|(a, b)| {
            let edge = b.pos - a.pos;
            let length = edge.length();
            length <= PLANE_EPSILON
                || normal.cross(edge).dot(point - a.pos) / length >= -PLANE_EPSILON
        })
    }
}

fn area_plane(vertices: &[Vertex]) -> Option<Plane> {
    let positions: Vec<DVec3> = vertices.iter().map(|v| v.pos).collect();
    Plane::through(&positions)
}
