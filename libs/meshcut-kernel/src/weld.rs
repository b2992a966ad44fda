//! # Welding
//!
//! Turns the polygon soups produced by clipping into indexed meshes,
//! marks seam vertices and splits meshes into connected pieces.

use crate::geometry::Polygon;
use crate::mesh::{FaceOrigin, KernelMesh, MeshRole, VertexOrigin};
use config::constants::{UNDEFINED_INDEX, VERTEX_MERGE_EPSILON};
use glam::DVec3;
use std::collections::HashMap;

// =============================================================================
// SURFACES
// =============================================================================

/// The surface of one operand, used to decide which introduced vertices lie
/// on the intersection curve.
pub(crate) struct Surface<'a> {
    polygons: &'a [Polygon],
}

impl<'a> Surface<'a> {
    pub(crate) fn new(polygons: &'a [Polygon]) -> Self {
        Self { polygons }
    }

    /// Returns true if `point` lies on any polygon of the surface.
    pub(crate) fn contains(&self, point: DVec3) -> bool {
        self.polygons.iter().any(|p| p.contains_point(point))
    }
}

// =============================================================================
// WELDING
// =============================================================================

fn weld_key(p: DVec3) -> [i64; 3] {
    let q = (p / VERTEX_MERGE_EPSILON).round();
    [q.x as i64, q.y as i64, q.z as i64]
}

/// Welds `polygons` into an indexed mesh.
///
/// Positions closer than the merge tolerance share one vertex; a vertex
/// inherited from an input mesh wins over one introduced by splitting.
/// Faces collapsing to fewer than three distinct vertices are dropped, and
/// so are vertices no face references. Introduced vertices lying on both
/// surfaces are recorded as seam vertices.
pub(crate) fn weld(
    role: MeshRole,
    polygons: &[Polygon],
    source: &Surface<'_>,
    cut: &Surface<'_>,
) -> KernelMesh {
    let mut keys: HashMap<[i64; 3], usize> = HashMap::new();
    let mut positions: Vec<DVec3> = Vec::new();
    let mut origins: Vec<VertexOrigin> = Vec::new();
    let mut faces: Vec<(Vec<usize>, FaceOrigin)> = Vec::with_capacity(polygons.len());

    for polygon in polygons {
        let mut face: Vec<usize> = Vec::with_capacity(polygon.vertices().len());
        for v in polygon.vertices() {
            let index = *keys.entry(weld_key(v.pos)).or_insert_with(|| {
                positions.push(v.pos);
                origins.push(v.origin);
                positions.len() - 1
            });
            if origins[index].is_introduced() && !v.origin.is_introduced() {
                origins[index] = v.origin;
            }
            if face.last() != Some(&index) {
                face.push(index);
            }
        }
        while face.len() > 1 && face.first() == face.last() {
            face.pop();
        }

        let mut distinct = face.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() >= 3 {
            faces.push((face, polygon.origin()));
        }
    }

    let mut mesh = KernelMesh {
        role,
        positions: Vec::new(),
        vertex_origins: Vec::new(),
        seam_vertices: Vec::new(),
        face_indices: Vec::new(),
        face_sizes: Vec::with_capacity(faces.len()),
        face_origins: Vec::with_capacity(faces.len()),
    };
    let mut remap = vec![UNDEFINED_INDEX; positions.len()];

    for (face, origin) in &faces {
        for &i in face {
            if remap[i] == UNDEFINED_INDEX {
                remap[i] = mesh.positions.len() as u32;
                mesh.positions.push(positions[i]);
                mesh.vertex_origins.push(origins[i]);
            }
            mesh.face_indices.push(remap[i]);
        }
        mesh.face_sizes.push(face.len() as u32);
        mesh.face_origins.push(*origin);
    }

    mesh.seam_vertices = mesh
        .positions
        .iter()
        .zip(&mesh.vertex_origins)
        .enumerate()
        .filter(|&(_, (&p, origin))| {
            origin.is_introduced() && source.contains(p) && cut.contains(p)
        })
        .map(|(i, _)| i as u32)
        .collect();

    mesh
}

// =============================================================================
// CONNECTED PIECES
// =============================================================================

/// Union-find over vertex indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Splits a mesh into its vertex-connected pieces.
///
/// Pieces are ordered by their first face; within a piece faces and
/// vertices keep their relative order. A mesh without faces yields nothing.
pub(crate) fn split_connected(mesh: KernelMesh) -> Vec<KernelMesh> {
    let mut sets = DisjointSet::new(mesh.vertex_count());
    for face in mesh.faces() {
        for pair in face.windows(2) {
            sets.union(pair[0] as usize, pair[1] as usize);
        }
    }

    let mut piece_of_root: HashMap<usize, usize> = HashMap::new();
    let mut pieces: Vec<Vec<usize>> = Vec::new();
    for (f, face) in mesh.faces().enumerate() {
        let root = sets.find(face[0] as usize);
        let piece = *piece_of_root.entry(root).or_insert_with(|| {
            pieces.push(Vec::new());
            pieces.len() - 1
        });
        pieces[piece].push(f);
    }

    match pieces.len() {
        0 => Vec::new(),
        1 => vec![mesh],
        _ => {
            let offsets: Vec<usize> = mesh
                .face_sizes
                .iter()
                .scan(0usize, |offset, &size| {
                    let start = *offset;
                    *offset += size as usize;
                    Some(start)
                })
                .collect();
            pieces
                .iter()
                .map(|faces| extract(&mesh, &offsets, faces))
                .collect()
        }
    }
}

fn extract(mesh: &KernelMesh, offsets: &[usize], faces: &[usize]) -> KernelMesh {
    let mut seam = vec![false; mesh.vertex_count()];
    for &v in &mesh.seam_vertices {
        seam[v as usize] = true;
    }

    let mut piece = KernelMesh {
        role: mesh.role,
        positions: Vec::new(),
        vertex_origins: Vec::new(),
        seam_vertices: Vec::new(),
        face_indices: Vec::new(),
        face_sizes: Vec::with_capacity(faces.len()),
        face_origins: Vec::with_capacity(faces.len()),
    };
    let mut remap = vec![UNDEFINED_INDEX; mesh.vertex_count()];

    for &f in faces {
        let size = mesh.face_sizes[f];
        let start = offsets[f];
        for &v in &mesh.face_indices[start..start + size as usize] {
            let v = v as usize;
            if remap[v] == UNDEFINED_INDEX {
                remap[v] = piece.positions.len() as u32;
                piece.positions.push(mesh.positions[v]);
                piece.vertex_origins.push(mesh.vertex_origins[v]);
                if seam[v] {
                    piece.seam_vertices.push(remap[v]);
                }
            }
            piece.face_indices.push(remap[v]);
        }
        piece.face_sizes.push(size);
        piece.face_origins.push(mesh.face_origins[f]);
    }

    piece
}
