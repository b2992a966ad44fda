//! # ArrayMesh
//!
//! Flat-array export form of one output mesh, and the byte-level copy
//! protocol used to hand its arrays to clients.

use crate::error::Result;
use config::constants::{COORDS_PER_VERTEX, UNDEFINED_INDEX};
use meshcut_kernel::{FaceOrigin, KernelMesh, VertexOrigin};
use std::collections::HashMap;

/// Allocates an empty vector able to hold `len` elements without growing.
fn reserved<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    Ok(v)
}

// =============================================================================
// MAP LAYOUT
// =============================================================================

/// How vertex and face maps are filled.
///
/// Cut-mesh entries are offset by the source mesh's counts so a single
/// index space covers both inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapLayout {
    pub vertex_map: bool,
    pub face_map: bool,
    pub source_vertex_count: u32,
    pub source_face_count: u32,
}

impl MapLayout {
    fn vertex(&self, origin: VertexOrigin) -> u32 {
        match origin {
            VertexOrigin::Source(i) => i,
            VertexOrigin::Cut(i) => self.source_vertex_count + i,
            VertexOrigin::Introduced => UNDEFINED_INDEX,
        }
    }

    fn face(&self, origin: FaceOrigin) -> u32 {
        match origin {
            FaceOrigin::Source(f) => f,
            FaceOrigin::Cut(f) => self.source_face_count + f,
        }
    }
}

// =============================================================================
// ARRAY MESH
// =============================================================================

/// One output mesh as parallel flat arrays.
///
/// Every count is implied by an array length and every index refers into
/// this mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayMesh {
    /// Vertex coordinates, three per vertex.
    pub vertices: Vec<f64>,
    /// Concatenated per-face vertex indices.
    pub faces: Vec<u32>,
    /// Vertex count of each face.
    pub face_sizes: Vec<u32>,
    /// Unique undirected edges, two vertex indices each.
    pub edges: Vec<u32>,
    /// Concatenated per-face lists of faces sharing an edge.
    pub face_adjacency: Vec<u32>,
    /// Length of each face's adjacency list.
    pub face_adjacency_sizes: Vec<u32>,
    /// Strictly increasing indices of vertices on the intersection curve.
    pub seam_vertices: Vec<u32>,
    /// Input vertex of each vertex, when requested.
    pub vertex_map: Option<Vec<u32>>,
    /// Input face of each face, when requested.
    pub face_map: Option<Vec<u32>>,
    /// Fan triangulation of every face. Kernel faces are convex.
    pub triangulation: Vec<u32>,
}

impl ArrayMesh {
    /// Builds the flat arrays for a kernel mesh.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfMemory`] if any array cannot be
    /// allocated.
    pub fn from_kernel_mesh(mesh: &KernelMesh, layout: MapLayout) -> Result<Self> {
        let mut vertices = reserved(mesh.vertex_count() * COORDS_PER_VERTEX)?;
        vertices.extend(mesh.positions.iter().flat_map(|p| p.to_array()));

        let mut faces = reserved(mesh.face_indices.len())?;
        faces.extend_from_slice(&mesh.face_indices);
        let mut face_sizes = reserved(mesh.face_count())?;
        face_sizes.extend_from_slice(&mesh.face_sizes);
        let mut seam_vertices = reserved(mesh.seam_vertices.len())?;
        seam_vertices.extend_from_slice(&mesh.seam_vertices);

        let vertex_map = if layout.vertex_map {
            let mut map = reserved(mesh.vertex_count())?;
            map.extend(mesh.vertex_origins.iter().map(|&o| layout.vertex(o)));
            Some(map)
        } else {
            None
        };
        let face_map = if layout.face_map {
            let mut map = reserved(mesh.face_count())?;
            map.extend(mesh.face_origins.iter().map(|&o| layout.face(o)));
            Some(map)
        } else {
            None
        };

        let (edges, face_adjacency, face_adjacency_sizes) = connectivity(mesh)?;

        let triangle_count: usize = mesh
            .face_sizes
            .iter()
            .map(|&s| (s as usize).saturating_sub(2))
            .sum();
        let mut triangulation = reserved(triangle_count * 3)?;
        for face in mesh.faces() {
            for i in 1..face.len().saturating_sub(1) {
                triangulation.extend_from_slice(&[face[0], face[i], face[i + 1]]);
            }
        }

        let array = Self {
            vertices,
            faces,
            face_sizes,
            edges,
            face_adjacency,
            face_adjacency_sizes,
            seam_vertices,
            vertex_map,
            face_map,
            triangulation,
        };
        debug_assert!(array.is_consistent(), "kernel mesh produced inconsistent arrays");
        Ok(array)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / COORDS_PER_VERTEX
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_sizes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Checks the structural invariants: sizes match array lengths and
    /// every index is in bounds.
    pub(crate) fn is_consistent(&self) -> bool {
        let vertex_count = self.vertex_count() as u32;
        let face_count = self.face_count() as u32;
        let sum = |sizes: &[u32]| sizes.iter().map(|&s| s as usize).sum::<usize>();

        self.vertices.len() % COORDS_PER_VERTEX == 0
            && sum(&self.face_sizes) == self.faces.len()
            && self.faces.iter().all(|&v| v < vertex_count)
            && self.edges.len() % 2 == 0
            && self.edges.iter().all(|&v| v < vertex_count)
            && self.face_adjacency_sizes.len() == self.face_count()
            && sum(&self.face_adjacency_sizes) == self.face_adjacency.len()
            && self.face_adjacency.iter().all(|&f| f < face_count)
            && self.seam_vertices.windows(2).all(|w| w[0] < w[1])
            && self.seam_vertices.iter().all(|&v| v < vertex_count)
            && self.triangulation.len() % 3 == 0
            && self.triangulation.iter().all(|&v| v < vertex_count)
            && self
                .vertex_map
                .as_ref()
                .map_or(true, |m| m.len() == self.vertex_count())
            && self
                .face_map
                .as_ref()
                .map_or(true, |m| m.len() == self.face_count())
    }
}

/// Computes unique edges and edge-sharing face adjacency.
///
/// Edges appear in order of first use; adjacency lists are ascending.
fn connectivity(mesh: &KernelMesh) -> Result<(Vec<u32>, Vec<u32>, Vec<u32>)> {
    let mut edge_ids: HashMap<(u32, u32), usize> = HashMap::new();
    let mut edge_faces: Vec<Vec<u32>> = Vec::new();
    let mut edges: Vec<u32> = Vec::new();
    let mut face_edges: Vec<Vec<usize>> = reserved(mesh.face_count())?;

    for (f, face) in mesh.faces().enumerate() {
        let mut ids = Vec::with_capacity(face.len());
        for i in 0..face.len() {
            let (a, b) = (face[i], face[(i + 1) % face.len()]);
            let key = (a.min(b), a.max(b));
            let id = *edge_ids.entry(key).or_insert_with(|| {
                edges.extend_from_slice(&[key.0, key.1]);
                edge_faces.push(Vec::new());
                edge_faces.len() - 1
            });
            if edge_faces[id].last() != Some(&(f as u32)) {
                edge_faces[id].push(f as u32);
            }
            ids.push(id);
        }
        face_edges.push(ids);
    }

    let mut adjacency = Vec::new();
    let mut adjacency_sizes = reserved(mesh.face_count())?;
    for (f, ids) in face_edges.iter().enumerate() {
        let mut neighbours: Vec<u32> = ids
            .iter()
            .flat_map(|&id| edge_faces[id].iter().copied())
            .filter(|&g| g != f as u32)
            .collect();
        neighbours.sort_unstable();
        neighbours.dedup();
        adjacency_sizes.push(neighbours.len() as u32);
        adjacency.try_reserve(neighbours.len())?;
        adjacency.extend(neighbours);
    }

    Ok((edges, adjacency, adjacency_sizes))
}

// =============================================================================
// FIELD DATA
// =============================================================================

/// A view of one extractable array, encoded as native-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldData<'a> {
    /// `f64` values copied as is.
    Doubles(&'a [f64]),
    /// `f64` values narrowed to `f32` while copying.
    Floats(&'a [f64]),
    /// Index values.
    Indices(&'a [u32]),
    /// One metadata value.
    Scalar(u32),
}

impl FieldData<'_> {
    /// Number of bytes the full array occupies.
    pub fn byte_len(&self) -> usize {
        match self {
            FieldData::Doubles(v) => v.len() * std::mem::size_of::<f64>(),
            FieldData::Floats(v) => v.len() * std::mem::size_of::<f32>(),
            FieldData::Indices(v) => v.len() * std::mem::size_of::<u32>(),
            FieldData::Scalar(_) => std::mem::size_of::<u32>(),
        }
    }

    /// Copies the leading `min(byte_len, dst.len())` bytes into `dst` and
    /// returns how many were written. A trailing element may be cut short.
    pub fn copy_into(&self, dst: &mut [u8]) -> usize {
        let mut written = 0;
        let mut push = |bytes: &[u8]| -> bool {
            let n = bytes.len().min(dst.len() - written);
            dst[written..written + n].copy_from_slice(&bytes[..n]);
            written += n;
            written < dst.len()
        };

        match self {
            FieldData::Doubles(values) => {
                for v in values.iter() {
                    if !push(&v.to_ne_bytes()) {
                        break;
                    }
                }
            }
            FieldData::Floats(values) => {
                for v in values.iter() {
                    if !push(&(*v as f32).to_ne_bytes()) {
                        break;
                    }
                }
            }
            FieldData::Indices(values) => {
                for v in values.iter() {
                    if !push(&v.to_ne_bytes()) {
                        break;
                    }
                }
            }
            FieldData::Scalar(value) => {
                push(&value.to_ne_bytes());
            }
        }

        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use meshcut_kernel::{MeshRole, Operand};

    /// Two triangles sharing the edge 1-2, plus a quad touching only at vertex 3.
    fn sample_mesh() -> KernelMesh {
        KernelMesh {
            role: MeshRole::Seam {
                operand: Operand::Source,
            },
            positions: vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(2.0, 1.0, 0.0),
                DVec3::new(2.0, 2.0, 0.0),
                DVec3::new(1.0, 2.0, 0.0),
            ],
            vertex_origins: vec![
                VertexOrigin::Source(0),
                VertexOrigin::Source(1),
                VertexOrigin::Cut(0),
                VertexOrigin::Introduced,
                VertexOrigin::Source(4),
                VertexOrigin::Source(5),
                VertexOrigin::Cut(2),
            ],
            seam_vertices: vec![3],
            face_indices: vec![0, 1, 2, 1, 3, 2, 3, 4, 5, 6],
            face_sizes: vec![3, 3, 4],
            face_origins: vec![FaceOrigin::Source(0), FaceOrigin::Cut(1), FaceOrigin::Source(2)],
        }
    }

    #[test]
    fn test_array_mesh_arrays() {
        let mesh = ArrayMesh::from_kernel_mesh(&sample_mesh(), MapLayout::default()).unwrap();

        assert_eq!(mesh.vertex_count(), 7);
        assert_eq!(mesh.face_count(), 3);
        assert_eq!(mesh.vertices[3..6], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.seam_vertices, vec![3]);
        assert!(mesh.vertex_map.is_none());
        assert!(mesh.face_map.is_none());
        assert!(mesh.is_consistent());
    }

    #[test]
    fn test_edges_are_unique() {
        let mesh = ArrayMesh::from_kernel_mesh(&sample_mesh(), MapLayout::default()).unwrap();

        // 3 + 3 + 4 half-edges, one shared pair
        assert_eq!(mesh.edge_count(), 9);
        assert_eq!(mesh.edges[..6], [0, 1, 1, 2, 0, 2]);
    }

    #[test]
    fn test_face_adjacency_shares_edges_only() {
        let mesh = ArrayMesh::from_kernel_mesh(&sample_mesh(), MapLayout::default()).unwrap();

        assert_eq!(mesh.face_adjacency_sizes, vec![1, 1, 0]);
        assert_eq!(mesh.face_adjacency, vec![1, 0]);
    }

    #[test]
    fn test_fan_triangulation() {
        let mesh = ArrayMesh::from_kernel_mesh(&sample_mesh(), MapLayout::default()).unwrap();

        assert_eq!(mesh.triangulation.len(), 4 * 3);
        assert_eq!(mesh.triangulation[6..], [3, 4, 5, 3, 5, 6]);
    }

    #[test]
    fn test_maps_offset_cut_indices() {
        let layout = MapLayout {
            vertex_map: true,
            face_map: true,
            source_vertex_count: 8,
            source_face_count: 6,
        };
        let mesh = ArrayMesh::from_kernel_mesh(&sample_mesh(), layout).unwrap();

        assert_eq!(
            mesh.vertex_map.as_deref(),
            Some(&[0, 1, 8, UNDEFINED_INDEX, 4, 5, 10][..])
        );
        assert_eq!(mesh.face_map.as_deref(), Some(&[0, 7, 2][..]));
        assert!(mesh.is_consistent());
    }

    #[test]
    fn test_field_copy_truncates() {
        let values = [1u32, 2, 3];
        let field = FieldData::Indices(&values);
        assert_eq!(field.byte_len(), 12);

        let mut small = [0u8; 6];
        assert_eq!(field.copy_into(&mut small), 6);
        assert_eq!(small[..4], 1u32.to_ne_bytes());
        assert_eq!(small[4..], 2u32.to_ne_bytes()[..2]);

        let mut large = [0xAAu8; 16];
        assert_eq!(field.copy_into(&mut large), 12);
        assert_eq!(large[12..], [0xAA; 4]);
    }

    #[test]
    fn test_field_copy_narrows_floats() {
        let values = [0.5f64, -2.0];
        let field = FieldData::Floats(&values);
        assert_eq!(field.byte_len(), 8);

        let mut out = [0u8; 8];
        field.copy_into(&mut out);
        let first = f32::from_ne_bytes([out[0], out[1], out[2], out[3]]);
        let second = f32::from_ne_bytes([out[4], out[5], out[6], out[7]]);
        approx::assert_relative_eq!(first, 0.5);
        approx::assert_relative_eq!(second, -2.0);
    }

    #[test]
    fn test_field_copy_empty_destination() {
        let mut empty: [u8; 0] = [];
        assert_eq!(FieldData::Scalar(7).copy_into(&mut empty), 0);
    }
}
