//! # Kernel Meshes
//!
//! Input and output mesh representations exchanged with the kernel, plus
//! the role and origin tags attached to every output mesh, vertex and face.

use glam::DVec3;
use std::fmt;

// =============================================================================
// INPUT
// =============================================================================

/// One of the two meshes taking part in a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// The mesh being cut.
    Source,
    /// The mesh doing the cutting.
    Cut,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Source => f.write_str("source"),
            Operand::Cut => f.write_str("cut"),
        }
    }
}

/// A polygonal input mesh in flat-array form.
///
/// Face `i` references `face_sizes[i]` consecutive entries of
/// `face_indices`. Structural consistency (sizes, index ranges) is checked
/// by the caller before the mesh reaches the kernel.
#[derive(Debug, Clone)]
pub struct InputMesh<'a> {
    /// Vertex positions.
    pub vertices: Vec<DVec3>,
    /// Concatenated per-face vertex indices.
    pub face_indices: &'a [u32],
    /// Number of vertices of each face.
    pub face_sizes: &'a [u32],
}

impl<'a> InputMesh<'a> {
    /// Creates an input mesh.
    pub fn new(vertices: Vec<DVec3>, face_indices: &'a [u32], face_sizes: &'a [u32]) -> Self {
        Self {
            vertices,
            face_indices,
            face_sizes,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_sizes.len()
    }

    /// Iterates over the faces as index slices.
    pub fn faces(&self) -> impl Iterator<Item = &'a [u32]> + '_ {
        let indices = self.face_indices;
        self.face_sizes.iter().scan(0usize, move |offset, &size| {
            let start = *offset;
            *offset += size as usize;
            indices.get(start..*offset)
        })
    }
}

// =============================================================================
// ROLES
// =============================================================================

/// Which side of the cut mesh a fragment lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentSide {
    /// Outside the cut mesh (the side its normals point to).
    Above,
    /// Inside the cut mesh.
    Below,
}

/// Which patch closes a fragment's opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sealing {
    /// Sealed with the part of the cut mesh inside the source mesh.
    Inside,
    /// Sealed with the part of the cut mesh outside the source mesh.
    Outside,
    /// Left open.
    Unsealed,
}

/// Whether a patch lies inside or outside the source mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchSide {
    /// Cut-mesh polygons enclosed by the source mesh.
    Inside,
    /// Cut-mesh polygons outside the source mesh.
    Outside,
}

/// The role an output mesh plays in the result of a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshRole {
    /// A piece of the source mesh, optionally sealed with a patch.
    Fragment {
        /// Side of the cut mesh.
        side: FragmentSide,
        /// Patch used to close the piece.
        sealing: Sealing,
    },
    /// A piece of the cut mesh.
    Patch {
        /// Side of the source mesh.
        side: PatchSide,
    },
    /// An input mesh partitioned along the intersection curve.
    Seam {
        /// Mesh that was partitioned.
        operand: Operand,
    },
    /// An input mesh echoed back, possibly re-triangulated.
    Input {
        /// Mesh that was echoed.
        operand: Operand,
    },
}

// =============================================================================
// ORIGINS
// =============================================================================

/// Where an output vertex came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexOrigin {
    /// Vertex `n` of the source mesh.
    Source(u32),
    /// Vertex `n` of the cut mesh.
    Cut(u32),
    /// Created by the kernel while splitting polygons.
    Introduced,
}

impl VertexOrigin {
    /// Returns true for vertices created by the kernel.
    #[inline]
    pub fn is_introduced(self) -> bool {
        matches!(self, VertexOrigin::Introduced)
    }
}

/// The input face an output face was carved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceOrigin {
    /// Face `n` of the source mesh.
    Source(u32),
    /// Face `n` of the cut mesh.
    Cut(u32),
}

impl FaceOrigin {
    /// Returns the mesh the face belongs to.
    #[inline]
    pub fn operand(self) -> Operand {
        match self {
            FaceOrigin::Source(_) => Operand::Source,
            FaceOrigin::Cut(_) => Operand::Cut,
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// An indexed polygon mesh produced by the kernel.
///
/// Faces are stored flat: face `i` references `face_sizes[i]` consecutive
/// entries of `face_indices`. Every per-vertex vector has one entry per
/// position and every per-face vector one entry per face.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelMesh {
    /// Role of this mesh in the cut result.
    pub role: MeshRole,
    /// Vertex positions.
    pub positions: Vec<DVec3>,
    /// Origin of each vertex.
    pub vertex_origins: Vec<VertexOrigin>,
    /// Strictly increasing indices of vertices lying on the intersection curve.
    pub seam_vertices: Vec<u32>,
    /// Concatenated per-face vertex indices.
    pub face_indices: Vec<u32>,
    /// Number of vertices of each face.
    pub face_sizes: Vec<u32>,
    /// Origin of each face.
    pub face_origins: Vec<FaceOrigin>,
}

impl KernelMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_sizes.len()
    }

    /// Iterates over the faces as index slices.
    pub fn faces(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.face_sizes.iter().scan(0usize, move |offset, &size| {
            let start = *offset;
            *offset += size as usize;
            self.face_indices.get(start..*offset)
        })
    }
}
