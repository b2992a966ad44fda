//! # Wire Types
//!
//! Single-valued enumerations exchanged with clients: component type tags,
//! role metadata, data selectors and info queries. Discriminants are the
//! values clients see.

use crate::error::{Error, Result};

/// Kind of a connected component.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Fragment = 1 << 0,
    Patch = 1 << 2,
    Seam = 1 << 3,
    Input = 1 << 4,
}

/// Where a fragment lies relative to the cut mesh.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentLocation {
    Above = 1 << 0,
    Below = 1 << 1,
    Undefined = 1 << 2,
}

/// Whether a fragment's opening is closed.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SealType {
    Complete = 1 << 0,
    None = 1 << 2,
}

/// Where a patch lies relative to the source mesh.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchLocation {
    Inside = 1 << 0,
    Outside = 1 << 1,
    Undefined = 1 << 2,
}

/// Which input mesh a seam or input component was derived from.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    SourceMesh = 1 << 0,
    CutMesh = 1 << 1,
}

/// Names exactly one logical array (or metadata value) of a component.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataField {
    /// Vertex coordinates narrowed to `f32`, three per vertex.
    VertexFloat = 1 << 0,
    /// Vertex coordinates as `f64`, three per vertex.
    VertexDouble = 1 << 1,
    Face = 1 << 2,
    FaceSize = 1 << 3,
    /// Unique undirected edges, two vertex indices each.
    Edge = 1 << 4,
    Type = 1 << 5,
    FragmentLocation = 1 << 6,
    PatchLocation = 1 << 7,
    FragmentSealType = 1 << 8,
    SeamVertex = 1 << 9,
    Origin = 1 << 10,
    VertexMap = 1 << 11,
    FaceMap = 1 << 12,
    FaceAdjacentFace = 1 << 13,
    FaceAdjacentFaceSize = 1 << 14,
    /// Fan triangulation of every face, three vertex indices per triangle.
    FaceTriangulation = 1 << 15,
}

impl TryFrom<u32> for DataField {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        const FIELDS: [DataField; 16] = [
            DataField::VertexFloat,
            DataField::VertexDouble,
            DataField::Face,
            DataField::FaceSize,
            DataField::Edge,
            DataField::Type,
            DataField::FragmentLocation,
            DataField::PatchLocation,
            DataField::FragmentSealType,
            DataField::SeamVertex,
            DataField::Origin,
            DataField::VertexMap,
            DataField::FaceMap,
            DataField::FaceAdjacentFace,
            DataField::FaceAdjacentFaceSize,
            DataField::FaceTriangulation,
        ];
        FIELDS
            .into_iter()
            .find(|field| *field as u32 == value)
            .ok_or_else(|| Error::invalid_value(format!("unrecognized data selector {value:#x}")))
    }
}

/// Context properties readable through `get_info`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoQuery {
    /// Flags the context was created with.
    ContextFlags = 1 << 0,
    /// Flags of the most recent successful dispatch (0 before any).
    DispatchFlags = 1 << 1,
    /// Worker threads owned by the context (0 when scheduling inline).
    WorkerCount = 1 << 2,
}

impl TryFrom<u32> for InfoQuery {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            v if v == InfoQuery::ContextFlags as u32 => Ok(InfoQuery::ContextFlags),
            v if v == InfoQuery::DispatchFlags as u32 => Ok(InfoQuery::DispatchFlags),
            v if v == InfoQuery::WorkerCount as u32 => Ok(InfoQuery::WorkerCount),
            _ => Err(Error::invalid_value(format!("unrecognized info query {value:#x}"))),
        }
    }
}
