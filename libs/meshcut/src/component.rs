//! # Connected Components
//!
//! One output mesh of a dispatch together with its role metadata. The kind
//! and metadata are fixed when the component is created.

use crate::array_mesh::{ArrayMesh, FieldData};
use crate::error::{Error, Result};
use crate::types::{
    ComponentType, DataField, FragmentLocation, Origin, PatchLocation, SealType,
};
use meshcut_kernel::{FragmentSide, MeshRole, Operand, PatchSide, Sealing};

/// Role metadata of a component, one shape per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A piece of the source mesh.
    Fragment {
        location: FragmentLocation,
        seal: SealType,
        /// Patch used to seal the fragment, `Undefined` when unsealed.
        patch_location: PatchLocation,
    },
    /// A piece of the cut mesh.
    Patch { location: PatchLocation },
    /// An input mesh partitioned along the intersection curve.
    Seam { origin: Origin },
    /// An input mesh echoed back.
    Input { origin: Origin },
}

impl ComponentKind {
    /// Type tag of this kind.
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentKind::Fragment { .. } => ComponentType::Fragment,
            ComponentKind::Patch { .. } => ComponentType::Patch,
            ComponentKind::Seam { .. } => ComponentType::Seam,
            ComponentKind::Input { .. } => ComponentType::Input,
        }
    }
}

fn origin(operand: Operand) -> Origin {
    match operand {
        Operand::Source => Origin::SourceMesh,
        Operand::Cut => Origin::CutMesh,
    }
}

impl From<MeshRole> for ComponentKind {
    fn from(role: MeshRole) -> Self {
        match role {
            MeshRole::Fragment { side, sealing } => {
                let location = match side {
                    FragmentSide::Above => FragmentLocation::Above,
                    FragmentSide::Below => FragmentLocation::Below,
                };
                let (seal, patch_location) = match sealing {
                    Sealing::Inside => (SealType::Complete, PatchLocation::Inside),
                    Sealing::Outside => (SealType::Complete, PatchLocation::Outside),
                    Sealing::Unsealed => (SealType::None, PatchLocation::Undefined),
                };
                ComponentKind::Fragment {
                    location,
                    seal,
                    patch_location,
                }
            }
            MeshRole::Patch { side } => ComponentKind::Patch {
                location: match side {
                    PatchSide::Inside => PatchLocation::Inside,
                    PatchSide::Outside => PatchLocation::Outside,
                },
            },
            MeshRole::Seam { operand } => ComponentKind::Seam {
                origin: origin(operand),
            },
            MeshRole::Input { operand } => ComponentKind::Input {
                origin: origin(operand),
            },
        }
    }
}

/// An output mesh owned by exactly one context.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    kind: ComponentKind,
    mesh: ArrayMesh,
}

impl ConnectedComponent {
    pub fn new(kind: ComponentKind, mesh: ArrayMesh) -> Self {
        Self { kind, mesh }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    pub fn mesh(&self) -> &ArrayMesh {
        &self.mesh
    }

    /// Returns the data named by `field`.
    ///
    /// Optional arrays that were not produced (vertex or face maps) are
    /// empty. Metadata the component's kind does not carry is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for metadata not carried by this kind.
    pub fn field(&self, field: DataField) -> Result<FieldData<'_>> {
        let mesh = &self.mesh;
        let missing = || {
            Error::invalid_value(format!(
                "{field:?} is not defined for {:?} components",
                self.component_type()
            ))
        };

        Ok(match field {
            DataField::VertexFloat => FieldData::Floats(&mesh.vertices),
            DataField::VertexDouble => FieldData::Doubles(&mesh.vertices),
            DataField::Face => FieldData::Indices(&mesh.faces),
            DataField::FaceSize => FieldData::Indices(&mesh.face_sizes),
            DataField::Edge => FieldData::Indices(&mesh.edges),
            DataField::SeamVertex => FieldData::Indices(&mesh.seam_vertices),
            DataField::VertexMap => FieldData::Indices(mesh.vertex_map.as_deref().unwrap_or(&[])),
            DataField::FaceMap => FieldData::Indices(mesh.face_map.as_deref().unwrap_or(&[])),
            DataField::FaceAdjacentFace => FieldData::Indices(&mesh.face_adjacency),
            DataField::FaceAdjacentFaceSize => FieldData::Indices(&mesh.face_adjacency_sizes),
            DataField::FaceTriangulation => FieldData::Indices(&mesh.triangulation),
            DataField::Type => FieldData::Scalar(self.component_type() as u32),
            DataField::FragmentLocation => match self.kind {
                ComponentKind::Fragment { location, .. } => FieldData::Scalar(location as u32),
                _ => return Err(missing()),
            },
            DataField::FragmentSealType => match self.kind {
                ComponentKind::Fragment { seal, .. } => FieldData::Scalar(seal as u32),
                _ => return Err(missing()),
            },
            DataField::PatchLocation => match self.kind {
                ComponentKind::Fragment { patch_location, .. } => {
                    FieldData::Scalar(patch_location as u32)
                }
                ComponentKind::Patch { location } => FieldData::Scalar(location as u32),
                _ => return Err(missing()),
            },
            DataField::Origin => match self.kind {
                ComponentKind::Seam { origin } | ComponentKind::Input { origin } => {
                    FieldData::Scalar(origin as u32)
                }
                _ => return Err(missing()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn component(role: MeshRole) -> ConnectedComponent {
        ConnectedComponent::new(role.into(), ArrayMesh::default())
    }

    #[test]
    fn test_fragment_metadata() {
        let c = component(MeshRole::Fragment {
            side: FragmentSide::Below,
            sealing: Sealing::Outside,
        });

        assert_eq!(c.component_type(), ComponentType::Fragment);
        assert_eq!(c.field(DataField::Type).unwrap(), FieldData::Scalar(1));
        assert_eq!(
            c.field(DataField::FragmentLocation).unwrap(),
            FieldData::Scalar(FragmentLocation::Below as u32)
        );
        assert_eq!(
            c.field(DataField::FragmentSealType).unwrap(),
            FieldData::Scalar(SealType::Complete as u32)
        );
        assert_eq!(
            c.field(DataField::PatchLocation).unwrap(),
            FieldData::Scalar(PatchLocation::Outside as u32)
        );
        assert_eq!(
            c.field(DataField::Origin).unwrap_err().kind(),
            ErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_unsealed_fragment_has_undefined_patch_location() {
        let c = component(MeshRole::Fragment {
            side: FragmentSide::Above,
            sealing: Sealing::Unsealed,
        });
        assert_eq!(
            c.kind(),
            ComponentKind::Fragment {
                location: FragmentLocation::Above,
                seal: SealType::None,
                patch_location: PatchLocation::Undefined,
            }
        );
    }

    #[test]
    fn test_seam_and_input_origin() {
        let seam = component(MeshRole::Seam {
            operand: Operand::Cut,
        });
        let input = component(MeshRole::Input {
            operand: Operand::Source,
        });

        assert_eq!(
            seam.field(DataField::Origin).unwrap(),
            FieldData::Scalar(Origin::CutMesh as u32)
        );
        assert_eq!(
            input.field(DataField::Origin).unwrap(),
            FieldData::Scalar(Origin::SourceMesh as u32)
        );
        assert!(seam.field(DataField::FragmentLocation).is_err());
        assert!(input.field(DataField::PatchLocation).is_err());
    }

    #[test]
    fn test_patch_metadata() {
        let patch = component(MeshRole::Patch {
            side: PatchSide::Inside,
        });
        assert_eq!(patch.field(DataField::Type).unwrap(), FieldData::Scalar(4));
        assert_eq!(
            patch.field(DataField::PatchLocation).unwrap(),
            FieldData::Scalar(PatchLocation::Inside as u32)
        );
        assert!(patch.field(DataField::FragmentSealType).is_err());
    }

    #[test]
    fn test_missing_maps_are_empty() {
        let c = component(MeshRole::Patch {
            side: PatchSide::Outside,
        });
        assert_eq!(c.field(DataField::VertexMap).unwrap().byte_len(), 0);
        assert_eq!(c.field(DataField::FaceMap).unwrap().byte_len(), 0);
    }
}
