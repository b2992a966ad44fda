//! # Meshcut
//!
//! Context and resource layer of a mesh cutting library. A client creates a
//! context, dispatches a cut of a source mesh by a cut mesh, then queries
//! the resulting connected components as flat arrays.
//!
//! ## Architecture
//!
//! ```text
//! mc_* (C ABI) ─┐
//!               ├→ ContextRegistry → Context → dispatch → Kernel
//! Rust API ─────┘                       │
//!                                       └→ ComponentStore → ArrayMesh → client buffers
//! ```
//!
//! ## Components
//!
//! A dispatch produces four kinds of connected component:
//! - **Fragment**: a piece of the source mesh, located above or below the
//!   cut surface and possibly sealed by cut-mesh polygons
//! - **Patch**: a piece of the cut mesh, inside or outside the source
//! - **Seam**: a copy of one input mesh with its intersection contour
//! - **Input**: an unmodified copy of one input mesh
//!
//! ## Usage
//!
//! ```rust
//! use meshcut::{ComponentTypeFlags, ContextRegistry, DataField, DispatchFlags, MeshInput};
//!
//! // A triangle far from the cube: the meshes do not intersect
//! let cube: Vec<f64> = (0..8u32)
//!     .flat_map(|i| [(i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64])
//!     .collect();
//! let faces = [0, 2, 3, 1, 4, 5, 7, 6, 0, 1, 5, 4, 2, 6, 7, 3, 0, 4, 6, 2, 1, 3, 7, 5];
//! let triangle = [5.0, 5.0, 5.0, 6.0, 5.0, 5.0, 5.0, 6.0, 5.0];
//!
//! let registry = ContextRegistry::new();
//! let ctx = registry.create_context(0)?;
//! registry.dispatch(
//!     ctx,
//!     DispatchFlags::VERTEX_ARRAY_DOUBLE.bits(),
//!     &MeshInput::f64(&cube, &faces, &[4; 6]),
//!     &MeshInput::f64(&triangle, &[0, 1, 2], &[3]),
//! )?;
//!
//! let inputs = registry.list_components(ctx, ComponentTypeFlags::INPUT.bits())?;
//! assert_eq!(inputs.len(), 2);
//!
//! let bytes = registry.component_data(ctx, inputs[0], DataField::VertexDouble as u32, None)?;
//! assert_eq!(bytes, 8 * 3 * std::mem::size_of::<f64>());
//! # Ok::<(), meshcut::Error>(())
//! ```

pub mod array_mesh;
pub mod component;
pub mod context;
pub mod debug;
pub mod dispatch;
pub mod error;
pub mod ffi;
pub mod flags;
pub mod handle;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod types;

pub use array_mesh::{ArrayMesh, FieldData, MapLayout};
pub use component::{ComponentKind, ConnectedComponent};
pub use context::{Context, ContextConfig};
pub use debug::{message_id, DebugChannel, DebugFilter, DebugMessage, DebugSink};
pub use dispatch::{MeshInput, VertexData};
pub use error::{status, Error, ErrorKind, Result};
pub use flags::{
    ComponentTypeFlags, ContextFlags, DebugSeverity, DebugSource, DebugType, DispatchFlags,
};
pub use handle::{ComponentHandle, ContextHandle};
pub use registry::ContextRegistry;
pub use scheduler::{ScheduleMode, Scheduler};
pub use store::{ComponentStore, Publish};
pub use types::{
    ComponentType, DataField, FragmentLocation, InfoQuery, Origin, PatchLocation, SealType,
};
