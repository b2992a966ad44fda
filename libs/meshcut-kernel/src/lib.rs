//! # Meshcut Kernel
//!
//! The geometric engine behind a cutting dispatch. The runtime hands it a
//! source mesh and a cut mesh and receives a set of indexed meshes, each
//! tagged with the role it plays (fragment, patch, seam or input).
//!
//! ## Architecture
//!
//! ```text
//! InputMesh ×2 → polygons → BSP clip (par) → assemble + weld (par) → KernelMesh[]
//! ```
//!
//! ## Seams
//!
//! - [`Kernel`]: the cutting operation itself; [`BspKernel`] is the bundled
//!   implementation.
//! - [`Executor`]: how the kernel runs independent sub-tasks. The runtime
//!   supplies a worker pool or an inline executor.
//! - [`KernelLog`]: diagnostics the kernel wants forwarded to the client.
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use meshcut_kernel::{BspKernel, CutJob, CutOptions, InputMesh, Kernel, NullLog, SerialExecutor};
//!
//! let cube = |o: f64| -> Vec<DVec3> {
//!     (0..8)
//!         .map(|i| DVec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
//!         .map(|p| p + DVec3::splat(o))
//!         .collect()
//! };
//! let faces = [0, 2, 3, 1, 4, 5, 7, 6, 0, 1, 5, 4, 2, 6, 7, 3, 0, 4, 6, 2, 1, 3, 7, 5];
//! let sizes = [4, 4, 4, 4, 4, 4];
//! let source = InputMesh::new(cube(0.0), &faces, &sizes);
//! let cut = InputMesh::new(cube(0.5), &faces, &sizes);
//!
//! let job = CutJob {
//!     source: &source,
//!     cut: &cut,
//!     options: CutOptions::default(),
//!     executor: &SerialExecutor,
//!     log: &NullLog,
//! };
//! let output = BspKernel.cut(&job).unwrap();
//! assert!(output.intersected);
//! ```

pub mod cut;
pub mod error;
pub mod executor;
pub mod geometry;
pub mod kernel;
pub mod mesh;
mod weld;

pub use cut::BspKernel;
pub use error::{KernelError, KernelResult};
pub use executor::{map_parallel, Executor, SerialExecutor, Task};
pub use kernel::{CutJob, CutOptions, CutOutput, Kernel, KernelLevel, KernelLog, NullLog};
pub use mesh::{
    FaceOrigin, FragmentSide, InputMesh, KernelMesh, MeshRole, Operand, PatchSide, Sealing,
    VertexOrigin,
};
