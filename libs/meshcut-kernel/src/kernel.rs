//! # Kernel Interface
//!
//! The contract between the runtime and a cutting kernel.

use crate::error::KernelResult;
use crate::executor::Executor;
use crate::mesh::{InputMesh, KernelMesh};

/// Severity of a kernel diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelLevel {
    /// Progress or statistics.
    Info,
    /// Something unusual that did not stop the cut.
    Warning,
    /// The reason a cut failed.
    Error,
}

/// Receiver for kernel diagnostics.
pub trait KernelLog: Sync {
    /// Records one message.
    fn message(&self, level: KernelLevel, text: &str);
}

/// Log that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl KernelLog for NullLog {
    fn message(&self, _level: KernelLevel, _text: &str) {}
}

/// Behavioural switches for one cut.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CutOptions {
    /// Perturb the cut mesh instead of failing when a vertex of one mesh
    /// lies on the surface of the other.
    pub enforce_general_position: bool,
}

/// Everything a kernel needs for one cut.
pub struct CutJob<'a> {
    /// The mesh being cut.
    pub source: &'a InputMesh<'a>,
    /// The mesh doing the cutting.
    pub cut: &'a InputMesh<'a>,
    /// Behavioural switches.
    pub options: CutOptions,
    /// Where independent sub-tasks run.
    pub executor: &'a dyn Executor,
    /// Where diagnostics go.
    pub log: &'a dyn KernelLog,
}

/// The result of a successful cut.
#[derive(Debug, Clone, PartialEq)]
pub struct CutOutput {
    /// Output meshes in a deterministic order.
    pub meshes: Vec<KernelMesh>,
    /// Whether the meshes actually intersected. When false only the input
    /// echoes are present.
    pub intersected: bool,
    /// Number of general-position perturbations applied to the cut mesh.
    pub perturbations: u32,
}

/// A geometric cutting engine.
pub trait Kernel: Send + Sync {
    /// Cuts `job.source` with `job.cut`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::KernelError`] when the configuration cannot be
    /// resolved. The kernel never panics on well-formed input.
    fn cut(&self, job: &CutJob<'_>) -> KernelResult<CutOutput>;
}
