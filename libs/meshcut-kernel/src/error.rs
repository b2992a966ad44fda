//! # Kernel Errors
//!
//! Error types for the cutting kernel. Every geometric configuration the
//! kernel cannot resolve is reported here instead of panicking.

use crate::mesh::Operand;
use thiserror::Error;

/// Errors that can occur while cutting.
#[derive(Debug, Error)]
pub enum KernelError {
    /// A face has no area (repeated or collinear vertices).
    #[error("Degenerate geometry: face {face} of the {operand} mesh has no area")]
    Degenerate {
        /// Mesh containing the face.
        operand: Operand,
        /// Index of the face in that mesh.
        face: u32,
    },

    /// A vertex of one mesh lies on the surface of the other.
    #[error("General position violated: vertex {vertex} of the {operand} mesh lies on the other mesh")]
    GeneralPosition {
        /// Mesh containing the vertex.
        operand: Operand,
        /// Index of the vertex in that mesh.
        vertex: u32,
    },

    /// Any other unrecoverable kernel condition.
    #[error("Kernel failure: {0}")]
    Internal(String),
}

/// Result type alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
