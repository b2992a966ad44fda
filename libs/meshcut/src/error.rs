//! # Runtime Errors
//!
//! The four failure kinds every entry point can report, and their stable
//! status codes at the C boundary.

use meshcut_kernel::KernelError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Status codes returned across the C ABI.
pub mod status {
    /// The call succeeded.
    pub const SUCCESS: i32 = 0;
    /// The kernel could not produce a result, or the call could not proceed.
    pub const KERNEL_FAILURE: i32 = -2;
    /// Malformed flags, selector or input arrays.
    pub const INVALID_VALUE: i32 = -4;
    /// An allocation failed.
    pub const OUT_OF_MEMORY: i32 = -8;
    /// Unknown or foreign context/component handle.
    pub const INVALID_HANDLE: i32 = -16;
}

/// Classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidHandle,
    InvalidValue,
    OutOfMemory,
    KernelFailure,
}

impl ErrorKind {
    /// Returns the C ABI status code for this kind.
    pub fn status(self) -> i32 {
        match self {
            ErrorKind::InvalidHandle => status::INVALID_HANDLE,
            ErrorKind::InvalidValue => status::INVALID_VALUE,
            ErrorKind::OutOfMemory => status::OUT_OF_MEMORY,
            ErrorKind::KernelFailure => status::KERNEL_FAILURE,
        }
    }
}

/// Errors reported by the runtime.
///
/// Every error is recoverable: the context involved stays usable.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown or foreign context/component handle
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Malformed flags, field selector or input mesh arrays
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Allocation failure while building output
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// The kernel could not resolve the configuration
    #[error("Kernel failure: {0}")]
    KernelFailure(String),
}

impl Error {
    /// Creates an invalid handle error.
    pub fn invalid_handle(message: impl Into<String>) -> Self {
        Self::InvalidHandle(message.into())
    }

    /// Creates an invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHandle(_) => ErrorKind::InvalidHandle,
            Error::InvalidValue(_) => ErrorKind::InvalidValue,
            Error::OutOfMemory(_) => ErrorKind::OutOfMemory,
            Error::KernelFailure(_) => ErrorKind::KernelFailure,
        }
    }

    /// Returns the C ABI status code for this error.
    pub fn status(&self) -> i32 {
        self.kind().status()
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::OutOfMemory(err.to_string())
    }
}

impl From<KernelError> for Error {
    fn from(err: KernelError) -> Self {
        Error::KernelFailure(err.to_string())
    }
}

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
