//! # Config Crate
//!
//! Constants shared by the meshcut runtime and its reference kernel, so
//! both sides agree on tolerances, sentinels and scheduling defaults.
//!
//! ```rust
//! use config::constants::{resolve_worker_count, UNDEFINED_INDEX};
//!
//! // Map entries with no input vertex behind them
//! let mapped: Option<u32> = None;
//! assert_eq!(mapped.unwrap_or(UNDEFINED_INDEX), u32::MAX);
//!
//! assert_eq!(resolve_worker_count(4), 4);
//! ```
//!
//! Values that cross the C ABI (sentinels, minimum face size) are part of
//! the wire contract and never change.

pub mod constants;
