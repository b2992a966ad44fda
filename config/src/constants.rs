//! # Configuration Constants
//!
//! Tolerances, sentinels and limits of the cutting pipeline.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Mesh Contract**: Sentinels and structural minimums shared with clients
//! - **Scheduling**: Worker pool sizing
//! - **Kernel**: General-position perturbation parameters
//! - **Limits**: Maximum values for safety bounds

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Smallest magnitude treated as non-zero: polygon area, convexity turns.
pub const EPSILON: f64 = 1e-10;

/// Tolerance used when classifying points against a splitting plane.
///
/// Points closer than this to a plane lie on it. Must exceed
/// [`VERTEX_MERGE_EPSILON`] so welding never merges points the plane test
/// still separates.
pub const PLANE_EPSILON: f64 = 1e-5;

/// Grid pitch used to weld polygon corners into indexed vertices.
///
/// # Example
///
/// ```rust
/// use config::constants::VERTEX_MERGE_EPSILON;
///
/// fn weld_key(value: f64) -> i64 {
///     (value / VERTEX_MERGE_EPSILON).round() as i64
/// }
///
/// assert_eq!(weld_key(0.5), weld_key(0.5 + 1e-12));
/// ```
pub const VERTEX_MERGE_EPSILON: f64 = 1e-8;

// =============================================================================
// MESH CONTRACT CONSTANTS
// =============================================================================

/// Map value for output vertices or faces without a counterpart in either
/// input mesh.
///
/// Part of the client contract: vertex and face maps carry this value for
/// intersection points.
pub const UNDEFINED_INDEX: u32 = u32::MAX;

/// Smallest number of vertices a face may reference.
pub const MIN_FACE_SIZE: u32 = 3;

/// Number of coordinates stored per vertex.
pub const COORDS_PER_VERTEX: usize = 3;

// =============================================================================
// SCHEDULING CONSTANTS
// =============================================================================

/// Requested worker count meaning "one worker per available CPU".
pub const DEFAULT_WORKER_COUNT: usize = 0;

/// Upper bound on workers owned by a single context.
///
/// Many contexts may live at once, each with its own pool, so the
/// per-context pool is capped.
pub const MAX_WORKER_COUNT: usize = 16;

// =============================================================================
// KERNEL CONSTANTS
// =============================================================================

/// Translation step applied to the cut mesh when general position is
/// enforced and a vertex lies on the other mesh's surface.
pub const GENERAL_POSITION_PERTURBATION: f64 = 1e-4;

/// Number of perturbation attempts before the kernel gives up.
pub const MAX_PERTURBATION_ATTEMPTS: u32 = 8;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Maximum number of vertices accepted per input mesh.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_VERTICES;
///
/// let vertex_count = 1000;
/// assert!(vertex_count < MAX_VERTICES);
/// ```
pub const MAX_VERTICES: usize = 10_000_000;

/// Maximum number of faces accepted per input mesh.
pub const MAX_FACES: usize = 10_000_000;

/// Maximum length in bytes of a message delivered through the debug
/// callback. Longer messages are truncated on a character boundary.
pub const MAX_DEBUG_MESSAGE_LENGTH: usize = 1024;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Resolves a requested worker count into the actual pool size.
///
/// [`DEFAULT_WORKER_COUNT`] selects the available parallelism of the host;
/// every result is clamped to `1..=MAX_WORKER_COUNT`.
///
/// # Example
///
/// ```rust
/// use config::constants::{resolve_worker_count, MAX_WORKER_COUNT};
///
/// assert_eq!(resolve_worker_count(2), 2);
/// assert_eq!(resolve_worker_count(1000), MAX_WORKER_COUNT);
/// assert!(resolve_worker_count(0) >= 1);
/// ```
pub fn resolve_worker_count(requested: usize) -> usize {
    let count = if requested == DEFAULT_WORKER_COUNT {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        requested
    };
    count.clamp(1, MAX_WORKER_COUNT)
}
