//! # Geometry
//!
//! Polygon-level primitives the kernel works with: tagged vertices,
//! splitting planes, convex polygons, BSP trees, exact predicates and
//! ear clipping of concave faces.

pub mod bsp;
pub mod plane;
pub mod polygon;
pub mod predicates;
pub mod triangulate;
pub mod vertex;

pub use bsp::BspTree;
pub use plane::{Plane, Side};
pub use polygon::{Partition, Placement, Polygon};
pub use triangulate::ear_clip;
pub use vertex::Vertex;
