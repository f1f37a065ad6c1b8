//! Transformation, simplification and decomposition of meshes.

pub use self::convex_hull::convex_hull;

mod convex_hull;

/// Hierarchical approximate convex decomposition.
pub mod hacd;

/// Wavefront (`.obj`) export of decomposition results.
#[cfg(feature = "wavefront")]
pub mod wavefront;
