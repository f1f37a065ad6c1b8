//! Hierarchical approximate convex decomposition (HACD).
//!
//! The entry point is [`decompose`]: it partitions the triangles of a
//! [`crate::shape::TriMesh`] into clusters by repeatedly contracting the
//! cheapest edge of the mesh's dual graph, and reports one convex hull per
//! cluster. [`Parameters`] controls the accuracy/cluster-count trade-off.

pub use self::error::DecompositionError;
pub use self::hacd::{
    decompose, decompose_with_observer, ConvexCluster, Decomposition, DecompositionEvent,
    DecompositionObserver,
};
pub use self::normalization::Normalization;
pub use self::parameters::Parameters;

pub(crate) use self::hull::HullMesh;

mod dual_graph;
mod error;
mod hacd;
mod hull;
mod normalization;
mod parameters;
mod sampling;
