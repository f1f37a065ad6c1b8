/// Errors that can occur during a convex decomposition.
///
/// Querying a [`super::Decomposition`] is only possible once
/// [`super::decompose`] succeeded, so there is no undefined "stale output"
/// state to document: failures carry no partial result.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompositionError {
    /// The input mesh has an empty vertex buffer.
    #[error("the input mesh contains no points")]
    EmptyPointBuffer,

    /// The input mesh has an empty index buffer.
    #[error("the input mesh contains no triangles")]
    EmptyIndexBuffer,

    /// The input mesh could not be normalized: its bounding box has zero
    /// extent along every axis, or a vertex has a non-finite coordinate.
    #[error("the input mesh is degenerate and cannot be normalized")]
    DegenerateMesh,

    /// A decomposition parameter is outside of its admissible range.
    #[error("invalid decomposition parameter: {0}")]
    InvalidParameters(&'static str),

    /// No decomposition with at most `target` clusters respects the concavity
    /// threshold.
    #[error("could not reach {target} clusters, stopped at {reached}")]
    UnreachableClusterCount {
        /// The requested upper bound on the cluster count.
        target: u32,
        /// The smallest cluster count reachable under the concavity
        /// threshold.
        reached: usize,
    },
}
