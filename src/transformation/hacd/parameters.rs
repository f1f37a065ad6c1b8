use super::DecompositionError;
use crate::math::Real;

/// Parameters for tuning the hierarchical approximate convex decomposition.
///
/// The main knob is [`concavity`](Self::concavity): lower values yield finer
/// decompositions with more clusters, higher values coarser ones with fewer
/// clusters. All lengths (`concavity`, `connect_dist`) are expressed in the
/// units of the input mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Maximum concavity a cluster may reach, in mesh units.
    ///
    /// Two adjacent clusters are merged only while the sampled concavity of
    /// their union stays below this threshold (unless their centroids are
    /// closer than [`connect_dist`](Self::connect_dist)).
    pub concavity: Real,
    /// Weight of the compacity term of the merge cost.
    ///
    /// The cost of contracting a dual-graph edge is
    /// `concavity / diag + alpha * compacity + beta * volume`, where
    /// `compacity` grows with the perimeter-to-area ratio of the merged
    /// surface patch and `volume` with its convex-hull volume. Larger `alpha`
    /// favors compact, round clusters.
    pub alpha: Real,
    /// Weight of the volume term of the merge cost. Larger `beta` penalizes
    /// merges producing large convex hulls.
    pub beta: Real,
    /// Distance below which two cluster centroids are considered connected,
    /// in mesh units.
    ///
    /// Clusters closer than this merge even past the concavity threshold,
    /// and disconnected parts of the mesh closer than this become mergeable
    /// at all. `0.0` disables the override.
    pub connect_dist: Real,
    /// Upper bound on the number of clusters in the decomposition.
    ///
    /// Merging stops as soon as this count is reached. If the concavity
    /// threshold forbids reaching it, decomposition fails with
    /// [`DecompositionError::UnreachableClusterCount`].
    pub max_clusters: Option<u32>,
    /// Upper bound on the number of vertices of each reported convex hull.
    ///
    /// Hulls exceeding the bound are simplified, unless
    /// [`exact_hulls`](Self::exact_hulls) is set. Must be at least 4.
    pub max_vertices_per_hull: Option<u32>,
    /// Sample a concavity distance-point at the centroid of each face.
    ///
    /// Enabled by default: the vertices of a surface patch all lie on the
    /// patch's convex hull, so vertex samples alone cannot measure how deep
    /// the hull covers the interior of a face. Disable only on meshes dense
    /// enough that vertex sampling suffices.
    pub add_faces_points: bool,
    /// Sample extra concavity distance-points on the edges of each face.
    ///
    /// Improves the concavity estimate on coarse meshes at some extra cost.
    pub add_extra_dist_points: bool,
    /// Let the distance-points of neighboring clusters participate in a
    /// candidate merge's concavity, penalizing hulls that swallow nearby
    /// surface.
    pub add_neighbours_dist_points: bool,
    /// Always report the exact convex hull of each cluster, ignoring
    /// [`max_vertices_per_hull`](Self::max_vertices_per_hull).
    pub exact_hulls: bool,
    /// Retain the distance-points sampled for concavity estimation in the
    /// output, for inspection or debugging.
    pub export_distance_points: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            concavity: 0.001,
            alpha: 0.05,
            beta: 0.05,
            connect_dist: 0.0,
            max_clusters: None,
            max_vertices_per_hull: None,
            add_faces_points: true,
            add_extra_dist_points: false,
            add_neighbours_dist_points: false,
            exact_hulls: false,
            export_distance_points: false,
        }
    }
}

impl Parameters {
    /// Checks that every field is in its admissible range.
    pub fn validate(&self) -> Result<(), DecompositionError> {
        if !self.concavity.is_finite() || self.concavity < 0.0 {
            return Err(DecompositionError::InvalidParameters(
                "`concavity` must be finite and non-negative",
            ));
        }

        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(DecompositionError::InvalidParameters(
                "`alpha` must be finite and non-negative",
            ));
        }

        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(DecompositionError::InvalidParameters(
                "`beta` must be finite and non-negative",
            ));
        }

        if !self.connect_dist.is_finite() || self.connect_dist < 0.0 {
            return Err(DecompositionError::InvalidParameters(
                "`connect_dist` must be finite and non-negative",
            ));
        }

        if self.max_clusters == Some(0) {
            return Err(DecompositionError::InvalidParameters(
                "`max_clusters` must be at least 1",
            ));
        }

        if matches!(self.max_vertices_per_hull, Some(n) if n < 4) {
            return Err(DecompositionError::InvalidParameters(
                "`max_vertices_per_hull` must be at least 4",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_parameters_are_valid() {
        assert_eq!(Parameters::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let params = Parameters {
            concavity: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = Parameters {
            alpha: Real::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = Parameters {
            max_vertices_per_hull: Some(3),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = Parameters {
            max_clusters: Some(0),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
