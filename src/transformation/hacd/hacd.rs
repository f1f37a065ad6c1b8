use super::dual_graph::{Cluster, DualGraph};
use super::sampling::SampleSet;
use super::{hull, DecompositionError, Normalization, Parameters};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::shape::TriMesh;
use crate::transformation;
use crate::utils;
use ordered_float::NotNan;
use std::collections::BinaryHeap;

/// One convex piece of a [`Decomposition`], expressed in the coordinates of
/// the input mesh.
#[derive(Clone, Debug)]
pub struct ConvexCluster {
    /// The vertices of the convex hull of this piece.
    pub points: Vec<Point<Real>>,
    /// The triangle faces of the convex hull, as indices into
    /// [`points`](Self::points).
    pub triangles: Vec<[u32; 3]>,
    /// The sampled concavity of this piece, in mesh units.
    pub concavity: Real,
    /// The volume enclosed by the hull, in mesh units.
    pub volume: Real,
}

/// The result of a hierarchical approximate convex decomposition.
pub struct Decomposition {
    clusters: Vec<ConvexCluster>,
    partition: Vec<u32>,
    normalization: Normalization,
    distance_points: Option<Vec<Point<Real>>>,
}

impl Decomposition {
    /// The number of convex pieces the mesh was decomposed into.
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// The convex pieces the mesh was decomposed into.
    pub fn clusters(&self) -> &[ConvexCluster] {
        &self.clusters
    }

    /// The convex piece with the given cluster id.
    ///
    /// Panics if `id` is not a cluster id of this decomposition, i.e. if it
    /// is not smaller than [`n_clusters`](Self::n_clusters).
    pub fn cluster(&self, id: u32) -> &ConvexCluster {
        &self.clusters[id as usize]
    }

    /// The cluster id assigned to each input triangle, in input order.
    ///
    /// Every entry indexes into [`clusters`](Self::clusters), and every
    /// cluster owns at least one triangle.
    pub fn partition(&self) -> &[u32] {
        &self.partition
    }

    /// The normalization transform the decomposition ran under.
    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    /// The uniform scale factor applied by the normalization (the longest
    /// extent of the input's bounding box).
    pub fn scale_factor(&self) -> Real {
        self.normalization.scale()
    }

    /// The surface points sampled for concavity estimation, if
    /// [`Parameters::export_distance_points`] was set.
    pub fn distance_points(&self) -> Option<&[Point<Real>]> {
        self.distance_points.as_deref()
    }
}

/// A progress notification emitted while a decomposition runs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DecompositionEvent {
    /// The dual graph was built and clustering is about to start.
    Started {
        /// The number of input triangles, i.e. of initial clusters.
        triangles: usize,
        /// The number of surface points sampled for concavity estimation.
        samples: usize,
    },
    /// Two clusters were merged.
    ClustersMerged {
        /// The number of clusters left after this merge.
        remaining: usize,
        /// The cost of the contracted dual-graph edge.
        cost: Real,
        /// The sampled concavity of the merged cluster, in normalized units.
        concavity: Real,
    },
    /// Clustering ended.
    Finished {
        /// The final number of clusters.
        clusters: usize,
    },
}

/// Observes the progress of a decomposition started with
/// [`decompose_with_observer`].
pub trait DecompositionObserver {
    /// Called for every [`DecompositionEvent`], in order.
    fn on_progress(&mut self, event: DecompositionEvent);
}

struct NoopObserver;

impl DecompositionObserver for NoopObserver {
    fn on_progress(&mut self, _event: DecompositionEvent) {}
}

/// A queued dual-graph edge contraction. The heap pops the cheapest one
/// first; generation counters let contractions queued before one of their
/// endpoints changed be recognized as stale and skipped. The concavity of
/// the union is not stored: it is re-measured at pop time.
struct MergeCandidate {
    cost: NotNan<Real>,
    v1: u32,
    v2: u32,
    gen1: u32,
    gen2: u32,
}

impl PartialEq for MergeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for MergeCandidate {}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed so the std max-heap pops the cheapest contraction; ties
        // break on the edge ids to keep the ordering deterministic.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.v1.cmp(&self.v1))
            .then_with(|| other.v2.cmp(&self.v2))
    }
}

/// Decomposes a triangle mesh into approximately convex pieces.
///
/// The mesh's dual graph (one vertex per triangle, one edge per shared mesh
/// edge) is contracted edge by edge, cheapest first, as long as the concavity
/// of the merged surface patches stays below [`Parameters::concavity`]. Each
/// surviving cluster is reported as its convex hull, together with the
/// triangle-to-cluster partition.
pub fn decompose(
    mesh: &TriMesh,
    params: &Parameters,
) -> Result<Decomposition, DecompositionError> {
    decompose_with_observer(mesh, params, &mut NoopObserver)
}

/// Same as [`decompose`], notifying the given observer as clustering
/// progresses.
pub fn decompose_with_observer(
    mesh: &TriMesh,
    params: &Parameters,
    observer: &mut dyn DecompositionObserver,
) -> Result<Decomposition, DecompositionError> {
    params.validate()?;

    if mesh.vertices().is_empty() {
        return Err(DecompositionError::EmptyPointBuffer);
    }
    if mesh.indices().is_empty() {
        return Err(DecompositionError::EmptyIndexBuffer);
    }

    let normalization = Normalization::from_points(mesh.vertices())?;
    let mut points = mesh.vertices().to_vec();
    normalization.normalize(&mut points);

    // Both length thresholds are given in mesh units; clustering runs in the
    // normalized frame.
    let scale = normalization.scale();
    let concavity_threshold = params.concavity / scale;
    let connect_dist = params.connect_dist / scale;

    let aabb = Aabb::from_points(&points).ok_or(DecompositionError::DegenerateMesh)?;
    let diag = (aabb.maxs - aabb.mins).norm();

    let samples = SampleSet::new(&points, mesh.indices(), params);
    let mut graph = DualGraph::new(&points, mesh.indices(), &samples);

    if connect_dist > 0.0 {
        graph.add_connectivity_by_distance(connect_dist);
    }

    log::debug!(
        "starting decomposition: {} triangles, {} distance-points",
        mesh.indices().len(),
        samples.len()
    );
    observer.on_progress(DecompositionEvent::Started {
        triangles: mesh.indices().len(),
        samples: samples.len(),
    });

    let mut heap = BinaryHeap::new();
    for (v1, v2) in graph.edges() {
        push_candidate(&graph, v1, v2, &samples, params, diag, &mut heap);
    }

    let target = params.max_clusters.map(|n| n as usize);

    loop {
        if matches!(target, Some(t) if graph.len() <= t) {
            break;
        }

        let Some(candidate) = heap.pop() else {
            break;
        };

        if !graph.is_alive(candidate.v1)
            || !graph.is_alive(candidate.v2)
            || graph.cluster(candidate.v1).generation != candidate.gen1
            || graph.cluster(candidate.v2).generation != candidate.gen2
        {
            continue;
        }

        let within_connect_dist = connect_dist > 0.0
            && na::distance(
                &graph.cluster(candidate.v1).centroid,
                &graph.cluster(candidate.v2).centroid,
            ) <= connect_dist;

        // The union is re-evaluated at pop time: with
        // `add_neighbours_dist_points`, the concavity measured when the
        // candidate was queued goes stale as soon as a cluster adjacent to it
        // merges, even though both endpoints are unchanged.
        let merged = graph.merged_cluster(candidate.v1, candidate.v2, &samples, params);
        let concavity = merged.concavity;

        if concavity > concavity_threshold && !within_connect_dist {
            continue;
        }

        graph.apply_merge(candidate.v1, candidate.v2, merged);

        log::trace!(
            "merged clusters {} and {}: cost {}, concavity {}, {} remaining",
            candidate.v1,
            candidate.v2,
            candidate.cost,
            concavity,
            graph.len()
        );
        observer.on_progress(DecompositionEvent::ClustersMerged {
            remaining: graph.len(),
            cost: candidate.cost.into_inner(),
            concavity,
        });

        let neighbors: Vec<u32> = graph.neighbors(candidate.v1).to_vec();
        for w in neighbors {
            push_candidate(&graph, candidate.v1, w, &samples, params, diag, &mut heap);
        }
    }

    log::debug!("decomposition done: {} clusters", graph.len());
    observer.on_progress(DecompositionEvent::Finished {
        clusters: graph.len(),
    });

    if let Some(t) = target {
        if graph.len() > t {
            return Err(DecompositionError::UnreachableClusterCount {
                target: t as u32,
                reached: graph.len(),
            });
        }
    }

    let mut clusters = Vec::with_capacity(graph.len());
    let mut partition = vec![0u32; mesh.indices().len()];

    for (cid, slot) in graph.alive().enumerate() {
        let cluster = graph.cluster(slot);

        for &t in &cluster.triangles {
            partition[t as usize] = cid as u32;
        }

        let member_points: Vec<Point<Real>> = cluster
            .vertices
            .iter()
            .map(|&i| points[i as usize])
            .collect();
        let (mut hull_points, hull_triangles) = cluster_hull(&member_points, params);
        normalization.denormalize(&mut hull_points);

        let volume = hull::convex_volume(&hull_points, &hull_triangles);

        clusters.push(ConvexCluster {
            points: hull_points,
            triangles: hull_triangles,
            concavity: cluster.concavity * scale,
            volume,
        });
    }

    let distance_points = params.export_distance_points.then(|| {
        (0..samples.len())
            .map(|i| normalization.denormalize_point(&samples.point(i as u32).point))
            .collect()
    });

    Ok(Decomposition {
        clusters,
        partition,
        normalization,
        distance_points,
    })
}

fn push_candidate(
    graph: &DualGraph,
    v1: u32,
    v2: u32,
    samples: &SampleSet,
    params: &Parameters,
    diag: Real,
    heap: &mut BinaryHeap<MergeCandidate>,
) {
    let merged = graph.merged_cluster(v1, v2, samples, params);
    let cost = merge_cost(&merged, diag, params);

    if !cost.is_finite() {
        return;
    }

    if let Ok(cost) = NotNan::new(cost) {
        heap.push(MergeCandidate {
            cost,
            v1,
            v2,
            gen1: graph.cluster(v1).generation,
            gen2: graph.cluster(v2).generation,
        });
    }
}

/// The cost of contracting a dual-graph edge, i.e. of replacing two clusters
/// by their union.
///
/// The concavity term is normalized by the mesh diagonal so the weights
/// `alpha` and `beta` keep the same meaning across mesh sizes; the compacity
/// term grows with the perimeter-to-area ratio of the merged patch (1 for a
/// disc) and the volume term with the merged hull's volume.
fn merge_cost(merged: &Cluster, diag: Real, params: &Parameters) -> Real {
    let compacity = if merged.area > 0.0 {
        (merged.perimeter * merged.perimeter / (4.0 * std::f64::consts::PI * merged.area)).sqrt()
    } else {
        0.0
    };
    let volume_term = merged.hull.volume / (diag * diag * diag);

    merged.concavity / diag + params.alpha * compacity + params.beta * volume_term
}

/// Computes the hull reported for a cluster, simplifying it if it has more
/// vertices than [`Parameters::max_vertices_per_hull`] allows.
fn cluster_hull(points: &[Point<Real>], params: &Parameters) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    let (hull_points, hull_triangles) = transformation::convex_hull(points);

    if !params.exact_hulls {
        if let Some(max) = params.max_vertices_per_hull {
            if hull_points.len() > max as usize {
                let subset = farthest_point_subsample(&hull_points, max as usize);
                return transformation::convex_hull(&subset);
            }
        }
    }

    (hull_points, hull_triangles)
}

/// Selects `count` points spread over the input cloud: the point farthest
/// from the centroid first, then greedily the point farthest from the
/// selection so far.
fn farthest_point_subsample(points: &[Point<Real>], count: usize) -> Vec<Point<Real>> {
    let centroid = utils::center(points);

    let mut first = 0;
    let mut best = -1.0;
    for (i, pt) in points.iter().enumerate() {
        let dist = na::distance_squared(pt, &centroid);
        if dist > best {
            best = dist;
            first = i;
        }
    }

    let mut selected = Vec::with_capacity(count);
    selected.push(points[first]);

    let mut min_dist = vec![Real::MAX; points.len()];
    let mut latest = first;

    while selected.len() < count {
        let mut next = 0;
        let mut best = -1.0;

        for (i, pt) in points.iter().enumerate() {
            min_dist[i] = min_dist[i].min(na::distance_squared(pt, &points[latest]));
            if min_dist[i] > best {
                best = min_dist[i];
                next = i;
            }
        }

        // All the remaining points coincide with the selection.
        if best <= 0.0 {
            break;
        }

        selected.push(points[next]);
        latest = next;
    }

    selected
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cheapest_candidate_pops_first() {
        let mut heap = BinaryHeap::new();

        for (cost, v2) in [(3.0, 1), (1.0, 2), (2.0, 3)] {
            heap.push(MergeCandidate {
                cost: NotNan::new(cost).unwrap(),
                v1: 0,
                v2,
                gen1: 0,
                gen2: 0,
            });
        }

        assert_eq!(heap.pop().unwrap().v2, 2);
        assert_eq!(heap.pop().unwrap().v2, 3);
        assert_eq!(heap.pop().unwrap().v2, 1);
    }

    #[test]
    fn subsample_keeps_spread_out_points() {
        let points = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.1, 0.0, 0.0),
            Point::new(10.0, 0.0, 0.0),
            Point::new(10.0, 10.0, 0.0),
        ];

        let subset = farthest_point_subsample(&points, 3);
        assert_eq!(subset.len(), 3);
        // The two nearly-coincident points never both survive.
        let close = subset
            .iter()
            .filter(|pt| na::distance(pt, &Point::origin()) < 1.0)
            .count();
        assert_eq!(close, 1);
    }
}
