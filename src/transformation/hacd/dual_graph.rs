use super::sampling::{self, SampleSet};
use super::{HullMesh, Parameters};
use crate::math::{Point, Real};
use crate::shape::Triangle;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A cluster of input triangles: one vertex of the dual graph.
pub(crate) struct Cluster {
    /// Input triangle ids belonging to this cluster.
    pub triangles: Vec<u32>,
    /// Sorted input vertex ids referenced by those triangles.
    pub vertices: Vec<u32>,
    /// Sorted distance-point ids lying on this cluster's surface.
    pub dist_points: Vec<u32>,
    /// Open edges of the surface patch (sorted vertex pair -> edge length).
    ///
    /// An edge shared by two triangles of the cluster is closed and absent
    /// from this map, so merging two clusters cancels their shared border.
    pub boundary: HashMap<(u32, u32), Real>,
    /// Total area of the patch.
    pub area: Real,
    /// Total length of the open edges of the patch.
    pub perimeter: Real,
    /// Area-weighted centroid of the patch.
    pub centroid: Point<Real>,
    /// Convex hull of `vertices`.
    pub hull: HullMesh,
    /// Sampled concavity of `hull` with respect to the patch, in normalized
    /// units.
    pub concavity: Real,
    /// Bumped every time this slot's content changes, so queued merge
    /// candidates referring to an older version can be recognized as stale.
    pub generation: u32,
}

/// The dual graph of the mesh: one vertex per cluster, one edge between
/// clusters sharing a mesh edge (or lying within the connection distance).
pub(crate) struct DualGraph {
    clusters: Vec<Option<Cluster>>,
    neighbors: Vec<SmallVec<[u32; 8]>>,
    n_alive: usize,
}

impl DualGraph {
    /// Builds the initial graph with one cluster per input triangle.
    pub fn new(points: &[Point<Real>], triangles: &[[u32; 3]], samples: &SampleSet) -> Self {
        let mut clusters = Vec::with_capacity(triangles.len());

        for (tid, idx) in triangles.iter().enumerate() {
            let tri = Triangle::new(
                points[idx[0] as usize],
                points[idx[1] as usize],
                points[idx[2] as usize],
            );

            let mut boundary = HashMap::new();
            for (a, b) in triangle_edges(idx) {
                let len = na::distance(&points[a as usize], &points[b as usize]);
                let _ = boundary.insert(edge_key(a, b), len);
            }
            let perimeter = boundary.values().sum();

            let mut vertices = idx.to_vec();
            vertices.sort_unstable();
            vertices.dedup();

            let mut dist_points = samples.triangle_samples(tid).to_vec();
            dist_points.sort_unstable();

            clusters.push(Some(Cluster {
                triangles: vec![tid as u32],
                vertices,
                dist_points,
                boundary,
                area: tri.area(),
                perimeter,
                centroid: tri.center(),
                hull: HullMesh::from_points(&[tri.a, tri.b, tri.c]),
                concavity: 0.0,
                generation: 0,
            }));
        }

        // Adjacency through shared mesh edges.
        let mut neighbors = vec![SmallVec::new(); triangles.len()];
        let mut edge_map: HashMap<(u32, u32), SmallVec<[u32; 2]>> = HashMap::new();

        for (tid, idx) in triangles.iter().enumerate() {
            for (a, b) in triangle_edges(idx) {
                edge_map.entry(edge_key(a, b)).or_default().push(tid as u32);
            }
        }

        for tris in edge_map.values() {
            for (i, &t1) in tris.iter().enumerate() {
                for &t2 in &tris[i + 1..] {
                    add_neighbor(&mut neighbors, t1, t2);
                    add_neighbor(&mut neighbors, t2, t1);
                }
            }
        }

        Self {
            n_alive: clusters.len(),
            clusters,
            neighbors,
        }
    }

    /// Adds dual edges between clusters whose centroids are closer than
    /// `dist`, making nearby but topologically disconnected parts of the
    /// mesh mergeable.
    pub fn add_connectivity_by_distance(&mut self, dist: Real) {
        let alive: Vec<u32> = self.alive().collect();

        for (i, &v1) in alive.iter().enumerate() {
            for &v2 in &alive[i + 1..] {
                let d = na::distance(&self.cluster(v1).centroid, &self.cluster(v2).centroid);
                if d <= dist {
                    add_neighbor(&mut self.neighbors, v1, v2);
                    add_neighbor(&mut self.neighbors, v2, v1);
                }
            }
        }
    }

    /// The number of live clusters.
    pub fn len(&self) -> usize {
        self.n_alive
    }

    /// Slot indices of the live clusters, in increasing order.
    pub fn alive(&self) -> impl Iterator<Item = u32> + '_ {
        self.clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_some())
            .map(|(i, _)| i as u32)
    }

    pub fn is_alive(&self, v: u32) -> bool {
        self.clusters[v as usize].is_some()
    }

    /// The live cluster stored in the given slot.
    ///
    /// Panics if the slot is dead; callers check liveness first.
    pub fn cluster(&self, v: u32) -> &Cluster {
        self.clusters[v as usize].as_ref().unwrap()
    }

    pub fn neighbors(&self, v: u32) -> &[u32] {
        &self.neighbors[v as usize]
    }

    /// All the live dual edges `(v1, v2)` with `v1 < v2`.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges = Vec::new();
        for v1 in self.alive() {
            for &v2 in self.neighbors(v1) {
                if v1 < v2 {
                    edges.push((v1, v2));
                }
            }
        }
        edges
    }

    /// Evaluates the cluster that merging `v1` and `v2` would produce,
    /// without modifying the graph.
    pub fn merged_cluster(
        &self,
        v1: u32,
        v2: u32,
        samples: &SampleSet,
        params: &Parameters,
    ) -> Cluster {
        let c1 = self.cluster(v1);
        let c2 = self.cluster(v2);

        let mut triangles = c1.triangles.clone();
        triangles.extend_from_slice(&c2.triangles);

        let vertices = sorted_union(&c1.vertices, &c2.vertices);
        let dist_points = sorted_union(&c1.dist_points, &c2.dist_points);

        // Boundary edges shared by the two patches become interior.
        let (big, small) = if c1.boundary.len() >= c2.boundary.len() {
            (c1, c2)
        } else {
            (c2, c1)
        };
        let mut boundary = big.boundary.clone();
        for (key, len) in &small.boundary {
            if boundary.remove(key).is_none() {
                let _ = boundary.insert(*key, *len);
            }
        }
        let perimeter = boundary.values().sum();

        let area = c1.area + c2.area;
        let centroid = Point::from(
            (c1.centroid.coords * c1.area + c2.centroid.coords * c2.area) / area,
        );

        let hull_points: Vec<Point<Real>> = vertices
            .iter()
            .map(|&i| samples.point(i).point)
            .collect();
        let hull = HullMesh::from_points(&hull_points);

        let concavity = if params.add_neighbours_dist_points {
            let neighbour_samples = self.neighbour_dist_points(v1, v2);
            sampling::concavity(
                dist_points.iter().chain(neighbour_samples.iter()),
                samples,
                &hull,
            )
        } else {
            sampling::concavity(dist_points.iter(), samples, &hull)
        };

        Cluster {
            triangles,
            vertices,
            dist_points,
            boundary,
            area,
            perimeter,
            centroid,
            hull,
            concavity,
            generation: 0,
        }
    }

    /// Distance-points of the live clusters adjacent to `v1` or `v2`.
    fn neighbour_dist_points(&self, v1: u32, v2: u32) -> Vec<u32> {
        let mut ids = Vec::new();

        for &v in [v1, v2].iter() {
            for &w in self.neighbors(v) {
                if w != v1 && w != v2 && self.is_alive(w) {
                    ids.extend_from_slice(&self.cluster(w).dist_points);
                }
            }
        }

        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Replaces `v1` by the merged cluster and retires `v2`.
    pub fn apply_merge(&mut self, v1: u32, v2: u32, mut merged: Cluster) {
        merged.generation = self.cluster(v1).generation + 1;
        self.clusters[v1 as usize] = Some(merged);
        self.clusters[v2 as usize] = None;
        self.n_alive -= 1;

        let old2 = std::mem::take(&mut self.neighbors[v2 as usize]);
        self.neighbors[v1 as usize].retain(|&mut w| w != v2);

        for w in old2 {
            if w == v1 {
                continue;
            }

            {
                let wn = &mut self.neighbors[w as usize];
                wn.retain(|&mut x| x != v2);
                if !wn.contains(&v1) {
                    wn.push(v1);
                }
            }

            add_neighbor(&mut self.neighbors, v1, w);
        }
    }
}

fn add_neighbor(neighbors: &mut [SmallVec<[u32; 8]>], v: u32, w: u32) {
    let vn = &mut neighbors[v as usize];
    if !vn.contains(&w) {
        vn.push(w);
    }
}

fn triangle_edges(idx: &[u32; 3]) -> [(u32, u32); 3] {
    [(idx[0], idx[1]), (idx[1], idx[2]), (idx[2], idx[0])]
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn sorted_union(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }

    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transformation::hacd::Parameters;

    fn strip() -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        // Two coplanar triangles sharing the edge (0, 2).
        (
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(1.0, 1.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn shared_edges_become_dual_edges() {
        let (points, triangles) = strip();
        let params = Parameters::default();
        let samples = SampleSet::new(&points, &triangles, &params);
        let graph = DualGraph::new(&points, &triangles, &samples);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges(), vec![(0, 1)]);
    }

    #[test]
    fn merging_cancels_the_shared_border() {
        let (points, triangles) = strip();
        let params = Parameters::default();
        let samples = SampleSet::new(&points, &triangles, &params);
        let mut graph = DualGraph::new(&points, &triangles, &samples);

        let merged = graph.merged_cluster(0, 1, &samples, &params);
        // The open border of the quad patch is its 4 outer edges.
        assert_eq!(merged.boundary.len(), 4);
        assert_relative_eq!(merged.perimeter, 4.0);
        assert_relative_eq!(merged.area, 1.0);
        assert_relative_eq!(merged.concavity, 0.0);
        assert_eq!(merged.vertices, vec![0, 1, 2, 3]);

        graph.apply_merge(0, 1, merged);
        assert_eq!(graph.len(), 1);
        assert!(graph.is_alive(0));
        assert!(!graph.is_alive(1));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn merges_rewire_the_neighbors_of_the_retired_cluster() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.5, 1.0, 0.0),
            Point::new(1.5, 1.0, 0.0),
            Point::new(1.0, 2.0, 0.0),
        ];
        // A chain: the middle triangle shares an edge with both others.
        let triangles = vec![[0, 1, 2], [1, 3, 2], [2, 3, 4]];
        let params = Parameters::default();
        let samples = SampleSet::new(&points, &triangles, &params);
        let mut graph = DualGraph::new(&points, &triangles, &samples);

        assert_eq!(graph.edges(), vec![(0, 1), (1, 2)]);

        let merged = graph.merged_cluster(0, 1, &samples, &params);
        graph.apply_merge(0, 1, merged);

        // Cluster 2's adjacency to the retired slot 1 moved to slot 0.
        assert_eq!(graph.edges(), vec![(0, 2)]);
        assert_eq!(graph.neighbors(2), &[0][..]);
    }

    #[test]
    fn sorted_union_merges_and_dedupes() {
        assert_eq!(sorted_union(&[0, 2, 4], &[1, 2, 5]), vec![0, 1, 2, 4, 5]);
    }
}
