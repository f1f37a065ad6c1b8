//! Exact convex hull of a 3D point cloud.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::utils;
use std::collections::HashSet;

/// Tolerance, on normalized coordinates, below which a point is considered to
/// lie on a supporting plane.
const PLANE_EPS: Real = 1.0e-9;

/// Computes the convex hull of a set of 3d points.
///
/// Returns the hull vertices and its triangles (indices into the returned
/// vertex buffer). This function is total: degenerate inputs produce
/// degenerate hulls rather than errors. A single point yields that point, a
/// collinear cloud yields its two extremal points, and a coplanar cloud
/// yields its flat polygonal hull; in all three cases the triangulation is
/// two-sided so the result still encloses the input.
pub fn convex_hull(points: &[Point<Real>]) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    if points.is_empty() {
        return (Vec::new(), Vec::new());
    }

    // Work on a normalized copy for numerical stability; the output is
    // assembled from the original coordinates.
    let mut normalized = points.to_vec();
    if !normalize(&mut normalized) {
        // All points coincide.
        return (vec![points[0]], vec![[0; 3], [0; 3]]);
    }

    match initial_tetrahedron(&normalized) {
        Seed::Segment(dir) => build_degenerate_segment(&dir, points),
        Seed::Planar { basis_origin, u, v } => {
            build_planar_hull(points, &normalized, basis_origin, &u, &v)
        }
        Seed::Tetrahedron(vtx) => {
            let idx = incremental_hull(&normalized, vtx);
            finalize(points, idx)
        }
    }
}

fn finalize(points: &[Point<Real>], mut idx: Vec<[u32; 3]>) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    let mut points = points.to_vec();
    utils::remove_unused_points(&mut points, &mut idx[..]);
    (points, idx)
}

/// Scales and centers the points so that their bounding-box diagonal is 1.
///
/// Returns `false` if the cloud has no extent at all.
fn normalize(points: &mut [Point<Real>]) -> bool {
    // `points` is never empty here.
    let aabb = Aabb::from_points(points).unwrap_or(Aabb::new(points[0], points[0]));
    let diag = na::distance(&aabb.mins, &aabb.maxs);

    if !(diag > 0.0) {
        return false;
    }

    let center = aabb.center();
    for pt in points.iter_mut() {
        *pt = (*pt + (-center.coords)) / diag;
    }

    true
}

enum Seed {
    /// The cloud is collinear along this direction.
    Segment(Vector<Real>),
    /// The cloud is coplanar; `u`/`v` span the plane.
    Planar {
        basis_origin: usize,
        u: Vector<Real>,
        v: Vector<Real>,
    },
    /// Four affinely independent seed vertices.
    Tetrahedron([usize; 4]),
}

/// Finds four affinely independent points, or detects that the cloud lives in
/// a lower-dimensional subspace.
fn initial_tetrahedron(points: &[Point<Real>]) -> Seed {
    // First axis: the two most distant points along a cheap heuristic.
    let p0 = utils::support_point_id(&-Vector::x(), points).unwrap_or(0);
    let mut p1 = p0;
    let mut max_sq = 0.0;
    for (i, pt) in points.iter().enumerate() {
        let d = na::distance_squared(pt, &points[p0]);
        if d > max_sq {
            max_sq = d;
            p1 = i;
        }
    }

    let dir = points[p1] - points[p0];
    // The normalization step guarantees some extent.
    let dir_norm = dir.norm();

    // Second axis: farthest point from the (p0, p1) line.
    let mut p2 = p0;
    let mut max_lin = 0.0;
    for (i, pt) in points.iter().enumerate() {
        let d = dir.cross(&(pt - points[p0])).norm();
        if d > max_lin {
            max_lin = d;
            p2 = i;
        }
    }

    if max_lin <= PLANE_EPS * dir_norm {
        return Seed::Segment(dir);
    }

    // Third axis: farthest point from the (p0, p1, p2) plane.
    let n = dir.cross(&(points[p2] - points[p0])).normalize();
    let mut p3 = p0;
    let mut max_dist = 0.0;
    for (i, pt) in points.iter().enumerate() {
        let d = n.dot(&(pt - points[p0])).abs();
        if d > max_dist {
            max_dist = d;
            p3 = i;
        }
    }

    if max_dist <= PLANE_EPS {
        let u = dir / dir_norm;
        return Seed::Planar {
            basis_origin: p0,
            u,
            v: n.cross(&u),
        };
    }

    Seed::Tetrahedron([p0, p1, p2, p3])
}

fn build_degenerate_segment(
    dir: &Vector<Real>,
    points: &[Point<Real>],
) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    let a = utils::support_point_id(dir, points).unwrap_or(0);
    let b = utils::support_point_id(&-dir, points).unwrap_or(0);

    (
        vec![points[a], points[b]],
        vec![[0u32, 1, 0], [1u32, 0, 0]],
    )
}

fn build_planar_hull(
    original: &[Point<Real>],
    normalized: &[Point<Real>],
    basis_origin: usize,
    u: &Vector<Real>,
    v: &Vector<Real>,
) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    let origin = normalized[basis_origin];
    let proj: Vec<(Real, Real)> = normalized
        .iter()
        .map(|pt| {
            let d = pt - origin;
            (d.dot(u), d.dot(v))
        })
        .collect();

    let idx = convex_hull2_idx(&proj);

    if idx.len() < 3 {
        // Almost collinear after projection.
        return build_degenerate_segment(u, original);
    }

    let npoints = idx.len();
    let coords = idx.into_iter().map(|i| original[i]).collect();
    let mut triangles = Vec::with_capacity(npoints + npoints - 4);

    for id in 1u32..npoints as u32 - 1 {
        triangles.push([0, id, id + 1]);
    }

    // The bottom side starts its fan from the opposite end of the polyline so
    // no edge ends up shared by more than two triangles.
    for id in 0u32..npoints as u32 - 2 {
        let a = npoints as u32 - 1;
        triangles.push([a, id + 1, id]);
    }

    (coords, triangles)
}

/// 2D convex hull (Andrew's monotone chain), returning input indices in
/// counter-clockwise order.
fn convex_hull2_idx(points: &[(Real, Real)]) -> Vec<usize> {
    let cross = |o: usize, a: usize, b: usize| -> Real {
        let (ox, oy) = points[o];
        let (ax, ay) = points[a];
        let (bx, by) = points[b];
        (ax - ox) * (by - oy) - (ay - oy) * (bx - ox)
    };

    let mut sorted: Vec<usize> = (0..points.len()).collect();
    sorted.sort_by(|&a, &b| {
        points[a]
            .partial_cmp(&points[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut hull: Vec<usize> = Vec::with_capacity(sorted.len() + 1);

    // Lower hull.
    for &i in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0 {
            let _ = hull.pop();
        }
        hull.push(i);
    }

    // Upper hull. Never pop past the lower hull's last point.
    let lower_len = hull.len() + 1;
    for &i in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0
        {
            let _ = hull.pop();
        }
        hull.push(i);
    }

    // The first point was pushed again by the upper pass.
    let _ = hull.pop();

    hull
}

struct Facet {
    pts: [usize; 3],
    normal: Vector<Real>,
    affinely_dependent: bool,
    valid: bool,
    conflicts: Vec<usize>,
}

impl Facet {
    /// Builds a facet whose normal points away from `interior`.
    fn new(p1: usize, p2: usize, p3: usize, points: &[Point<Real>], interior: &Point<Real>) -> Self {
        let mut pts = [p1, p2, p3];
        let mut normal = (points[p2] - points[p1]).cross(&(points[p3] - points[p1]));

        if normal.dot(&(interior - points[p1])) > 0.0 {
            pts.swap(1, 2);
            normal = -normal;
        }

        let norm = normal.norm();
        let affinely_dependent = !(norm > PLANE_EPS * PLANE_EPS);

        Self {
            pts,
            normal: if affinely_dependent {
                normal
            } else {
                normal / norm
            },
            affinely_dependent,
            valid: true,
            conflicts: Vec::new(),
        }
    }

    fn distance_to(&self, pt: &Point<Real>, points: &[Point<Real>]) -> Real {
        self.normal.dot(&(pt - points[self.pts[0]]))
    }

    fn can_see(&self, pt: &Point<Real>, points: &[Point<Real>]) -> bool {
        // A degenerate facet is visible from everywhere so that it is
        // eventually consumed by the expansion of its neighbors.
        self.affinely_dependent || self.distance_to(pt, points) > PLANE_EPS
    }
}

/// Conflict-list incremental hull over affinely independent seed vertices.
fn incremental_hull(points: &[Point<Real>], seed: [usize; 4]) -> Vec<[u32; 3]> {
    let [p0, p1, p2, p3] = seed;
    let interior = utils::center(&[points[p0], points[p1], points[p2], points[p3]]);

    let mut facets = vec![
        Facet::new(p0, p1, p2, points, &interior),
        Facet::new(p0, p1, p3, points, &interior),
        Facet::new(p0, p2, p3, points, &interior),
        Facet::new(p1, p2, p3, points, &interior),
    ];

    // Initial conflict assignment.
    for i in 0..points.len() {
        if i == p0 || i == p1 || i == p2 || i == p3 {
            continue;
        }
        assign_to_furthest_facet(i, 0..4, &mut facets, points);
    }

    let mut pending: Vec<usize> = (0..4).collect();

    while let Some(fid) = pending.pop() {
        if !facets[fid].valid || facets[fid].conflicts.is_empty() {
            continue;
        }

        // Expand towards the furthest conflict point of this facet.
        let mut apex = facets[fid].conflicts[0];
        let mut apex_dist = -Real::MAX;
        for &c in &facets[fid].conflicts {
            let d = facets[fid].distance_to(&points[c], points);
            if d > apex_dist {
                apex_dist = d;
                apex = c;
            }
        }

        // The visibility region of a point outside a convex polytope is
        // exactly the set of facets it can see, so a global scan stands in
        // for an adjacency walk.
        let visible: Vec<usize> = (0..facets.len())
            .filter(|&i| facets[i].valid && facets[i].can_see(&points[apex], points))
            .collect();

        let mut visible_edges = HashSet::new();
        for &i in &visible {
            let [a, b, c] = facets[i].pts;
            let _ = visible_edges.insert((a, b));
            let _ = visible_edges.insert((b, c));
            let _ = visible_edges.insert((c, a));
        }

        // Horizon: directed edges of the visible region whose reverse belongs
        // to a hidden facet.
        let horizon: Vec<(usize, usize)> = visible_edges
            .iter()
            .filter(|(a, b)| !visible_edges.contains(&(*b, *a)))
            .copied()
            .collect();

        if horizon.is_empty() {
            // Numerical dead-end: the point appears to see every facet. Drop
            // it instead of corrupting the topology.
            facets[fid].conflicts.retain(|&c| c != apex);
            pending.push(fid);
            continue;
        }

        // Collect the orphaned conflict points and retire the visible facets.
        let mut orphans = Vec::new();
        for &i in &visible {
            facets[i].valid = false;
            orphans.append(&mut facets[i].conflicts);
        }

        let first_new = facets.len();
        for (a, b) in horizon {
            facets.push(Facet::new(a, b, apex, points, &interior));
        }
        let new_range = first_new..facets.len();

        for orphan in orphans {
            if orphan != apex {
                assign_to_furthest_facet(orphan, new_range.clone(), &mut facets, points);
            }
        }

        for i in new_range {
            if !facets[i].conflicts.is_empty() {
                pending.push(i);
            }
        }
    }

    facets
        .iter()
        .filter(|f| f.valid)
        .map(|f| [f.pts[0] as u32, f.pts[1] as u32, f.pts[2] as u32])
        .collect()
}

fn assign_to_furthest_facet(
    pt: usize,
    candidates: std::ops::Range<usize>,
    facets: &mut [Facet],
    points: &[Point<Real>],
) {
    let mut best = None;
    let mut best_dist = PLANE_EPS;

    for fid in candidates {
        if facets[fid].valid && !facets[fid].affinely_dependent {
            let d = facets[fid].distance_to(&points[pt], points);
            if d > best_dist {
                best = Some(fid);
                best_dist = d;
            }
        }
    }

    if let Some(fid) = best {
        facets[fid].conflicts.push(pt);
    }
}

#[cfg(test)]
mod test {
    use super::convex_hull;
    use crate::math::Point;

    #[test]
    fn hull_of_tetrahedron() {
        let points = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ];

        let (vtx, idx) = convex_hull(&points);
        assert_eq!(vtx.len(), 4);
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn hull_of_cube_with_interior_point() {
        let mut points = vec![Point::new(0.5, 0.5, 0.5)];
        for i in 0..8 {
            points.push(Point::new(
                (i & 1) as f64,
                ((i >> 1) & 1) as f64,
                ((i >> 2) & 1) as f64,
            ));
        }

        let (vtx, idx) = convex_hull(&points);
        assert_eq!(vtx.len(), 8);
        assert_eq!(idx.len(), 12);
        assert!(!vtx.contains(&Point::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn hull_of_planar_square() {
        let points = [
            Point::new(0.0, 0.0, 2.0),
            Point::new(1.0, 0.0, 2.0),
            Point::new(1.0, 1.0, 2.0),
            Point::new(0.0, 1.0, 2.0),
            Point::new(0.5, 0.5, 2.0), // Interior of the square.
        ];

        let (vtx, idx) = convex_hull(&points);
        assert_eq!(vtx.len(), 4);
        // Two-sided fan triangulation of a quad.
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn hull_of_segment_and_point() {
        let segment = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.5, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
        ];
        let (vtx, _) = convex_hull(&segment);
        assert_eq!(vtx.len(), 2);

        let single = [Point::new(1.0, 2.0, 3.0); 3];
        let (vtx, idx) = convex_hull(&single);
        assert_eq!(vtx.len(), 1);
        assert_eq!(idx.len(), 2);
    }
}
