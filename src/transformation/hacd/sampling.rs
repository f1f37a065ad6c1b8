use super::{HullMesh, Parameters};
use crate::math::{Point, Real, Vector};
use crate::query::{ray_toi_with_triangle, Ray};
use crate::shape::Triangle;
use smallvec::SmallVec;

/// A point sampled on the input surface, used to measure how far a candidate
/// convex hull drifts away from the geometry it covers.
pub(crate) struct DistancePoint {
    pub point: Point<Real>,
    /// Unit outward normal of the surface at `point` (zero if undefined).
    pub normal: Vector<Real>,
}

/// All the distance-points sampled on the input mesh, indexed per triangle.
///
/// The first `nvertices` entries are the mesh vertices themselves (with
/// area-weighted pseudo-normals); face centroids and edge midpoints follow
/// when the corresponding [`Parameters`] flags are set.
pub(crate) struct SampleSet {
    points: Vec<DistancePoint>,
    per_triangle: Vec<SmallVec<[u32; 8]>>,
}

impl SampleSet {
    pub fn new(vertices: &[Point<Real>], triangles: &[[u32; 3]], params: &Parameters) -> Self {
        let mut normals = vec![Vector::zeros(); vertices.len()];

        for tri in triangles {
            let t = Triangle::new(
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            );
            // The scaled normal weights each face by its area.
            let n = t.scaled_normal();
            for &i in tri {
                normals[i as usize] += n;
            }
        }

        let mut points: Vec<DistancePoint> = vertices
            .iter()
            .zip(normals)
            .map(|(pt, n)| {
                let norm = n.norm();
                DistancePoint {
                    point: *pt,
                    normal: if norm > 0.0 { n / norm } else { n },
                }
            })
            .collect();

        let mut per_triangle = Vec::with_capacity(triangles.len());

        for tri in triangles {
            let mut ids: SmallVec<[u32; 8]> = tri.iter().copied().collect();
            let t = Triangle::new(
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            );
            let face_normal = t.normal().unwrap_or_else(Vector::zeros);

            if params.add_faces_points {
                ids.push(points.len() as u32);
                points.push(DistancePoint {
                    point: t.center(),
                    normal: face_normal,
                });
            }

            if params.add_extra_dist_points {
                for (a, b) in [(t.a, t.b), (t.b, t.c), (t.c, t.a)] {
                    ids.push(points.len() as u32);
                    points.push(DistancePoint {
                        point: na::center(&a, &b),
                        normal: face_normal,
                    });
                }
            }

            per_triangle.push(ids);
        }

        Self {
            points,
            per_triangle,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, id: u32) -> &DistancePoint {
        &self.points[id as usize]
    }

    /// The ids of the samples lying on the given triangle.
    pub fn triangle_samples(&self, triangle: usize) -> &[u32] {
        &self.per_triangle[triangle]
    }
}

/// Hits closer than this along a concavity ray are grazes at the sample
/// itself (the sample lies on a hull facet) and carry no depth information.
const GRAZE_EPS: Real = 1.0e-9;

/// Measures the concavity of a hull with respect to the given surface
/// samples.
///
/// For each sample, a ray is cast from the sampled surface point along its
/// outward normal; the distance to the first hull triangle crossed is how
/// deep the hull locally covers the surface. Grazes at the sample itself are
/// ignored: a sample lying on a hull facet with its normal pointing out of
/// the hull contributes zero (so convex regions merge for free), while one
/// whose normal points back into the hull interior reports the distance to
/// the far exit. The concavity is the maximum over the samples.
pub(crate) fn concavity<'a>(
    sample_ids: impl Iterator<Item = &'a u32>,
    samples: &SampleSet,
    hull: &HullMesh,
) -> Real {
    let mut max_dist: Real = 0.0;

    for &id in sample_ids {
        let sample = samples.point(id);
        if sample.normal == Vector::zeros() {
            continue;
        }

        let ray = Ray::new(sample.point, sample.normal);
        let mut toi = Real::MAX;

        for tri in &hull.triangles {
            let a = &hull.points[tri[0] as usize];
            let b = &hull.points[tri[1] as usize];
            let c = &hull.points[tri[2] as usize];

            if let Some(t) = ray_toi_with_triangle(a, b, c, &ray) {
                if t > GRAZE_EPS {
                    toi = toi.min(t);
                }
            }
        }

        if toi != Real::MAX {
            max_dist = max_dist.max(toi);
        }
    }

    max_dist
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transformation::hacd::Parameters;

    fn quad() -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
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
    fn vertices_and_face_centroids_are_sampled_by_default() {
        let (vertices, triangles) = quad();
        let set = SampleSet::new(&vertices, &triangles, &Parameters::default());

        // 4 vertices + 1 centroid per triangle.
        assert_eq!(set.len(), 4 + 2);
        assert_eq!(set.triangle_samples(0), &[0, 1, 2, 4]);
        assert_relative_eq!(set.point(0).normal, Vector::z());
        assert_relative_eq!(set.point(4).normal, Vector::z());
    }

    #[test]
    fn face_points_can_be_disabled() {
        let (vertices, triangles) = quad();
        let params = Parameters {
            add_faces_points: false,
            ..Default::default()
        };
        let set = SampleSet::new(&vertices, &triangles, &params);

        assert_eq!(set.len(), 4);
        assert_eq!(set.triangle_samples(0), &[0, 1, 2]);
    }

    #[test]
    fn optional_samples_are_added() {
        let (vertices, triangles) = quad();
        let params = Parameters {
            add_faces_points: true,
            add_extra_dist_points: true,
            ..Default::default()
        };
        let set = SampleSet::new(&vertices, &triangles, &params);

        // 4 vertices + per triangle: 1 centroid + 3 edge midpoints.
        assert_eq!(set.len(), 4 + 2 * 4);
        assert_eq!(set.triangle_samples(1).len(), 3 + 4);
    }

    #[test]
    fn flat_samples_have_zero_concavity_on_their_hull() {
        let (vertices, triangles) = quad();
        let set = SampleSet::new(&vertices, &triangles, &Parameters::default());
        let hull = HullMesh::from_points(&vertices);

        let ids = [0u32, 1, 2, 3];
        assert_relative_eq!(concavity(ids.iter(), &set, &hull), 0.0);
    }

    #[test]
    fn covered_samples_measure_the_hull_exit_distance() {
        // A flat triangle lying on the bottom face of a much larger hull:
        // its samples are buried 2.0 deep along their +z normals, and the
        // graze on the bottom facet must not hide that.
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(4.0, 0.0, 0.0),
            Point::new(0.0, 4.0, 0.0),
        ];
        let triangles = vec![[0, 1, 2]];
        let set = SampleSet::new(&vertices, &triangles, &Parameters::default());

        let mut corners = Vec::new();
        for i in 0..8 {
            corners.push(Point::new(
                if i & 1 == 0 { -1.0 } else { 5.0 },
                if (i >> 1) & 1 == 0 { -1.0 } else { 5.0 },
                if (i >> 2) & 1 == 0 { 0.0 } else { 2.0 },
            ));
        }
        let hull = HullMesh::from_points(&corners);

        let ids: Vec<u32> = (0..set.len() as u32).collect();
        assert_relative_eq!(
            concavity(ids.iter(), &set, &hull),
            2.0,
            max_relative = 1.0e-10
        );
    }
}
