use crate::math::{Point, Real};
use crate::shape::Tetrahedron;
use crate::transformation;
use crate::utils;

/// The convex hull of a cluster, with its cached volume.
pub(crate) struct HullMesh {
    pub points: Vec<Point<Real>>,
    pub triangles: Vec<[u32; 3]>,
    pub volume: Real,
}

impl HullMesh {
    /// Computes the convex hull of the given points.
    pub fn from_points(points: &[Point<Real>]) -> Self {
        let (points, triangles) = transformation::convex_hull(points);
        let volume = convex_volume(&points, &triangles);

        Self {
            points,
            triangles,
            volume,
        }
    }
}

/// Computes the volume enclosed by a convex triangulated surface.
///
/// Sums the volumes of the tetrahedra joining each triangle to the
/// barycenter; for a flat (degenerate) hull this is zero.
pub(crate) fn convex_volume(points: &[Point<Real>], triangles: &[[u32; 3]]) -> Real {
    if points.is_empty() || triangles.is_empty() {
        return 0.0;
    }

    let barycenter = utils::center(points);
    let mut total_volume = 0.0;

    for tri in triangles {
        let a = points[tri[0] as usize];
        let b = points[tri[1] as usize];
        let c = points[tri[2] as usize];
        total_volume += Tetrahedron::new(a, b, c, barycenter).volume();
    }

    total_volume
}

#[cfg(test)]
mod test {
    use super::HullMesh;
    use crate::math::Point;

    #[test]
    fn cube_hull_volume() {
        let mut points = Vec::new();
        for i in 0..8 {
            points.push(Point::new(
                (i & 1) as f64 * 2.0,
                ((i >> 1) & 1) as f64 * 2.0,
                ((i >> 2) & 1) as f64 * 2.0,
            ));
        }

        let hull = HullMesh::from_points(&points);
        assert_eq!(hull.points.len(), 8);
        assert_relative_eq!(hull.volume, 8.0, max_relative = 1.0e-10);
    }

    #[test]
    fn flat_hull_has_no_volume() {
        let points = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];

        let hull = HullMesh::from_points(&points);
        assert_relative_eq!(hull.volume, 0.0);
    }
}
