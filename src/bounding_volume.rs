//! Axis-aligned bounding volumes.

use crate::math::{Point, Real, Vector};

/// An axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// The minimum coordinates of this AABB.
    pub mins: Point<Real>,
    /// The maximum coordinates of this AABB.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates an AABB from its extremal coordinates.
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Self {
        Self { mins, maxs }
    }

    /// The smallest AABB enclosing all the given points.
    ///
    /// Returns `None` if `points` is empty.
    pub fn from_points(points: &[Point<Real>]) -> Option<Self> {
        let first = points.first()?;
        let mut mins = *first;
        let mut maxs = *first;

        for pt in &points[1..] {
            mins = mins.inf(pt);
            maxs = maxs.sup(pt);
        }

        Some(Self { mins, maxs })
    }

    /// The center of this AABB.
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The extents (width along each axis) of this AABB.
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }
}

#[cfg(test)]
mod test {
    use super::Aabb;
    use crate::math::Point;

    #[test]
    fn aabb_from_points() {
        let pts = [
            Point::new(1.0, -2.0, 0.5),
            Point::new(-1.0, 4.0, 0.0),
            Point::new(0.0, 0.0, 3.0),
        ];

        let aabb = Aabb::from_points(&pts).unwrap();
        assert_eq!(aabb.mins, Point::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.maxs, Point::new(1.0, 4.0, 3.0));
        assert_eq!(aabb.extents().max(), 6.0);
    }

    #[test]
    fn aabb_from_no_points() {
        assert!(Aabb::from_points(&[]).is_none());
    }
}
