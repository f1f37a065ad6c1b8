//! Geometric queries.

use crate::math::{Point, Real, Vector};

/// A ray starting at `origin` and propagating along `dir`.
///
/// `dir` does not need to be normalized: times-of-impact are expressed in
/// units of its length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// The starting point of this ray.
    pub origin: Point<Real>,
    /// The direction of propagation of this ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a ray from its origin and direction.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Self {
        Self { origin, dir }
    }

    /// The point at parameter `t` along this ray.
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }
}

/// Computes the time-of-impact between a ray and the triangle `(a, b, c)`.
///
/// The triangle is treated as double-sided. Returns `None` if the ray is
/// parallel to the triangle's supporting plane, hits that plane behind its
/// origin, or hits it outside of the triangle.
pub fn ray_toi_with_triangle(
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
    ray: &Ray,
) -> Option<Real> {
    let ab = *b - *a;
    let ac = *c - *a;
    let n = ab.cross(&ac);

    let d = n.dot(&ray.dir);
    if d == 0.0 {
        // The ray is parallel to the supporting plane.
        return None;
    }

    let t = n.dot(&(*a - ray.origin)) / d;
    if t < 0.0 {
        return None;
    }

    // Inside/outside test on the intersection point, with a tolerance
    // proportional to the triangle size so rays grazing an edge still count.
    let p = ray.point_at(t);
    let eps = -crate::math::DEFAULT_EPSILON.sqrt() * n.norm();

    let pa = *a - p;
    let pb = *b - p;
    let pc = *c - p;

    if pa.cross(&pb).dot(&n) >= eps && pb.cross(&pc).dot(&n) >= eps && pc.cross(&pa).dot(&n) >= eps
    {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ray_hits_triangle() {
        let a = Point::new(0.0, 0.0, 1.0);
        let b = Point::new(1.0, 0.0, 1.0);
        let c = Point::new(0.0, 1.0, 1.0);

        let ray = Ray::new(Point::new(0.25, 0.25, 0.0), Vector::z());
        assert_relative_eq!(ray_toi_with_triangle(&a, &b, &c, &ray).unwrap(), 1.0);

        // Same triangle, seen from the other side.
        let ray = Ray::new(Point::new(0.25, 0.25, 2.0), -Vector::z());
        assert_relative_eq!(ray_toi_with_triangle(&a, &b, &c, &ray).unwrap(), 1.0);
    }

    #[test]
    fn ray_misses_triangle() {
        let a = Point::new(0.0, 0.0, 1.0);
        let b = Point::new(1.0, 0.0, 1.0);
        let c = Point::new(0.0, 1.0, 1.0);

        // Outside of the triangle.
        let ray = Ray::new(Point::new(2.0, 2.0, 0.0), Vector::z());
        assert_eq!(ray_toi_with_triangle(&a, &b, &c, &ray), None);

        // Behind the origin.
        let ray = Ray::new(Point::new(0.25, 0.25, 2.0), Vector::z());
        assert_eq!(ray_toi_with_triangle(&a, &b, &c, &ray), None);

        // Parallel to the plane.
        let ray = Ray::new(Point::new(0.25, 0.25, 0.0), Vector::x());
        assert_eq!(ray_toi_with_triangle(&a, &b, &c, &ray), None);
    }

    #[test]
    fn ray_starting_on_the_triangle() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(0.0, 1.0, 0.0);

        let ray = Ray::new(Point::new(0.25, 0.25, 0.0), Vector::z());
        assert_relative_eq!(ray_toi_with_triangle(&a, &b, &c, &ray).unwrap(), 0.0);
    }
}
