//! Miscellaneous utilities.

use crate::math::{Point, Real, Vector};

/// Computes the center of a set of points.
///
/// # Panics
/// Panics if the input slice is empty.
pub fn center(pts: &[Point<Real>]) -> Point<Real> {
    assert!(
        !pts.is_empty(),
        "Cannot compute the center of less than 1 point."
    );

    let denom = 1.0 / (pts.len() as Real);
    let mut piter = pts.iter();
    let mut res = *piter.next().unwrap() * denom;

    for pt in piter {
        res += pt.coords * denom;
    }

    res
}

/// Returns the index of the support point of a list of points.
///
/// The support point is the point with the largest projection on `direction`.
/// Returns `None` if `points` is empty or only contains non-finite
/// coordinates.
pub fn support_point_id(direction: &Vector<Real>, points: &[Point<Real>]) -> Option<usize> {
    let mut argmax = None;
    let mut max = -Real::MAX;

    for (id, pt) in points.iter().enumerate() {
        let dot = direction.dot(&pt.coords);

        if dot > max {
            argmax = Some(id);
            max = dot;
        }
    }

    argmax
}

/// Given an index buffer, remove from `points` every point that is not indexed.
pub fn remove_unused_points(points: &mut Vec<Point<Real>>, idx: &mut [[u32; 3]]) {
    let mut used = vec![false; points.len()];
    let mut remap: Vec<usize> = (0..points.len()).collect();

    for i in idx.iter() {
        used[i[0] as usize] = true;
        used[i[1] as usize] = true;
        used[i[2] as usize] = true;
    }

    let mut i = 0;
    while i != points.len() {
        if !used[i] {
            let _ = points.swap_remove(i);
            remap[points.len()] = i;
            used[i] = used[points.len()];
        } else {
            i += 1;
        }
    }

    for id in idx.iter_mut() {
        id[0] = remap[id[0] as usize] as u32;
        id[1] = remap[id[1] as usize] as u32;
        id[2] = remap[id[2] as usize] as u32;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Point, Vector};

    #[test]
    fn center_of_two_points() {
        let pts = [Point::new(0.0, 0.0, 0.0), Point::new(2.0, 4.0, -2.0)];
        assert_eq!(center(&pts), Point::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn support_point() {
        let pts = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.5, 2.0, 0.0),
        ];
        assert_eq!(support_point_id(&Vector::x(), &pts), Some(1));
        assert_eq!(support_point_id(&Vector::y(), &pts), Some(2));
    }

    #[test]
    fn unused_points_are_removed() {
        let mut points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 1.0), // Unused.
            Point::new(2.0, 2.0, 2.0),
            Point::new(3.0, 3.0, 3.0),
        ];
        let mut idx = [[0u32, 2, 3]];

        remove_unused_points(&mut points, &mut idx);

        assert_eq!(points.len(), 3);
        let [a, b, c] = idx[0];
        assert_eq!(points[a as usize], Point::new(0.0, 0.0, 0.0));
        assert_eq!(points[b as usize], Point::new(2.0, 2.0, 2.0));
        assert_eq!(points[c as usize], Point::new(3.0, 3.0, 3.0));
    }
}
