use super::DecompositionError;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};

/// The affine transform mapping a mesh into its canonical, normalized frame.
///
/// Normalization centers the mesh's bounding box on the origin and applies a
/// uniform scale mapping the longest bounding-box dimension to a unit range.
/// The decomposition runs in normalized space; this type is what maps its
/// results back into the caller's coordinates, and it is exposed so callers
/// can do the same with their own data.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Normalization {
    center: Point<Real>,
    scale: Real,
}

impl Normalization {
    /// Computes the normalization transform of the given point cloud.
    ///
    /// Fails with [`DecompositionError::DegenerateMesh`] if the cloud is
    /// empty, has non-finite coordinates, or has zero extent along every
    /// axis: those inputs admit no uniform scale.
    pub fn from_points(points: &[Point<Real>]) -> Result<Self, DecompositionError> {
        let aabb = Aabb::from_points(points).ok_or(DecompositionError::DegenerateMesh)?;
        let extents = aabb.extents();
        let scale = extents.max();

        if !scale.is_finite() || scale <= 0.0 || !aabb.center().coords.iter().all(|x| x.is_finite())
        {
            return Err(DecompositionError::DegenerateMesh);
        }

        Ok(Self {
            center: aabb.center(),
            scale,
        })
    }

    /// The uniform scale factor applied by this normalization.
    pub fn scale(&self) -> Real {
        self.scale
    }

    /// The point mapped to the origin by this normalization.
    pub fn center(&self) -> Point<Real> {
        self.center
    }

    /// Maps a point into the normalized frame.
    pub fn normalize_point(&self, pt: &Point<Real>) -> Point<Real> {
        (pt - self.center.coords) / self.scale
    }

    /// Maps a normalized point back into the original frame.
    pub fn denormalize_point(&self, pt: &Point<Real>) -> Point<Real> {
        pt * self.scale + self.center.coords
    }

    /// Maps all the given points into the normalized frame.
    pub fn normalize(&self, points: &mut [Point<Real>]) {
        for pt in points {
            *pt = self.normalize_point(pt);
        }
    }

    /// Maps all the given normalized points back into the original frame.
    pub fn denormalize(&self, points: &mut [Point<Real>]) {
        for pt in points {
            *pt = self.denormalize_point(pt);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point;

    #[test]
    fn normalize_denormalize_round_trip() {
        let points = vec![
            Point::new(10.0, -4.0, 3.0),
            Point::new(-2.0, 8.0, 1.0),
            Point::new(5.0, 5.0, -7.0),
        ];

        let norm = Normalization::from_points(&points).unwrap();
        let mut mapped = points.clone();
        norm.normalize(&mut mapped);
        norm.denormalize(&mut mapped);

        for (orig, back) in points.iter().zip(mapped.iter()) {
            assert_relative_eq!(orig, back, max_relative = 1.0e-6);
        }
    }

    #[test]
    fn longest_dimension_maps_to_unit_range() {
        let points = vec![Point::new(0.0, 0.0, 0.0), Point::new(10.0, 2.0, 4.0)];

        let norm = Normalization::from_points(&points).unwrap();
        assert_relative_eq!(norm.scale(), 10.0);

        let a = norm.normalize_point(&points[0]);
        let b = norm.normalize_point(&points[1]);
        assert_relative_eq!((b - a).x, 1.0);
    }

    #[test]
    fn degenerate_clouds_are_rejected() {
        assert_eq!(
            Normalization::from_points(&[]),
            Err(DecompositionError::DegenerateMesh)
        );

        let same = vec![Point::new(1.0, 1.0, 1.0); 5];
        assert_eq!(
            Normalization::from_points(&same),
            Err(DecompositionError::DegenerateMesh)
        );
    }
}
