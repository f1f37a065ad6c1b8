//! Shape primitives: triangles, tetrahedra, and indexed triangle meshes.

use crate::math::{Point, Real, Vector};

/// A triangle defined by three vertices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    /// The first vertex of this triangle.
    pub a: Point<Real>,
    /// The second vertex of this triangle.
    pub b: Point<Real>,
    /// The third vertex of this triangle.
    pub c: Point<Real>,
}

impl Triangle {
    /// Creates a triangle from three vertices.
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Self {
        Self { a, b, c }
    }

    /// The normal of this triangle scaled by twice its area.
    pub fn scaled_normal(&self) -> Vector<Real> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        ab.cross(&ac)
    }

    /// The unit normal of this triangle, or `None` if it is degenerate.
    pub fn normal(&self) -> Option<Vector<Real>> {
        let n = self.scaled_normal();
        let norm = n.norm();

        if norm > 0.0 {
            Some(n / norm)
        } else {
            None
        }
    }

    /// The area of this triangle.
    pub fn area(&self) -> Real {
        self.scaled_normal().norm() * 0.5
    }

    /// The center of mass of this triangle.
    pub fn center(&self) -> Point<Real> {
        crate::utils::center(&[self.a, self.b, self.c])
    }
}

/// A tetrahedron defined by four vertices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tetrahedron {
    /// The first vertex of this tetrahedron.
    pub a: Point<Real>,
    /// The second vertex of this tetrahedron.
    pub b: Point<Real>,
    /// The third vertex of this tetrahedron.
    pub c: Point<Real>,
    /// The fourth vertex of this tetrahedron.
    pub d: Point<Real>,
}

impl Tetrahedron {
    /// Creates a tetrahedron from four vertices.
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>, d: Point<Real>) -> Self {
        Self { a, b, c, d }
    }

    /// The signed volume of this tetrahedron.
    ///
    /// Positive iff `(a, b, c)` is seen in counter-clockwise order from `d`'s
    /// opposite side of its supporting plane.
    pub fn signed_volume(&self) -> Real {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ad = self.d - self.a;
        ab.cross(&ac).dot(&ad) / 6.0
    }

    /// The volume of this tetrahedron.
    pub fn volume(&self) -> Real {
        self.signed_volume().abs()
    }
}

/// An indexed triangle mesh.
///
/// This is the input of [`crate::transformation::hacd::decompose`]: a vertex
/// buffer and a triangle index buffer. The mesh does not need to be closed or
/// manifold, but every index must point inside the vertex buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct TriMesh {
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
}

/// Error indicating that a [`TriMesh`] could not be built from its buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TriMeshError {
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references the out-of-bounds vertex {index}")]
    IndexOutOfBounds {
        /// The offending triangle.
        triangle: usize,
        /// The out-of-bounds vertex index it contains.
        index: u32,
    },
}

impl TriMesh {
    /// Creates a mesh from a vertex buffer and an index buffer.
    ///
    /// Fails if any triangle references a vertex outside of `vertices`.
    /// Empty buffers are accepted here; they are rejected by the
    /// decomposition entry point instead.
    pub fn new(
        vertices: Vec<Point<Real>>,
        indices: Vec<[u32; 3]>,
    ) -> Result<Self, TriMeshError> {
        let nvtx = vertices.len() as u32;

        for (tid, idx) in indices.iter().enumerate() {
            for &i in idx {
                if i >= nvtx {
                    return Err(TriMeshError::IndexOutOfBounds {
                        triangle: tid,
                        index: i,
                    });
                }
            }
        }

        Ok(Self { vertices, indices })
    }

    /// The vertex buffer of this mesh.
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The index buffer of this mesh.
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The triangle with the given index.
    pub fn triangle(&self, i: usize) -> Triangle {
        let idx = self.indices[i];
        Triangle::new(
            self.vertices[idx[0] as usize],
            self.vertices[idx[1] as usize],
            self.vertices[idx[2] as usize],
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn triangle_area_and_normal() {
        let tri = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        );

        assert_relative_eq!(tri.area(), 2.0);
        assert_relative_eq!(tri.normal().unwrap(), Vector::z());
    }

    #[test]
    fn tetrahedron_volume() {
        let tetra = Tetrahedron::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        );

        assert_relative_eq!(tetra.volume(), 1.0 / 6.0);
        assert_relative_eq!(tetra.signed_volume(), 1.0 / 6.0);
    }

    #[test]
    fn trimesh_rejects_out_of_bounds_indices() {
        let vertices = vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0)];
        let res = TriMesh::new(vertices, vec![[0, 1, 2]]);
        assert_eq!(
            res,
            Err(TriMeshError::IndexOutOfBounds {
                triangle: 0,
                index: 2
            })
        );
    }
}
