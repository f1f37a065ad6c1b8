/*!
hacd3d
========

**hacd3d** is a hierarchical approximate convex decomposition library for 3D
triangle meshes, written with the rust programming language.

Given a mesh (points + triangle indices), [`transformation::hacd::decompose`]
partitions its triangles into clusters and computes one convex hull per
cluster, trading approximation accuracy (concavity, connection distance)
against the number of clusters.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::manual_range_contains)]

#[cfg(test)]
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod query;
pub mod shape;
pub mod transformation;
pub mod utils;

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    /// The scalar type used throughout this crate.
    pub type Real = f64;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub type Point<N> = na::Point3<N>;

    /// The vector type.
    pub type Vector<N> = na::Vector3<N>;
}
