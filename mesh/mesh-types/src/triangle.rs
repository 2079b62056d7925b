//! Triangle type for geometric calculations.

use nalgebra::{Point3, Vector3};

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Triangle};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
///
/// assert!((tri.area() - 0.5).abs() < 1e-10);
/// assert!(tri.normal().is_some_and(|n| (n.z - 1.0).abs() < 1e-10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Cross product of the two edges leaving `v0`.
    ///
    /// The magnitude equals twice the triangle's area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit face normal, `None` for degenerate triangles.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON * f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Area of the triangle.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Centroid (center of mass).
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Point at barycentric coordinates `(1 - u - v, u, v)`.
    #[inline]
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.v0 + (self.v1 - self.v0) * u + (self.v2 - self.v0) * v
    }

    /// Length of the longest edge.
    #[must_use]
    pub fn max_edge_length(&self) -> f64 {
        let a = (self.v1 - self.v0).norm();
        let b = (self.v2 - self.v1).norm();
        let c = (self.v0 - self.v2).norm();
        a.max(b).max(c)
    }
}
