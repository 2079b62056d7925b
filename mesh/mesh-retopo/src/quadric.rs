//! Quadric error metric.
//!
//! A quadric stores the sum of squared distances to a set of planes as a
//! symmetric 4x4 matrix `Q`, so the error at `p` is `[p 1] Q [p 1]^T`.

use mesh_types::Triangle;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};

/// Sum of plane distance-squared terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric(Matrix4<f64>);

impl Default for Quadric {
    fn default() -> Self {
        Self(Matrix4::zeros())
    }
}

impl Quadric {
    /// Quadric of the plane `normal . p + d = 0`. `normal` must be unit length.
    #[must_use]
    pub fn from_plane(normal: &Vector3<f64>, d: f64) -> Self {
        let plane = Vector4::new(normal.x, normal.y, normal.z, d);
        Self(plane * plane.transpose())
    }

    /// Quadric of a triangle's supporting plane, weighted by its area.
    ///
    /// Degenerate triangles contribute nothing.
    #[must_use]
    pub fn from_triangle(tri: &Triangle) -> Self {
        let Some(normal) = tri.normal() else {
            return Self::default();
        };
        let d = -normal.dot(&tri.v0.coords);
        let mut q = Self::from_plane(&normal, d);
        q.0 *= tri.area();
        q
    }

    /// Squared-distance error at `p`.
    #[must_use]
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let v = p.to_homogeneous();
        (v.transpose() * self.0 * v)[0]
    }

    /// Point minimizing the error, if the system is well conditioned.
    #[must_use]
    pub fn optimal_point(&self) -> Option<Point3<f64>> {
        let a: Matrix3<f64> = self.0.fixed_view::<3, 3>(0, 0).into_owned();
        let b: Vector3<f64> = self.0.fixed_view::<3, 1>(0, 3).into_owned();

        // Planes that are nearly parallel give a singular system; fall back to
        // the caller's candidates rather than shooting off to infinity.
        let scale = a.norm();
        if scale <= f64::EPSILON || a.determinant().abs() < 1e-9 * scale.powi(3) {
            return None;
        }
        a.try_inverse().map(|inv| Point3::from(-(inv * b)))
    }
}

impl std::ops::Add for Quadric {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Quadric {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
