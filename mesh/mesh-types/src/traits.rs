//! Traits for mesh types.

use crate::{Aabb, Triangle};
use nalgebra::Point3;

/// Read-only topology access shared by every mesh representation.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of faces (triangles).
    fn face_count(&self) -> usize;

    /// A mesh is empty when it has no vertices or no faces.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Resolve a face into its vertex positions.
    ///
    /// Returns `None` if the face index is out of bounds.
    fn triangle(&self, face_index: usize) -> Option<Triangle>;

    /// Iterate over all triangles with resolved vertex positions.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}

/// Trait for types that can compute a bounding box.
pub trait MeshBounds {
    /// Compute the axis-aligned bounding box.
    ///
    /// Returns an empty AABB if the mesh has no vertices.
    fn bounds(&self) -> Aabb;

    /// Compute the bounding box, returning `None` if empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }

    /// Center of the bounding box.
    fn center(&self) -> Point3<f64> {
        self.bounds().center()
    }
}
