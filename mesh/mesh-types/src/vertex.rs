//! Vertex types and attributes.

use nalgebra::{Point2, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Optional per-vertex attributes.
///
/// - `normal`: area-weighted average of adjacent face normals, filled in by
///   the retopology post-pass
/// - `uv`: texture coordinate in `[0, 1]²`, filled in by parameterization
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexAttributes {
    /// Unit normal vector.
    pub normal: Option<Vector3<f64>>,

    /// Texture coordinates (U, V).
    pub uv: Option<Point2<f64>>,
}

impl VertexAttributes {
    /// Attributes with nothing set.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            normal: None,
            uv: None,
        }
    }

    /// Check if any attributes are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.normal.is_none() && self.uv.is_none()
    }
}

/// A vertex in 3D space with optional attributes.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Vertex};
///
/// let v1 = Vertex::new(Point3::new(1.0, 2.0, 3.0));
/// let v2 = Vertex::from_coords(1.0, 2.0, 3.0);
///
/// assert_eq!(v1.position, v2.position);
/// assert!(v1.attributes.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Optional attributes (normal, UV).
    pub attributes: VertexAttributes,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: VertexAttributes::empty(),
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Copy of this vertex carrying the given UV.
    ///
    /// Used when a vertex is duplicated across a UV seam: the position and
    /// normal are shared, only the texture coordinate differs.
    #[must_use]
    pub fn with_uv(&self, uv: Point2<f64>) -> Self {
        Self {
            position: self.position,
            attributes: VertexAttributes {
                normal: self.attributes.normal,
                uv: Some(uv),
            },
        }
    }

    /// Texture coordinate, if assigned.
    #[inline]
    #[must_use]
    pub const fn uv(&self) -> Option<Point2<f64>> {
        self.attributes.uv
    }

    /// Normal, if assigned.
    #[inline]
    #[must_use]
    pub const fn normal(&self) -> Option<Vector3<f64>> {
        self.attributes.normal
    }
}
