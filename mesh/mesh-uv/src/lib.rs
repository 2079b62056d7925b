//! UV parameterization for triangle meshes.
//!
//! Two paths produce per-vertex texture coordinates in `[0, 1]²`:
//!
//! - **Chart atlas**: a [`ChartAtlas`] backend cuts the surface into charts
//!   and packs them. [`PlanarChartAtlas`] is the built-in backend: charts
//!   grow while face normals stay inside a cone around the seed normal, are
//!   projected onto their mean plane and shelf-packed with a gutter.
//! - **Spherical fallback**: every vertex is projected onto a sphere around
//!   the vertex mean. Always succeeds, with visible stretch near the poles
//!   and a seam at `u = 0`.
//!
//! [`parameterize`] tries the atlas first and falls back when no backend is
//! supplied or the backend reports [`UvError::Unavailable`].
//!
//! # Example
//!
//! ```
//! use mesh_types::icosphere;
//! use mesh_uv::{PlanarChartAtlas, parameterize};
//!
//! let atlas = PlanarChartAtlas::default();
//! let result = parameterize(&icosphere(2), Some(&atlas)).unwrap();
//! println!("UVs from {}", result.method);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod atlas;
mod error;
mod pack;
mod parameterize;
mod params;
mod spherical;

pub use atlas::{ChartAtlas, ChartedMesh, PlanarChartAtlas};
pub use error::{UvError, UvResult};
pub use parameterize::{Parameterization, UvMethod, parameterize};
pub use params::AtlasParams;
pub use spherical::spherical_projection;
