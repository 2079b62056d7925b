//! Volume-preserving mesh smoothing.
//!
//! Implements Taubin's lambda/mu filter: alternating shrink and inflate
//! Laplacian passes that remove high-frequency noise without the volume loss
//! of plain Laplacian smoothing.
//!
//! # Example
//!
//! ```
//! use mesh_smooth::{SmoothParams, smooth_taubin};
//! use mesh_types::icosphere;
//!
//! let result = smooth_taubin(&icosphere(2), &SmoothParams::gentle()).unwrap();
//! println!("{result}");
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod params;
mod taubin;

pub use error::{SmoothError, SmoothingResult};
pub use params::SmoothParams;
pub use taubin::{SmoothResult, smooth_taubin};
