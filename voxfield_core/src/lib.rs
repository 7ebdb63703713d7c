//! # voxfield_core
//!
//! Pure numerical routines for turning sparse point sets into dense grids.
//!
//! This crate provides the voxelization layer of the voxfield workspace: it
//! discretizes 1D/2D/3D point coordinates into a regular grid and accumulates
//! their mass, either by multilinear interpolation or by splatting a
//! truncated Gaussian kernel.
//!
//! ## Features
//!
//! - **no_std compatible**: Only needs `alloc`
//! - **Dimension generic**: The same code path for D = 1, 2, 3 via `const D: usize`
//! - **Immutable inputs**: Normalization returns new buffers, never rewrites the caller's
//! - **Boundary-correct windows**: Kernels are clipped at the grid border without shifting their peak
//!
//! ## Feature Flags
//!
//! - `std` (default): `std::error::Error` impls and [`KernelCache`]
//! - `rayon`: Parallel splatting with per-thread partial grids ([`par_splat`])
//!
//! ## Modules
//!
//! - [`config`]: Grid and kernel parameters (`GridSpec<D>`, `KernelSpec`)
//! - [`grid`]: Dense row-major accumulator grid (`DenseGrid<D>`)
//! - [`rasterize`]: Normalization, grid shape and multilinear accumulation
//! - [`kernel`]: Truncated Gaussian kernels
//! - [`window`]: Per-point kernel window clipping
//! - [`splat`]: Gaussian splatting and potential evaluation
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```
//! use voxfield_core::prelude::*;
//!
//! let spec = GridSpec::<3>::scene();
//! let points = [[0.0, 0.0, 1.0], [1.2, -0.4, 0.3]];
//!
//! // Soft occupancy: one Gaussian per point
//! let field = splat_field(&points, &spec, &KernelSpec::new(3, 0.5)).unwrap();
//! assert_eq!(field.shape(), [100, 100, 35]);
//!
//! // Density of the field at query points
//! let kernel = GaussianKernel::<3>::centered(3, 0.5).unwrap();
//! let p = potential(&points, &field, &kernel, &spec).unwrap();
//! assert!(p > 0.0);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod rasterize;
pub mod splat;
pub mod window;

/// Prelude module for convenient imports.
///
/// Provides the most commonly used types and functions.
pub mod prelude {
    pub use crate::config::{GridSpec, KernelSpec};
    pub use crate::error::VoxfieldError;
    pub use crate::grid::DenseGrid;
    pub use crate::kernel::{gaussian_kernel, GaussianKernel};
    pub use crate::rasterize::{
        grid_shape, interpolate, interpolate_accumulate, multilinear_corners, normalize,
        NormalizedPoints,
    };
    pub use crate::splat::{locate, potential, splat, splat_field};
    pub use crate::window::{AxisWindow, Window};

    #[cfg(feature = "std")]
    pub use crate::kernel::KernelCache;
    #[cfg(feature = "rayon")]
    pub use crate::splat::par_splat;
}

// Re-export everything at crate root for convenience
pub use config::{GridSpec, KernelSpec, SHAPE_ULPS};
pub use error::{Result, VoxfieldError};
pub use grid::DenseGrid;
#[cfg(feature = "std")]
pub use kernel::KernelCache;
pub use kernel::{gaussian_kernel, GaussianKernel};
pub use rasterize::{
    bilinear_accumulate_compat, grid_shape, interpolate, interpolate_accumulate,
    multilinear_corners, normalize, NormalizedPoints,
};
#[cfg(feature = "rayon")]
pub use splat::par_splat;
pub use splat::{locate, potential, splat, splat_field};
pub use window::{AxisWindow, Window};

/// Single-axis point.
pub type Point1 = [f32; 1];
/// Planar point.
pub type Point2 = [f32; 2];
/// Spatial point.
pub type Point3 = [f32; 3];
