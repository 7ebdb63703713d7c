//! # neural_voxfield
//!
//! Burn layer of the voxfield workspace.
//!
//! This crate connects the pure voxelization routines of `voxfield_core` to
//! Burn tensors, and provides the plane voting head that consumes seed point
//! features downstream of a point cloud backbone.
//!
//! ## Features
//!
//! - **Tensor bridging**: splat, interpolate and potential over `[N, D]` point tensors
//! - **Differentiable potential**: gradients flow into the field tensor
//! - **Plane voting head**: angle class, residual, sign and two offsets per axis family
//!
//! ## Quick Start
//!
//! ```ignore
//! use burn::backend::NdArray;
//! use burn::prelude::*;
//! use neural_voxfield::prelude::*;
//!
//! type MyBackend = NdArray;
//!
//! let device = Default::default();
//!
//! // Soft occupancy over the default scene volume
//! let config = FieldConfig::scene_3d();
//! let points = Tensor::<MyBackend, 2>::from_data([[0.0, 0.0, 1.0]], &device);
//! let field: Tensor<MyBackend, 3> = splat_tensor(points, &config)?;
//!
//! // Plane votes from seed features
//! let head = VotingPlaneConfig::new(256).init::<MyBackend>(&device);
//! let votes = head.try_forward(seed_xyz, seed_features)?;
//! let upper = votes.get(PlaneAxis::Z).d0.clone();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! voxfield_core (pure math, no_std)
//!     │
//!     ▼
//! neural_voxfield::field  ──►  Tensor<B, D> fields
//! neural_voxfield::nn     ──►  PlaneVotes<B>
//! ```
//!
//! ## Feature Flags
//!
//! - `ndarray` (default): CPU backend using ndarray
//! - `wgpu`: GPU acceleration via WebGPU
//! - `rayon`: Enables parallel splatting in `voxfield_core`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod field;
pub mod nn;

// Re-export key types for convenience
pub use config::{FieldConfig, VotingPlaneConfig};
pub use error::{NeuralVoxfieldError, Result};
pub use field::{interpolate_tensor, potential_tensor, splat_tensor, FieldRasterizer};
pub use nn::{AxisVotes, PlaneAxis, PlaneVotes, VotingPlaneModule};

// Re-export from voxfield_core for convenience
pub use voxfield_core::{DenseGrid, GridSpec, KernelSpec, Point3};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{FieldConfig, VotingPlaneConfig};
    pub use crate::error::{NeuralVoxfieldError, Result};
    pub use crate::field::{
        grid_to_tensor, interpolate_tensor, points_from_tensor, potential_tensor, splat_tensor,
        tensor_to_grid, FieldRasterizer,
    };
    pub use crate::nn::{AxisVotes, PlaneAxis, PlaneBranch, PlaneVotes, VotingPlaneModule};

    pub use voxfield_core::{DenseGrid, GaussianKernel, GridSpec, KernelSpec, Point3};
}
