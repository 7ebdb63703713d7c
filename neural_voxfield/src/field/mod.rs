//! Tensor bridging for the voxelization core.
//!
//! Point tensors of shape `[N, D]` are read back to the host, rasterized by
//! `voxfield_core`, and the resulting grids are uploaded to the same device
//! as `D`-dimensional field tensors. Backend and device are always explicit.

mod convert;
mod rasterizer;

pub use convert::{grid_to_tensor, points_from_tensor, tensor_to_grid};
pub use rasterizer::{interpolate_tensor, potential_tensor, splat_tensor, FieldRasterizer};
