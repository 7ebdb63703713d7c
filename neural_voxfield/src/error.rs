//! Error types for neural_voxfield.

use thiserror::Error;
use voxfield_core::VoxfieldError;

/// Errors that can occur when bridging tensors to the voxelization core or
/// running the voting head.
#[derive(Error, Debug)]
pub enum NeuralVoxfieldError {
    /// Grid, kernel or point error from voxfield_core.
    #[error("voxelization error: {0}")]
    Voxel(#[from] VoxfieldError),

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Tensor data could not be read back as f32.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type for neural_voxfield operations.
pub type Result<T> = std::result::Result<T, NeuralVoxfieldError>;
