//! Error types for voxfield_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std compatibility.
//! Every variant is a caller contract violation: nothing here is transient.

use core::fmt;

/// Error types that can occur during voxfield_core operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoxfieldError {
    /// A voxel size is not strictly positive or a bound pair is not increasing.
    InvalidBounds {
        /// The offending axis.
        axis: usize,
        /// Voxel size along that axis.
        voxel_size: f32,
        /// Lower bound along that axis.
        min_bound: f32,
        /// Upper bound along that axis.
        max_bound: f32,
    },
    /// The bounds and voxel size produce an axis with zero cells.
    DegenerateGrid {
        /// The offending axis.
        axis: usize,
        /// `(max_bound - min_bound) / voxel_size` along that axis.
        extent: f32,
    },
    /// Kernel side length is even or zero.
    InvalidKernelSize {
        /// The rejected kernel size.
        ksize: usize,
    },
    /// Kernel standard deviation is not a finite positive number.
    InvalidDeviation {
        /// The rejected deviation.
        dev: f32,
    },
    /// A point coordinate is NaN or infinite.
    OutOfRangeInput {
        /// Index of the point within the batch.
        point: usize,
        /// Axis holding the non-finite value.
        axis: usize,
    },
    /// A grid or field does not have the shape implied by the grid spec.
    ShapeMismatch {
        /// Axis where the shapes differ.
        axis: usize,
        /// Expected cell count along that axis.
        expected: usize,
        /// Actual cell count along that axis.
        got: usize,
    },
}

impl fmt::Display for VoxfieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoxfieldError::InvalidBounds {
                axis,
                voxel_size,
                min_bound,
                max_bound,
            } => {
                write!(
                    f,
                    "invalid bounds on axis {}: voxel size {}, range [{}, {}]",
                    axis, voxel_size, min_bound, max_bound
                )
            }
            VoxfieldError::DegenerateGrid { axis, extent } => {
                write!(
                    f,
                    "degenerate grid on axis {}: extent {} voxels is less than 1",
                    axis, extent
                )
            }
            VoxfieldError::InvalidKernelSize { ksize } => {
                write!(f, "kernel size {} must be odd and at least 1", ksize)
            }
            VoxfieldError::InvalidDeviation { dev } => {
                write!(f, "kernel deviation {} must be finite and positive", dev)
            }
            VoxfieldError::OutOfRangeInput { point, axis } => {
                write!(f, "point {} has a non-finite coordinate on axis {}", point, axis)
            }
            VoxfieldError::ShapeMismatch {
                axis,
                expected,
                got,
            } => {
                write!(
                    f,
                    "shape mismatch on axis {}: expected {}, got {}",
                    axis, expected, got
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VoxfieldError {}

/// Result type for voxfield_core operations.
pub type Result<T> = core::result::Result<T, VoxfieldError>;
