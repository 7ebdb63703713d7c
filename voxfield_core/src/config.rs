//! Grid and kernel configuration types.

use crate::error::{Result, VoxfieldError};

/// Relative slack, in units of `f32::EPSILON`, applied before flooring an
/// axis extent to a cell count.
///
/// `(max - min) / voxel_size` is computed in f32, so a ratio that is an exact
/// integer in decimal (e.g. `2.0 / 0.05`) can land a few ulps below it.
/// Genuinely fractional extents such as `2.99995` still floor down.
pub const SHAPE_ULPS: f32 = 4.0;

/// Axis-aligned discretization of a D-dimensional region.
///
/// Immutable once constructed; every rasterization call derives its grid
/// shape from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec<const D: usize> {
    /// World units per cell, per axis.
    pub voxel_size: [f32; D],
    /// Lower corner of the region.
    pub min_bound: [f32; D],
    /// Upper corner of the region.
    pub max_bound: [f32; D],
}

impl<const D: usize> GridSpec<D> {
    /// Create a new grid specification.
    #[inline]
    pub const fn new(voxel_size: [f32; D], min_bound: [f32; D], max_bound: [f32; D]) -> Self {
        Self {
            voxel_size,
            min_bound,
            max_bound,
        }
    }

    /// Same voxel size and range on every axis.
    #[inline]
    pub const fn uniform(voxel_size: f32, min_bound: f32, max_bound: f32) -> Self {
        Self {
            voxel_size: [voxel_size; D],
            min_bound: [min_bound; D],
            max_bound: [max_bound; D],
        }
    }

    /// Check voxel sizes and bound ordering on every axis.
    ///
    /// Non-finite configuration values are rejected as invalid bounds.
    pub fn validate(&self) -> Result<()> {
        for axis in 0..D {
            let voxel_size = self.voxel_size[axis];
            let min_bound = self.min_bound[axis];
            let max_bound = self.max_bound[axis];

            let finite = voxel_size.is_finite() && min_bound.is_finite() && max_bound.is_finite();
            if !finite || voxel_size <= 0.0 || max_bound <= min_bound {
                return Err(VoxfieldError::InvalidBounds {
                    axis,
                    voxel_size,
                    min_bound,
                    max_bound,
                });
            }
        }
        Ok(())
    }

    /// Number of voxels spanned by the region along `axis`, before truncation.
    #[inline]
    pub fn extent(&self, axis: usize) -> f32 {
        (self.max_bound[axis] - self.min_bound[axis]) / self.voxel_size[axis]
    }

    /// Grid shape: `floor((max - min) / voxel_size)` per axis.
    ///
    /// Validates the spec first; fails with `DegenerateGrid` if any axis has
    /// no cells.
    pub fn shape(&self) -> Result<[usize; D]> {
        self.validate()?;

        let mut shape = [0usize; D];
        for (axis, cells) in shape.iter_mut().enumerate() {
            let extent = self.extent(axis);
            let truncated = libm::floorf(extent + extent * f32::EPSILON * SHAPE_ULPS);
            if truncated < 1.0 {
                return Err(VoxfieldError::DegenerateGrid { axis, extent });
            }
            *cells = truncated as usize;
        }
        Ok(shape)
    }
}

impl GridSpec<3> {
    /// Scene volume used for Gaussian fields: 0.1 voxels over
    /// x, y in [-5, 5] and z in [-0.5, 3].
    pub const fn scene() -> Self {
        Self::new([0.1; 3], [-5.0, -5.0, -0.5], [5.0, 5.0, 3.0])
    }

    /// Scene volume used for center/corner interpolation: 0.1 voxels over
    /// x, y in [-3.84, 3.84] and z in [-0.2, 2.68].
    pub const fn interpolation_scene() -> Self {
        Self::new([0.1; 3], [-3.84, -3.84, -0.2], [3.84, 3.84, 2.68])
    }
}

impl GridSpec<2> {
    /// Planar field over x, y in [-5, 5] with 0.1 voxels.
    pub const fn scene() -> Self {
        Self::uniform(0.1, -5.0, 5.0)
    }
}

impl GridSpec<1> {
    /// Line field over [-5, 5] with 0.1 voxels.
    pub const fn scene() -> Self {
        Self::uniform(0.1, -5.0, 5.0)
    }
}

/// Truncated Gaussian kernel parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelSpec {
    /// Side length in cells. Must be odd.
    pub ksize: usize,
    /// Standard deviation in cells.
    pub dev: f32,
}

impl KernelSpec {
    /// Create a new kernel specification.
    #[inline]
    pub const fn new(ksize: usize, dev: f32) -> Self {
        Self { ksize, dev }
    }

    /// Half-width of the kernel: `(ksize - 1) / 2`.
    #[inline]
    pub const fn k2(&self) -> usize {
        self.ksize.saturating_sub(1) / 2
    }

    /// Check that `ksize` is odd and `dev` is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if self.ksize == 0 || self.ksize % 2 == 0 {
            return Err(VoxfieldError::InvalidKernelSize { ksize: self.ksize });
        }
        if !self.dev.is_finite() || self.dev <= 0.0 {
            return Err(VoxfieldError::InvalidDeviation { dev: self.dev });
        }
        Ok(())
    }
}

impl Default for KernelSpec {
    fn default() -> Self {
        Self { ksize: 3, dev: 0.5 }
    }
}
