//! Dense D-dimensional accumulator grid.
//!
//! Storage is a flat row-major `Vec<f32>` with the last axis varying fastest,
//! matching the layout of a contiguous tensor of the same shape.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Result, VoxfieldError};

/// Dense grid of `f32` accumulator cells.
///
/// The shape is fixed at construction. All writes go through in-range
/// indices; callers clamp before indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid<const D: usize> {
    shape: [usize; D],
    strides: [usize; D],
    data: Vec<f32>,
}

/// Fail with `DegenerateGrid` on the first axis of `shape` that has no cells.
pub(crate) fn check_cells<const D: usize>(shape: [usize; D]) -> Result<()> {
    match shape.iter().position(|&len| len == 0) {
        Some(axis) => Err(VoxfieldError::DegenerateGrid { axis, extent: 0.0 }),
        None => Ok(()),
    }
}

impl<const D: usize> DenseGrid<D> {
    /// Allocate a zero-filled grid.
    pub fn zeros(shape: [usize; D]) -> Self {
        Self::full(shape, 0.0)
    }

    /// Allocate a grid with every cell set to `value`.
    pub fn full(shape: [usize; D], value: f32) -> Self {
        let strides = row_major_strides(shape);
        let len = shape.iter().product();
        Self {
            shape,
            strides,
            data: vec![value; len],
        }
    }

    /// Wrap existing row-major data.
    ///
    /// Fails with `ShapeMismatch` on axis 0 if `data.len()` does not equal the
    /// product of `shape`; `expected`/`got` then carry the flat lengths.
    pub fn from_vec(shape: [usize; D], data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(VoxfieldError::ShapeMismatch {
                axis: 0,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            shape,
            strides: row_major_strides(shape),
            data,
        })
    }

    /// Cells per axis.
    #[inline]
    pub fn shape(&self) -> [usize; D] {
        self.shape
    }

    /// Row-major strides in elements.
    #[inline]
    pub fn strides(&self) -> [usize; D] {
        self.strides
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the grid holds no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat offset of a cell. The index must be in range.
    #[inline]
    pub fn offset(&self, index: [usize; D]) -> usize {
        debug_assert!(index.iter().zip(self.shape.iter()).all(|(i, n)| i < n));
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum()
    }

    /// Value at a cell, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: [usize; D]) -> Option<f32> {
        if index.iter().zip(self.shape.iter()).any(|(i, n)| i >= n) {
            return None;
        }
        Some(self.data[self.offset(index)])
    }

    /// Add `value` into a cell. The index must be in range.
    #[inline]
    pub fn add_at(&mut self, index: [usize; D], value: f32) {
        let offset = self.offset(index);
        self.data[offset] += value;
    }

    /// Flat row-major view.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable flat row-major view.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the grid, returning its row-major data.
    #[inline]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Sum of every cell.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Element-wise add another grid of the same shape.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.check_shape(other.shape)?;
        self.add_same_shape(other);
        Ok(())
    }

    /// Element-wise add; shapes must already match.
    #[inline]
    pub(crate) fn add_same_shape(&mut self, other: &Self) {
        debug_assert_eq!(self.shape, other.shape);
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
    }

    /// Fail with `ShapeMismatch` unless this grid has exactly `expected` shape.
    pub fn check_shape(&self, expected: [usize; D]) -> Result<()> {
        for axis in 0..D {
            if self.shape[axis] != expected[axis] {
                return Err(VoxfieldError::ShapeMismatch {
                    axis,
                    expected: expected[axis],
                    got: self.shape[axis],
                });
            }
        }
        Ok(())
    }
}

fn row_major_strides<const D: usize>(shape: [usize; D]) -> [usize; D] {
    let mut strides = [1usize; D];
    for axis in (0..D.saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}
