//! Grid rasterizer: world coordinates to grid-index space, and multilinear
//! mass accumulation.
//!
//! Inputs are never modified; normalization returns a new point buffer.

use alloc::vec::Vec;

use crate::config::GridSpec;
use crate::error::{Result, VoxfieldError};
use crate::grid::{check_cells, DenseGrid};

/// Points rescaled into grid-index space.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoints<const D: usize> {
    /// `(clamp(p, min, max) - min) / voxel_size` per axis.
    pub points: Vec<[f32; D]>,
    /// How many input points had at least one coordinate outside the bounds.
    pub clamped: usize,
}

/// Reject NaN and infinite coordinates.
pub(crate) fn check_finite<const D: usize>(points: &[[f32; D]]) -> Result<()> {
    for (point, coords) in points.iter().enumerate() {
        if let Some(axis) = coords.iter().position(|c| !c.is_finite()) {
            return Err(VoxfieldError::OutOfRangeInput { point, axis });
        }
    }
    Ok(())
}

/// Clamp world coordinates into the spec bounds and rescale them to voxel units.
///
/// Points outside the bounds are clamped silently; the returned `clamped`
/// count reports how many were affected.
pub fn normalize<const D: usize>(
    points: &[[f32; D]],
    spec: &GridSpec<D>,
) -> Result<NormalizedPoints<D>> {
    spec.validate()?;
    check_finite(points)?;

    let mut clamped = 0usize;
    let normalized = points
        .iter()
        .map(|p| {
            let mut out = [0.0f32; D];
            let mut was_clamped = false;
            for axis in 0..D {
                let lo = spec.min_bound[axis];
                let hi = spec.max_bound[axis];
                let c = p[axis].clamp(lo, hi);
                was_clamped |= c != p[axis];
                out[axis] = (c - lo) / spec.voxel_size[axis];
            }
            clamped += was_clamped as usize;
            out
        })
        .collect();

    if clamped > 0 {
        log::debug!(
            "clamped {} of {} points into grid bounds",
            clamped,
            points.len()
        );
    }

    Ok(NormalizedPoints {
        points: normalized,
        clamped,
    })
}

/// Grid shape for a spec: `floor((max - min) / voxel_size)` per axis.
#[inline]
pub fn grid_shape<const D: usize>(spec: &GridSpec<D>) -> Result<[usize; D]> {
    spec.shape()
}

#[inline]
fn clamp_index(v: f32, len: usize) -> usize {
    if v <= 0.0 {
        0
    } else {
        (v as usize).min(len.saturating_sub(1))
    }
}

/// The `2^D` corner cells and weights of one grid-space point.
///
/// `low = floor(p)` and `high = low + 1` are clamped into `0..len` per axis,
/// and the fractional part is measured from the clamped `low`. A point on the
/// last cell therefore maps both corners to the same cell, which then
/// receives both weights.
///
/// Corner `mask` selects `high` on axis `a` when bit `D - 1 - a` is set.
/// An axis with no cells yields index 0; the accumulating callers reject
/// such shapes before indexing.
pub fn multilinear_corners<const D: usize>(
    point: [f32; D],
    shape: [usize; D],
) -> impl Iterator<Item = ([usize; D], f32)> {
    let mut low = [0usize; D];
    let mut high = [0usize; D];
    let mut frac = [0.0f32; D];
    for axis in 0..D {
        let floor = libm::floorf(point[axis]);
        low[axis] = clamp_index(floor, shape[axis]);
        high[axis] = clamp_index(floor + 1.0, shape[axis]);
        frac[axis] = point[axis] - low[axis] as f32;
    }

    (0..1usize << D).map(move |mask| {
        let mut index = [0usize; D];
        let mut weight = 1.0f32;
        for axis in 0..D {
            if (mask >> (D - 1 - axis)) & 1 == 1 {
                index[axis] = high[axis];
                weight *= frac[axis];
            } else {
                index[axis] = low[axis];
                weight *= 1.0 - frac[axis];
            }
        }
        (index, weight)
    })
}

/// Distribute one unit of mass per grid-space point across its `2^D`
/// surrounding cells with multilinear weights.
///
/// `points` must already be in grid-index space (see [`normalize`]).
pub fn interpolate_accumulate<const D: usize>(
    points: &[[f32; D]],
    grid: &mut DenseGrid<D>,
) -> Result<()> {
    check_finite(points)?;

    let shape = grid.shape();
    check_cells(shape)?;
    for point in points {
        for (index, weight) in multilinear_corners(*point, shape) {
            grid.add_at(index, weight);
        }
    }
    Ok(())
}

/// Normalize world points, allocate the grid for `spec`, and accumulate.
///
/// This is the full tri/bi/linear interpolation pipeline for D = 3/2/1.
pub fn interpolate<const D: usize>(
    points: &[[f32; D]],
    spec: &GridSpec<D>,
) -> Result<DenseGrid<D>> {
    let shape = grid_shape(spec)?;
    let normalized = normalize(points, spec)?;

    let mut grid = DenseGrid::zeros(shape);
    interpolate_accumulate(&normalized.points, &mut grid)?;
    Ok(grid)
}

/// Bilinear accumulation exactly as the legacy 2D plane helper wrote it.
///
/// That helper adds the `(high, low)` corner twice and never writes the
/// `(high, high)` corner, so a point receives
/// `1 - fx·fy + fx·(1 - fy)` units of mass instead of 1. Kept only to
/// reproduce old grids; use [`interpolate_accumulate`] for correct weights.
pub fn bilinear_accumulate_compat(points: &[[f32; 2]], grid: &mut DenseGrid<2>) -> Result<()> {
    check_finite(points)?;
    check_cells(grid.shape())?;

    let [nx, ny] = grid.shape();
    for p in points {
        let (fl_x, fl_y) = (libm::floorf(p[0]), libm::floorf(p[1]));
        let (lx, ly) = (clamp_index(fl_x, nx), clamp_index(fl_y, ny));
        let (hx, hy) = (clamp_index(fl_x + 1.0, nx), clamp_index(fl_y + 1.0, ny));
        let fx = p[0] - lx as f32;
        let fy = p[1] - ly as f32;

        grid.add_at([lx, ly], (1.0 - fx) * (1.0 - fy));
        grid.add_at([lx, hy], (1.0 - fx) * fy);
        grid.add_at([hx, ly], fx * (1.0 - fy));
        grid.add_at([hx, ly], fx * (1.0 - fy));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_normalize_rescales_and_clamps() {
        let spec = GridSpec::<2>::new([0.5, 0.25], [-1.0, 0.0], [1.0, 1.0]);
        let points = [[0.0, 0.5], [5.0, -3.0], [-1.0, 1.0]];
        let out = normalize(&points, &spec).unwrap();

        assert_eq!(out.points, vec![[2.0, 2.0], [4.0, 0.0], [0.0, 4.0]]);
        assert_eq!(out.clamped, 1);
        // Input untouched.
        assert_eq!(points[1], [5.0, -3.0]);
    }

    #[test]
    fn test_normalize_rejects_non_finite() {
        let spec = GridSpec::<3>::uniform(0.5, 0.0, 2.0);
        let points = [[0.0, 0.0, 0.0], [0.0, f32::NAN, 0.0]];
        assert_eq!(
            normalize(&points, &spec),
            Err(VoxfieldError::OutOfRangeInput { point: 1, axis: 1 })
        );

        let points = [[f32::INFINITY, 0.0, 0.0]];
        assert_eq!(
            normalize(&points, &spec),
            Err(VoxfieldError::OutOfRangeInput { point: 0, axis: 0 })
        );
    }

    #[test]
    fn test_corners_interior_weights() {
        let corners: Vec<_> = multilinear_corners([1.25, 2.5], [4, 4]).collect();
        assert_eq!(corners.len(), 4);
        assert_eq!(corners[0], ([1, 2], 0.75 * 0.5));
        assert_eq!(corners[1], ([1, 3], 0.75 * 0.5));
        assert_eq!(corners[2], ([2, 2], 0.25 * 0.5));
        assert_eq!(corners[3], ([2, 3], 0.25 * 0.5));
    }

    #[test]
    fn test_corners_collapse_on_last_cell() {
        // Point exactly on the far edge of a 4-cell axis.
        let corners: Vec<_> = multilinear_corners([4.0], [4]).collect();
        // low = 4 -> 3, high = 5 -> 3, f = 4 - 3 = 1.
        assert_eq!(corners, vec![([3], 0.0), ([3], 1.0)]);
    }

    #[test]
    fn test_interpolate_accumulate_1d() {
        let mut grid = DenseGrid::<1>::zeros([4]);
        interpolate_accumulate(&[[1.25], [3.0]], &mut grid).unwrap();

        let cells = grid.as_slice();
        assert!((cells[1] - 0.75).abs() < 1e-6);
        assert!((cells[2] - 0.25).abs() < 1e-6);
        // Second point sits on the last cell: both corners land on cell 3.
        assert!((cells[3] - 1.0).abs() < 1e-6);
        assert!((grid.sum() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_compat_reproduces_double_corner() {
        let mut compat = DenseGrid::<2>::zeros([4, 4]);
        bilinear_accumulate_compat(&[[1.5, 1.5]], &mut compat).unwrap();

        assert!((compat.get([1, 1]).unwrap() - 0.25).abs() < 1e-6);
        assert!((compat.get([1, 2]).unwrap() - 0.25).abs() < 1e-6);
        assert!((compat.get([2, 1]).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(compat.get([2, 2]), Some(0.0));

        let mut correct = DenseGrid::<2>::zeros([4, 4]);
        interpolate_accumulate(&[[1.5, 1.5]], &mut correct).unwrap();
        assert!((correct.get([2, 1]).unwrap() - 0.25).abs() < 1e-6);
        assert!((correct.get([2, 2]).unwrap() - 0.25).abs() < 1e-6);
    }
}
