//! Kernel accumulator: Gaussian splatting and potential evaluation.
//!
//! Each point is located in grid-index space, its kernel window is clipped to
//! the grid (see [`crate::window`]) and the matching kernel sub-block is either
//! added into the grid ([`splat`]) or correlated against a field
//! ([`potential`]). Points never observe each other's updates; accumulation is
//! plain addition, so only float rounding depends on point order.

use alloc::vec::Vec;

use crate::config::{GridSpec, KernelSpec};
use crate::error::Result;
use crate::grid::{check_cells, DenseGrid};
use crate::kernel::GaussianKernel;
use crate::rasterize::{grid_shape, normalize};
use crate::window::Window;

/// Integer grid location of each point.
///
/// Points are normalized with [`normalize`], clamped into `[0, len - 1]` on
/// every axis, then floored. Fails with `DegenerateGrid` if `shape` has an
/// empty axis.
pub fn locate<const D: usize>(
    points: &[[f32; D]],
    spec: &GridSpec<D>,
    shape: [usize; D],
) -> Result<Vec<[usize; D]>> {
    check_cells(shape)?;
    let normalized = normalize(points, spec)?;

    let locations = normalized
        .points
        .iter()
        .map(|p| {
            let mut loc = [0usize; D];
            for axis in 0..D {
                let last = (shape[axis] - 1) as f32;
                loc[axis] = p[axis].clamp(0.0, last) as usize;
            }
            loc
        })
        .collect();
    Ok(locations)
}

fn splat_locations<const D: usize>(
    grid: &mut DenseGrid<D>,
    locations: &[[usize; D]],
    kernel: &GaussianKernel<D>,
) {
    let shape = grid.shape();
    let grid_strides = grid.strides();
    let kernel_strides = kernel.values().strides();
    let weights = kernel.values().as_slice();
    let cells = grid.as_mut_slice();

    for &loc in locations {
        let window = Window::clip(loc, shape, kernel.k2());
        window.for_each_row(grid_strides, kernel_strides, |g, k, run| {
            for (cell, w) in cells[g..g + run].iter_mut().zip(&weights[k..k + run]) {
                *cell += *w;
            }
        });
    }
}

/// Add one truncated Gaussian per point into `grid`.
///
/// `grid` must have the shape implied by `spec`. Near the border the kernel
/// is clipped, never shifted: its peak always lands on the point's cell.
pub fn splat<const D: usize>(
    points: &[[f32; D]],
    grid: &mut DenseGrid<D>,
    kernel: &GaussianKernel<D>,
    spec: &GridSpec<D>,
) -> Result<()> {
    let shape = grid_shape(spec)?;
    grid.check_shape(shape)?;

    let locations = locate(points, spec, shape)?;
    splat_locations(grid, &locations, kernel);
    Ok(())
}

/// Allocate the grid for `spec` and splat every point into it.
pub fn splat_field<const D: usize>(
    points: &[[f32; D]],
    spec: &GridSpec<D>,
    kernel_spec: &KernelSpec,
) -> Result<DenseGrid<D>> {
    let kernel = GaussianKernel::from_spec(kernel_spec)?;
    let shape = grid_shape(spec)?;

    let mut grid = DenseGrid::zeros(shape);
    splat(points, &mut grid, &kernel, spec)?;

    if points.is_empty() {
        log::warn!("splatting an empty point set, field is all zeros");
    }
    Ok(grid)
}

/// Parallel [`splat`]: points are split into chunks, each chunk is splatted
/// into its own partial grid, and the partial grids are summed.
#[cfg(feature = "rayon")]
pub fn par_splat<const D: usize>(
    points: &[[f32; D]],
    grid: &mut DenseGrid<D>,
    kernel: &GaussianKernel<D>,
    spec: &GridSpec<D>,
) -> Result<()> {
    use rayon::prelude::*;

    const CHUNK: usize = 1024;

    let shape = grid_shape(spec)?;
    grid.check_shape(shape)?;

    let locations = locate(points, spec, shape)?;
    let partial = locations
        .par_chunks(CHUNK)
        .fold(
            || DenseGrid::zeros(shape),
            |mut acc, chunk| {
                splat_locations(&mut acc, chunk, kernel);
                acc
            },
        )
        .reduce_with(|mut a, b| {
            a.add_same_shape(&b);
            a
        });

    if let Some(partial) = partial {
        grid.add_same_shape(&partial);
    }
    Ok(())
}

/// Correlate a kernel window around each point against `field` and sum.
///
/// Returns `Σ_points Σ_window field · kernel`. `field` must have the shape
/// implied by `spec`. The running total is kept in f64.
pub fn potential<const D: usize>(
    points: &[[f32; D]],
    field: &DenseGrid<D>,
    kernel: &GaussianKernel<D>,
    spec: &GridSpec<D>,
) -> Result<f32> {
    let shape = grid_shape(spec)?;
    field.check_shape(shape)?;

    let locations = locate(points, spec, shape)?;
    let grid_strides = field.strides();
    let kernel_strides = kernel.values().strides();
    let weights = kernel.values().as_slice();
    let cells = field.as_slice();

    let mut total = 0.0f64;
    for loc in locations {
        let window = Window::clip(loc, shape, kernel.k2());
        let mut point_sum = 0.0f32;
        window.for_each_row(grid_strides, kernel_strides, |g, k, run| {
            point_sum += cells[g..g + run]
                .iter()
                .zip(&weights[k..k + run])
                .map(|(c, w)| c * w)
                .sum::<f32>();
        });
        total += point_sum as f64;
    }
    Ok(total as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoxfieldError;
    use alloc::vec;

    /// 5x5 grid over [0, 5)² with unit voxels: world == grid space.
    fn unit_spec_2d() -> GridSpec<2> {
        GridSpec::uniform(1.0, 0.0, 5.0)
    }

    #[test]
    fn test_locate_clamps_into_grid() {
        let spec = unit_spec_2d();
        let locs = locate(&[[2.5, 2.5], [5.0, -1.0], [4.99, 0.0]], &spec, [5, 5]).unwrap();
        assert_eq!(locs, vec![[2, 2], [4, 0], [4, 0]]);
    }

    #[test]
    fn test_splat_interior_point_2d() {
        let spec = unit_spec_2d();
        let kernel = GaussianKernel::<2>::centered(3, 0.5).unwrap();
        let mut grid = DenseGrid::zeros([5, 5]);
        splat(&[[2.5, 2.5]], &mut grid, &kernel, &spec).unwrap();

        assert_eq!(grid.get([2, 2]), Some(1.0));
        for i in 0..5 {
            for j in 0..5 {
                let v = grid.get([i, j]).unwrap();
                if (1..=3).contains(&i) && (1..=3).contains(&j) {
                    assert_eq!(v, kernel.get([i - 1, j - 1]).unwrap());
                } else {
                    assert_eq!(v, 0.0, "cell ({}, {}) outside window", i, j);
                }
            }
        }
        assert!((grid.sum() - kernel.sum()).abs() < 1e-6);
    }

    #[test]
    fn test_splat_corner_point_aligns_kernel() {
        let spec = unit_spec_2d();
        let kernel = GaussianKernel::<2>::centered(3, 0.5).unwrap();
        let mut grid = DenseGrid::zeros([5, 5]);
        splat(&[[0.0, 0.0]], &mut grid, &kernel, &spec).unwrap();

        // The 2x2 block at the origin equals kernel[1..3, 1..3].
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(grid.get([i, j]), kernel.get([i + 1, j + 1]));
            }
        }
        assert_eq!(grid.get([0, 0]), Some(1.0));
        assert_eq!(grid.get([2, 0]), Some(0.0));
    }

    #[test]
    fn test_splat_rejects_wrong_grid_shape() {
        let spec = unit_spec_2d();
        let kernel = GaussianKernel::<2>::centered(3, 0.5).unwrap();
        let mut grid = DenseGrid::zeros([5, 4]);
        assert_eq!(
            splat(&[[1.0, 1.0]], &mut grid, &kernel, &spec),
            Err(VoxfieldError::ShapeMismatch {
                axis: 1,
                expected: 5,
                got: 4
            })
        );
    }

    #[test]
    fn test_potential_all_ones_interior() {
        let spec = unit_spec_2d();
        let kernel = GaussianKernel::<2>::centered(3, 0.5).unwrap();
        let field = DenseGrid::full([5, 5], 1.0);
        let p = potential(&[[2.5, 2.5]], &field, &kernel, &spec).unwrap();
        assert!((p - kernel.sum()).abs() < 1e-6);
    }

    #[test]
    fn test_splat_field_1d() {
        let spec = GridSpec::<1>::uniform(1.0, 0.0, 8.0);
        let grid = splat_field(&[[0.2], [7.9]], &spec, &KernelSpec::new(5, 1.0)).unwrap();
        let kernel = GaussianKernel::<1>::centered(5, 1.0).unwrap();

        // Both points are clipped to the kernel's right/left halves.
        assert_eq!(grid.get([0]), Some(1.0));
        assert_eq!(grid.get([7]), Some(1.0));
        assert_eq!(grid.get([2]), kernel.get([4]));
        assert_eq!(grid.get([5]), kernel.get([0]));
    }
}
