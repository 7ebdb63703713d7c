//! Kernel window clipping.
//!
//! A point at integer grid location `loc` is covered by the kernel cells
//! `loc - k2 ..= loc + k2` on every axis. Near the grid border that range is
//! clipped to `0 ..= len - 1`, and the kernel range is shifted by the same
//! amount so the kernel peak stays on `loc`:
//!
//! ```text
//! grid:    max(0, loc - k2)        ..= min(len - 1, loc + k2)
//! kernel:  k2 - loc + grid_lo      ..= k2 - loc + grid_hi
//! ```
//!
//! Both ranges always have the same length.

/// Clipped window along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisWindow {
    /// First grid cell covered (inclusive).
    pub grid_lo: usize,
    /// Last grid cell covered (inclusive).
    pub grid_hi: usize,
    /// Kernel cell aligned with `grid_lo`.
    pub kernel_lo: usize,
}

#[allow(clippy::len_without_is_empty)]
impl AxisWindow {
    /// Clip the kernel support around `loc` to an axis of `len` cells.
    ///
    /// A `loc` past the end of the axis is clamped to the last cell.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    #[inline]
    pub fn clip(loc: usize, len: usize, k2: usize) -> Self {
        assert!(len > 0, "cannot clip a window to an empty axis");
        let loc = loc.min(len - 1);

        let grid_lo = loc.saturating_sub(k2);
        let grid_hi = (loc + k2).min(len - 1);
        // grid_lo >= loc - k2, so this never underflows.
        let kernel_lo = k2 + grid_lo - loc;

        Self {
            grid_lo,
            grid_hi,
            kernel_lo,
        }
    }

    /// Number of cells covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.grid_hi - self.grid_lo + 1
    }

    /// Last kernel cell used (inclusive).
    #[inline]
    pub fn kernel_hi(&self) -> usize {
        self.kernel_lo + self.len() - 1
    }
}

/// Per-point window over all D axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<const D: usize> {
    /// Per-axis clipping.
    pub axes: [AxisWindow; D],
}

impl<const D: usize> Window<D> {
    /// Clip a kernel of half-width `k2` centered on `loc` to a grid of `shape`.
    ///
    /// # Panics
    ///
    /// Panics if any axis of `shape` is zero; see [`AxisWindow::clip`].
    #[inline]
    pub fn clip(loc: [usize; D], shape: [usize; D], k2: usize) -> Self {
        let mut axes = [AxisWindow {
            grid_lo: 0,
            grid_hi: 0,
            kernel_lo: 0,
        }; D];
        for axis in 0..D {
            axes[axis] = AxisWindow::clip(loc[axis], shape[axis], k2);
        }
        Self { axes }
    }

    /// Window size per axis.
    #[inline]
    pub fn extent(&self) -> [usize; D] {
        let mut extent = [0usize; D];
        for axis in 0..D {
            extent[axis] = self.axes[axis].len();
        }
        extent
    }

    /// Number of cells in the window.
    #[inline]
    pub fn volume(&self) -> usize {
        self.axes.iter().map(AxisWindow::len).product()
    }

    /// True if the grid cell `index` lies inside the window.
    pub fn contains(&self, index: [usize; D]) -> bool {
        self.axes
            .iter()
            .zip(index.iter())
            .all(|(w, &i)| i >= w.grid_lo && i <= w.grid_hi)
    }

    /// Visit every contiguous row of the window.
    ///
    /// For each row along the last axis, `f(grid_start, kernel_start, run)`
    /// receives the flat offsets of the first cell in the grid and in the
    /// kernel, and the row length. Offsets use the given row-major strides.
    pub fn for_each_row<F>(&self, grid_strides: [usize; D], kernel_strides: [usize; D], mut f: F)
    where
        F: FnMut(usize, usize, usize),
    {
        if D == 0 {
            f(0, 0, 1);
            return;
        }

        let extent = self.extent();
        let last = D - 1;
        let run = extent[last];

        let mut counter = [0usize; D];
        loop {
            let mut grid_start = 0;
            let mut kernel_start = 0;
            for axis in 0..D {
                let w = &self.axes[axis];
                grid_start += (w.grid_lo + counter[axis]) * grid_strides[axis];
                kernel_start += (w.kernel_lo + counter[axis]) * kernel_strides[axis];
            }
            f(grid_start, kernel_start, run);

            // Advance the odometer over every axis except the last.
            let mut axis = last;
            loop {
                if axis == 0 {
                    return;
                }
                axis -= 1;
                counter[axis] += 1;
                if counter[axis] < extent[axis] {
                    break;
                }
                counter[axis] = 0;
            }
        }
    }

    /// Visit every `(grid_offset, kernel_offset)` pair of the window.
    pub fn for_each_pair<F>(&self, grid_strides: [usize; D], kernel_strides: [usize; D], mut f: F)
    where
        F: FnMut(usize, usize),
    {
        self.for_each_row(grid_strides, kernel_strides, |g, k, run| {
            for i in 0..run {
                f(g + i, k + i);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_interior_window_unclipped() {
        let w = AxisWindow::clip(5, 10, 1);
        assert_eq!(w.grid_lo, 4);
        assert_eq!(w.grid_hi, 6);
        assert_eq!(w.kernel_lo, 0);
        assert_eq!(w.kernel_hi(), 2);
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn test_window_clipped_low() {
        let w = AxisWindow::clip(0, 10, 2);
        assert_eq!((w.grid_lo, w.grid_hi), (0, 2));
        // Kernel cells 2..=4: the peak (index 2) lands on cell 0.
        assert_eq!((w.kernel_lo, w.kernel_hi()), (2, 4));
    }

    #[test]
    fn test_window_clipped_high() {
        let w = AxisWindow::clip(9, 10, 2);
        assert_eq!((w.grid_lo, w.grid_hi), (7, 9));
        assert_eq!((w.kernel_lo, w.kernel_hi()), (0, 2));
    }

    #[test]
    fn test_window_loc_past_end_clamps() {
        let w = AxisWindow::clip(14, 10, 2);
        assert_eq!(w, AxisWindow::clip(9, 10, 2));
        assert_eq!(w.len(), 3);
    }

    #[test]
    #[should_panic(expected = "empty axis")]
    fn test_window_empty_axis_panics() {
        let _ = AxisWindow::clip(0, 0, 1);
    }

    #[test]
    fn test_window_wider_than_axis() {
        let w = AxisWindow::clip(1, 3, 3);
        assert_eq!((w.grid_lo, w.grid_hi), (0, 2));
        assert_eq!((w.kernel_lo, w.kernel_hi()), (2, 4));
    }

    #[test]
    fn test_for_each_row_2d() {
        // 2x2 window at the origin of a 4x4 grid with a 3x3 kernel.
        let window = Window::<2>::clip([0, 0], [4, 4], 1);
        assert_eq!(window.extent(), [2, 2]);

        let mut rows = Vec::new();
        window.for_each_row([4, 1], [3, 1], |g, k, run| rows.push((g, k, run)));
        // Grid rows (0,0) and (1,0); kernel rows (1,1) and (2,1).
        assert_eq!(rows, [(0, 4, 2), (4, 7, 2)]);
    }

    #[test]
    fn test_for_each_pair_3d_count() {
        let window = Window::<3>::clip([2, 2, 2], [5, 5, 5], 1);
        let mut count = 0;
        window.for_each_pair([25, 5, 1], [9, 3, 1], |_, _| count += 1);
        assert_eq!(count, 27);
        assert_eq!(window.volume(), 27);
        assert!(window.contains([1, 3, 2]));
        assert!(!window.contains([0, 2, 2]));
    }
}
