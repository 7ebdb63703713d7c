//! Truncated Gaussian kernels in 1, 2 and 3 dimensions.
//!
//! A kernel samples `exp(-|i - c|² / (2·dev²))` at every integer offset
//! `i ∈ [0, ksize)^D`. Values are not normalized: the sample at the center is
//! exactly 1 and the sum depends on `ksize` and `dev`.

use crate::config::KernelSpec;
use crate::error::Result;
use crate::grid::DenseGrid;

/// Immutable discrete Gaussian kernel of side `ksize`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel<const D: usize> {
    spec: KernelSpec,
    center: [f32; D],
    values: DenseGrid<D>,
}

/// Sample a truncated Gaussian centered at `center` (in kernel cells).
///
/// Fails with `InvalidKernelSize` for an even or zero `ksize` and with
/// `InvalidDeviation` for a non-positive or non-finite `dev`.
///
/// The conventional center is `k2 = (ksize - 1) / 2` on every axis, see
/// [`GaussianKernel::centered`]; any other center is accepted.
pub fn gaussian_kernel<const D: usize>(
    center: [f32; D],
    ksize: usize,
    dev: f32,
) -> Result<GaussianKernel<D>> {
    let spec = KernelSpec::new(ksize, dev);
    spec.validate()?;

    let denom = 2.0 * dev * dev;
    let mut values = DenseGrid::zeros([ksize; D]);

    for (flat, value) in values.as_mut_slice().iter_mut().enumerate() {
        let mut rest = flat;
        let mut dist_sq = 0.0f32;
        for axis in (0..D).rev() {
            let i = (rest % ksize) as f32;
            rest /= ksize;
            let d = i - center[axis];
            dist_sq += d * d;
        }
        *value = libm::expf(-dist_sq / denom);
    }

    Ok(GaussianKernel {
        spec,
        center,
        values,
    })
}

impl<const D: usize> GaussianKernel<D> {
    /// Kernel peaked at its own center cell.
    pub fn centered(ksize: usize, dev: f32) -> Result<Self> {
        let k2 = (ksize.saturating_sub(1) / 2) as f32;
        gaussian_kernel([k2; D], ksize, dev)
    }

    /// Centered kernel from a [`KernelSpec`].
    pub fn from_spec(spec: &KernelSpec) -> Result<Self> {
        Self::centered(spec.ksize, spec.dev)
    }

    /// Kernel parameters.
    #[inline]
    pub fn spec(&self) -> KernelSpec {
        self.spec
    }

    /// Side length.
    #[inline]
    pub fn ksize(&self) -> usize {
        self.spec.ksize
    }

    /// Half-width `(ksize - 1) / 2`.
    #[inline]
    pub fn k2(&self) -> usize {
        self.spec.k2()
    }

    /// Standard deviation in cells.
    #[inline]
    pub fn dev(&self) -> f32 {
        self.spec.dev
    }

    /// Center the kernel was sampled around.
    #[inline]
    pub fn center(&self) -> [f32; D] {
        self.center
    }

    /// Sampled values as a `[ksize; D]` grid.
    #[inline]
    pub fn values(&self) -> &DenseGrid<D> {
        &self.values
    }

    /// Value at a kernel cell, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: [usize; D]) -> Option<f32> {
        self.values.get(index)
    }

    /// Sum of all samples.
    pub fn sum(&self) -> f32 {
        self.values.sum()
    }
}

#[cfg(feature = "std")]
pub use cache::KernelCache;

#[cfg(feature = "std")]
mod cache {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::GaussianKernel;
    use crate::config::KernelSpec;
    use crate::error::Result;

    /// Memoizes centered kernels keyed on `(ksize, dev)`.
    ///
    /// Kernels are immutable, so one instance is shared by every caller that
    /// asks for the same parameters.
    #[derive(Debug, Default)]
    pub struct KernelCache<const D: usize> {
        kernels: Mutex<HashMap<(usize, u32), Arc<GaussianKernel<D>>>>,
    }

    impl<const D: usize> KernelCache<D> {
        /// Create an empty cache.
        pub fn new() -> Self {
            Self {
                kernels: Mutex::new(HashMap::new()),
            }
        }

        /// Fetch or build the centered kernel for `spec`.
        pub fn get(&self, spec: KernelSpec) -> Result<Arc<GaussianKernel<D>>> {
            let key = (spec.ksize, spec.dev.to_bits());
            let mut kernels = self.kernels.lock().unwrap_or_else(|e| e.into_inner());

            if let Some(kernel) = kernels.get(&key) {
                return Ok(Arc::clone(kernel));
            }

            let kernel = Arc::new(GaussianKernel::from_spec(&spec)?);
            log::debug!(
                "cached {}D gaussian kernel ksize={} dev={}",
                D,
                spec.ksize,
                spec.dev
            );
            kernels.insert(key, Arc::clone(&kernel));
            Ok(kernel)
        }

        /// Number of cached kernels.
        pub fn len(&self) -> usize {
            self.kernels.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        /// True if nothing has been cached yet.
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }
}
