//! Tensor-facing rasterization.

use burn::prelude::*;
#[cfg(not(feature = "rayon"))]
use voxfield_core::splat;
use voxfield_core::{grid_shape, interpolate, DenseGrid, GaussianKernel, GridSpec};

use super::convert::{grid_to_tensor, points_from_tensor};
use crate::config::FieldConfig;
use crate::error::{NeuralVoxfieldError, Result};

/// Rasterizes point tensors into field tensors over one fixed grid.
///
/// Holds the validated grid spec, its shape and a prebuilt kernel, so repeated
/// calls skip validation and kernel construction. Grids are built on the host
/// and uploaded to the device of the input points.
#[derive(Debug, Clone)]
pub struct FieldRasterizer<const D: usize> {
    spec: GridSpec<D>,
    shape: [usize; D],
    kernel: GaussianKernel<D>,
}

impl<const D: usize> FieldRasterizer<D> {
    /// Validate `config` and build the kernel.
    pub fn new(config: &FieldConfig) -> Result<Self> {
        let spec = config.grid_spec::<D>()?;
        let shape = grid_shape(&spec)?;
        let kernel = GaussianKernel::from_spec(&config.kernel_spec())?;

        log::debug!(
            "field rasterizer: shape {:?}, ksize {}, dev {}",
            shape,
            kernel.ksize(),
            kernel.dev()
        );

        Ok(Self {
            spec,
            shape,
            kernel,
        })
    }

    /// Grid spec.
    pub fn spec(&self) -> &GridSpec<D> {
        &self.spec
    }

    /// Shape of every field this rasterizer produces.
    pub fn shape(&self) -> [usize; D] {
        self.shape
    }

    /// Splatting kernel.
    pub fn kernel(&self) -> &GaussianKernel<D> {
        &self.kernel
    }

    /// Gaussian-splat `[N, D]` world points into a field tensor.
    pub fn splat<B: Backend>(&self, points: Tensor<B, 2>) -> Result<Tensor<B, D>> {
        let device = points.device();
        let grid = self.splat_grid(points)?;
        Ok(grid_to_tensor(&grid, &device))
    }

    /// Multilinear-interpolate `[N, D]` world points into a field tensor.
    pub fn interpolate<B: Backend>(&self, points: Tensor<B, 2>) -> Result<Tensor<B, D>> {
        let device = points.device();
        let points = points_from_tensor::<B, D>(points)?;
        let grid = interpolate(&points, &self.spec)?;
        log::debug!("interpolated {} points into {:?}", points.len(), self.shape);
        Ok(grid_to_tensor(&grid, &device))
    }

    /// Potential of `points` against `field`, as a one-element tensor.
    ///
    /// Computed as `sum(field * splat(points))`, which equals the windowed
    /// correlation by linearity and keeps the result differentiable with
    /// respect to `field`. Points carry no gradient.
    pub fn potential<B: Backend>(
        &self,
        points: Tensor<B, 2>,
        field: Tensor<B, D>,
    ) -> Result<Tensor<B, 1>> {
        self.check_field(&field)?;
        let weights = self.splat(points)?;
        Ok((field * weights).sum())
    }

    fn splat_grid<B: Backend>(&self, points: Tensor<B, 2>) -> Result<DenseGrid<D>> {
        let points = points_from_tensor::<B, D>(points)?;
        let mut grid = DenseGrid::zeros(self.shape);
        #[cfg(feature = "rayon")]
        voxfield_core::par_splat(&points, &mut grid, &self.kernel, &self.spec)?;
        #[cfg(not(feature = "rayon"))]
        splat(&points, &mut grid, &self.kernel, &self.spec)?;
        log::debug!("splatted {} points into {:?}", points.len(), self.shape);
        Ok(grid)
    }

    fn check_field<B: Backend>(&self, field: &Tensor<B, D>) -> Result<()> {
        let dims = field.dims();
        if dims != self.shape {
            return Err(NeuralVoxfieldError::ShapeMismatch {
                expected: self.shape.to_vec(),
                got: dims.to_vec(),
            });
        }
        Ok(())
    }
}

/// Gaussian-splat `[N, D]` world points into a `D`-dimensional field tensor.
pub fn splat_tensor<B: Backend, const D: usize>(
    points: Tensor<B, 2>,
    config: &FieldConfig,
) -> Result<Tensor<B, D>> {
    FieldRasterizer::<D>::new(config)?.splat(points)
}

/// Multilinear-interpolate `[N, D]` world points into a `D`-dimensional field tensor.
pub fn interpolate_tensor<B: Backend, const D: usize>(
    points: Tensor<B, 2>,
    config: &FieldConfig,
) -> Result<Tensor<B, D>> {
    FieldRasterizer::<D>::new(config)?.interpolate(points)
}

/// Differentiable potential of `points` against `field`.
///
/// See [`FieldRasterizer::potential`].
pub fn potential_tensor<B: Backend, const D: usize>(
    points: Tensor<B, 2>,
    field: Tensor<B, D>,
    config: &FieldConfig,
) -> Result<Tensor<B, 1>> {
    FieldRasterizer::<D>::new(config)?.potential(points, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn planar_config() -> FieldConfig {
        FieldConfig::new(vec![1.0, 1.0], vec![0.0, 0.0], vec![5.0, 5.0])
    }

    #[test]
    fn test_splat_interior_point() {
        let device = Default::default();
        let rasterizer = FieldRasterizer::<2>::new(&planar_config()).unwrap();
        let points: Tensor<TestBackend, 2> = Tensor::from_data([[2.5f32, 2.5]], &device);

        let field = rasterizer.splat(points).unwrap();
        assert_eq!(field.dims(), [5, 5]);

        let total: f32 = field.clone().sum().into_scalar();
        assert!((total - rasterizer.kernel().sum()).abs() < 1e-5);

        let peak: Vec<f32> = field.slice([2..3, 2..3]).into_data().to_vec().unwrap();
        assert_eq!(peak, vec![1.0]);
    }

    #[test]
    fn test_interpolate_conserves_mass() {
        let device = Default::default();
        let rasterizer = FieldRasterizer::<2>::new(&planar_config()).unwrap();
        let points: Tensor<TestBackend, 2> =
            Tensor::from_data([[0.3f32, 1.7], [3.2, 2.9], [9.0, -4.0]], &device);

        let field = rasterizer.interpolate(points).unwrap();
        let total: f32 = field.sum().into_scalar();
        assert!((total - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_potential_matches_core() {
        let device = Default::default();
        let config = planar_config();
        let rasterizer = FieldRasterizer::<2>::new(&config).unwrap();

        let coords = [[2.5f32, 2.5], [0.2, 4.9]];
        let field_grid = DenseGrid::from_vec([5, 5], (0..25).map(|i| i as f32 * 0.1).collect())
            .unwrap();

        let expected = voxfield_core::potential(
            &coords,
            &field_grid,
            rasterizer.kernel(),
            rasterizer.spec(),
        )
        .unwrap();

        let points: Tensor<TestBackend, 2> = Tensor::from_data(coords, &device);
        let field = grid_to_tensor::<TestBackend, 2>(&field_grid, &device);
        let got: f32 = rasterizer.potential(points, field).unwrap().into_scalar();

        assert!((got - expected).abs() < 1e-4, "{} vs {}", got, expected);
    }

    #[test]
    fn test_potential_rejects_wrong_field() {
        let device = Default::default();
        let rasterizer = FieldRasterizer::<2>::new(&planar_config()).unwrap();
        let points: Tensor<TestBackend, 2> = Tensor::from_data([[1.0f32, 1.0]], &device);
        let field: Tensor<TestBackend, 2> = Tensor::zeros([4, 5], &device);

        assert!(matches!(
            rasterizer.potential(points, field),
            Err(NeuralVoxfieldError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_free_functions_validate_config() {
        let device = Default::default();
        let points: Tensor<TestBackend, 2> = Tensor::from_data([[1.0f32, 1.0]], &device);
        let config = planar_config().with_ksize(2);

        let result = splat_tensor::<TestBackend, 2>(points, &config);
        assert!(matches!(result, Err(NeuralVoxfieldError::Voxel(_))));
    }
}
