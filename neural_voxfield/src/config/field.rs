//! Field rasterization configuration.

use burn::config::Config;
use voxfield_core::{GridSpec, KernelSpec};

use crate::error::{self, NeuralVoxfieldError};

/// Configuration for rasterizing point tensors into dense field tensors.
///
/// Per-axis vectors must all have the field dimensionality (1, 2 or 3).
#[derive(Config, Debug)]
pub struct FieldConfig {
    /// World units per cell, per axis.
    pub voxel_size: Vec<f32>,

    /// Lower corner of the region.
    pub min_bound: Vec<f32>,

    /// Upper corner of the region.
    pub max_bound: Vec<f32>,

    /// Gaussian kernel side length in cells (odd).
    #[config(default = 3)]
    pub ksize: usize,

    /// Gaussian kernel standard deviation in cells.
    #[config(default = 0.5)]
    pub dev: f32,
}

impl FieldConfig {
    /// Scene volume for Gaussian fields: 0.1 voxels over x, y in [-5, 5] and
    /// z in [-0.5, 3].
    pub fn scene_3d() -> Self {
        Self::from_spec(&GridSpec::<3>::scene(), KernelSpec::default())
    }

    /// Scene volume for center/corner interpolation: 0.1 voxels over
    /// x, y in [-3.84, 3.84] and z in [-0.2, 2.68].
    pub fn interpolation_3d() -> Self {
        Self::from_spec(&GridSpec::<3>::interpolation_scene(), KernelSpec::default())
    }

    /// Build from core grid and kernel specs.
    pub fn from_spec<const D: usize>(spec: &GridSpec<D>, kernel: KernelSpec) -> Self {
        Self::new(
            spec.voxel_size.to_vec(),
            spec.min_bound.to_vec(),
            spec.max_bound.to_vec(),
        )
        .with_ksize(kernel.ksize)
        .with_dev(kernel.dev)
    }

    /// Number of axes described by this config.
    pub fn dims(&self) -> usize {
        self.voxel_size.len()
    }

    /// Grid spec for a `D`-dimensional field.
    ///
    /// Fails with `InvalidConfig` if the per-axis vectors do not all have
    /// length `D`, and with the core error if the bounds are invalid.
    pub fn grid_spec<const D: usize>(&self) -> error::Result<GridSpec<D>> {
        let axes = [
            ("voxel_size", &self.voxel_size),
            ("min_bound", &self.min_bound),
            ("max_bound", &self.max_bound),
        ];
        for (name, values) in axes {
            if values.len() != D {
                return Err(NeuralVoxfieldError::InvalidConfig {
                    message: format!("{} has {} axes, expected {}", name, values.len(), D),
                });
            }
        }

        let mut spec = GridSpec::new([0.0; D], [0.0; D], [0.0; D]);
        spec.voxel_size.copy_from_slice(&self.voxel_size);
        spec.min_bound.copy_from_slice(&self.min_bound);
        spec.max_bound.copy_from_slice(&self.max_bound);
        spec.validate()?;
        Ok(spec)
    }

    /// Kernel parameters.
    #[inline]
    pub fn kernel_spec(&self) -> KernelSpec {
        KernelSpec::new(self.ksize, self.dev)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let dims = self.dims();
        if dims == 0 || dims > 3 {
            return Err(format!("field must have 1 to 3 axes, got {}", dims));
        }
        if self.min_bound.len() != dims || self.max_bound.len() != dims {
            return Err("voxel_size, min_bound and max_bound must have the same length".to_string());
        }
        self.kernel_spec().validate().map_err(|e| e.to_string())?;

        let shape_check = match dims {
            1 => self.checked_shape::<1>(),
            2 => self.checked_shape::<2>(),
            _ => self.checked_shape::<3>(),
        };
        shape_check.map_err(|e| e.to_string())
    }

    fn checked_shape<const D: usize>(&self) -> error::Result<()> {
        self.grid_spec::<D>()?.shape()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_presets() {
        let config = FieldConfig::scene_3d();
        assert_eq!(config.dims(), 3);
        assert_eq!(config.ksize, 3);
        assert_eq!(config.dev, 0.5);

        let spec = config.grid_spec::<3>().unwrap();
        assert_eq!(spec.shape().unwrap(), [100, 100, 35]);

        let spec = FieldConfig::interpolation_3d().grid_spec::<3>().unwrap();
        assert_eq!(spec.shape().unwrap(), [76, 76, 28]);
    }

    #[test]
    fn test_grid_spec_dimension_check() {
        let config = FieldConfig::new(vec![0.1, 0.1], vec![0.0, 0.0], vec![1.0, 1.0]);
        assert!(config.grid_spec::<2>().is_ok());
        assert!(matches!(
            config.grid_spec::<3>(),
            Err(NeuralVoxfieldError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validation() {
        let valid = FieldConfig::new(vec![0.5], vec![0.0], vec![4.0]);
        assert!(valid.validate().is_ok());

        let even_kernel = valid.clone().with_ksize(4);
        assert!(even_kernel.validate().is_err());

        let bad_bounds = FieldConfig {
            max_bound: vec![-1.0],
            ..valid.clone()
        };
        assert!(bad_bounds.validate().is_err());

        let ragged = FieldConfig {
            min_bound: vec![0.0, 0.0],
            ..valid.clone()
        };
        assert!(ragged.validate().is_err());

        let degenerate = FieldConfig::new(vec![10.0], vec![0.0], vec![4.0]);
        assert!(degenerate.validate().is_err());
    }
}
