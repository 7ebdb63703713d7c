//! Conversions between Burn tensors and core point sets and grids.

use burn::prelude::*;
use voxfield_core::DenseGrid;

use crate::error::{NeuralVoxfieldError, Result};

/// Read a `[N, D]` point tensor back as `N` fixed-size points.
pub fn points_from_tensor<B: Backend, const D: usize>(points: Tensor<B, 2>) -> Result<Vec<[f32; D]>> {
    let [n, dims] = points.dims();
    if dims != D {
        return Err(NeuralVoxfieldError::ShapeMismatch {
            expected: vec![n, D],
            got: vec![n, dims],
        });
    }

    let flat = read_f32(points)?;
    Ok(flat
        .chunks_exact(D)
        .map(|chunk| {
            let mut point = [0.0f32; D];
            point.copy_from_slice(chunk);
            point
        })
        .collect())
}

/// Upload a dense grid as a tensor with the same shape.
pub fn grid_to_tensor<B: Backend, const D: usize>(
    grid: &DenseGrid<D>,
    device: &B::Device,
) -> Tensor<B, D> {
    Tensor::from_data(
        TensorData::new(grid.as_slice().to_vec(), grid.shape()),
        device,
    )
}

/// Download a tensor into a dense grid with the same shape.
pub fn tensor_to_grid<B: Backend, const D: usize>(field: Tensor<B, D>) -> Result<DenseGrid<D>> {
    let shape = field.dims();
    let flat = read_f32(field)?;
    Ok(DenseGrid::from_vec(shape, flat)?)
}

fn read_f32<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| NeuralVoxfieldError::InvalidData(format!("{:?}", e)))
}
