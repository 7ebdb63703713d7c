//! Example: plane votes and a soft occupancy field for a synthetic room.
//!
//! Samples points on the floor, ceiling and two walls of a box-shaped room,
//! splats them into the default scene volume, measures how well a few probe
//! points agree with that field, and runs the voting head on the same points
//! with random seed features.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -p neural_voxfield --example plane_votes
//! ```

use burn::backend::NdArray;
use burn::prelude::*;
use burn::tensor::Distribution;

use neural_voxfield::prelude::*;

type MyBackend = NdArray;

/// Seed feature width fed to the voting head.
const SEED_FEATURES: usize = 64;

fn room_points() -> Vec<[f32; 3]> {
    let mut points = Vec::new();
    let steps = 12;
    for i in 0..steps {
        for j in 0..steps {
            let u = -2.0 + 4.0 * i as f32 / (steps - 1) as f32;
            let w = -2.0 + 4.0 * j as f32 / (steps - 1) as f32;
            let v = 2.5 * j as f32 / (steps - 1) as f32;
            points.push([u, w, 0.0]); // floor
            points.push([u, w, 2.5]); // ceiling
            points.push([-2.0, u, v]); // left wall
            points.push([u, 2.0, v]); // front wall
        }
    }
    points
}

fn main() -> Result<()> {
    env_logger::init();

    let device = Default::default();
    let points = room_points();
    let num_seed = points.len();
    println!("Sampled {} room points", num_seed);

    // Soft occupancy field
    let config = FieldConfig::scene_3d();
    let rasterizer = FieldRasterizer::<3>::new(&config)?;
    let flat: Vec<f32> = points.iter().flatten().copied().collect();
    let point_tensor =
        Tensor::<MyBackend, 2>::from_data(TensorData::new(flat, [num_seed, 3]), &device);

    let field = rasterizer.splat(point_tensor.clone())?;
    let mass: f32 = field.clone().sum().into_scalar();
    println!("Field shape {:?}, total mass {:.2}", field.dims(), mass);

    // Probe agreement: points on a wall score higher than points in free space
    let on_wall = Tensor::<MyBackend, 2>::from_data([[-2.0f32, 0.0, 1.0]], &device);
    let in_air = Tensor::<MyBackend, 2>::from_data([[0.5f32, -1.0, 1.2]], &device);
    let p_wall: f32 = rasterizer.potential(on_wall, field.clone())?.into_scalar();
    let p_air: f32 = rasterizer.potential(in_air, field)?.into_scalar();
    println!("Potential on wall {:.3}, in free space {:.3}", p_wall, p_air);

    // Plane votes
    let voting = VotingPlaneConfig::new(SEED_FEATURES);
    voting
        .validate()
        .map_err(|message| NeuralVoxfieldError::InvalidConfig { message })?;
    let head = voting.init::<MyBackend>(&device);

    let seed_xyz: Tensor<MyBackend, 3> = point_tensor.unsqueeze();
    let seed_features = Tensor::random(
        [1, voting.feature_channels(), num_seed],
        Distribution::Normal(0.0, 1.0),
        &device,
    );
    let votes = head.try_forward(seed_xyz, seed_features)?;

    for axis in PlaneAxis::ALL {
        let v = votes.get(axis);
        let bins = v.angle.clone().argmax(1).flatten::<1>(0, 2);
        let first_bin: Vec<i64> = bins
            .slice([0..1])
            .into_data()
            .convert::<i64>()
            .to_vec()
            .map_err(|e| NeuralVoxfieldError::InvalidData(format!("{:?}", e)))?;
        let mean_d0: f32 = v.d0.clone().mean().into_scalar();
        let mean_d1: f32 = v.d1.clone().mean().into_scalar();
        println!(
            "{}: first seed angle bin {}, mean d0 {:.3}, mean d1 {:.3}",
            axis.name(),
            first_bin[0],
            mean_d0,
            mean_d1
        );
    }

    Ok(())
}
