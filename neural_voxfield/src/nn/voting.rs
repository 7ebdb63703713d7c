//! Plane voting head.
//!
//! For every seed point the head predicts, per axis family, a pair of
//! parallel planes: an angle class, an angle residual, a sign logit and two
//! offsets along the seed's z coordinate. The three families share the input
//! but not their weights.

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Relu};
use burn::prelude::*;

use crate::config::VotingPlaneConfig;
use crate::error::{NeuralVoxfieldError, Result};

/// Plane offsets predicted per seed and branch, one per plane of the pair.
pub const NUM_OFFSETS: usize = 2;

/// Axis family a branch votes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneAxis {
    /// Upper planes.
    Z,
    /// Front planes.
    Y,
    /// Left planes.
    X,
}

impl PlaneAxis {
    /// All families in forward order.
    pub const ALL: [PlaneAxis; 3] = [PlaneAxis::Z, PlaneAxis::Y, PlaneAxis::X];

    /// Short name used as an output key prefix (`z`, `y`, `x`).
    pub fn name(self) -> &'static str {
        match self {
            PlaneAxis::Z => "z",
            PlaneAxis::Y => "y",
            PlaneAxis::X => "x",
        }
    }
}

/// Predictions of one branch.
#[derive(Debug, Clone)]
pub struct AxisVotes<B: Backend> {
    /// Angle class logits: `[batch, num_angle_bins, num_seed]`.
    pub angle: Tensor<B, 3>,
    /// Angle residual: `[batch, 1, num_seed]`.
    pub residual: Tensor<B, 3>,
    /// Sign logit: `[batch, 1, num_seed]`.
    pub sign: Tensor<B, 3>,
    /// First offset: `[batch, num_seed]`.
    pub off0: Tensor<B, 2>,
    /// Second offset: `[batch, num_seed]`.
    pub off1: Tensor<B, 2>,
    /// First plane distance, `seed_z + off0`.
    pub d0: Tensor<B, 2>,
    /// Second plane distance, `seed_z + off1`.
    pub d1: Tensor<B, 2>,
}

/// Predictions of all three branches.
#[derive(Debug, Clone)]
pub struct PlaneVotes<B: Backend> {
    /// Upper planes.
    pub z: AxisVotes<B>,
    /// Front planes.
    pub y: AxisVotes<B>,
    /// Left planes.
    pub x: AxisVotes<B>,
}

impl<B: Backend> PlaneVotes<B> {
    /// Votes of one family.
    pub fn get(&self, axis: PlaneAxis) -> &AxisVotes<B> {
        match axis {
            PlaneAxis::Z => &self.z,
            PlaneAxis::Y => &self.y,
            PlaneAxis::X => &self.x,
        }
    }
}

/// One axis family: two 1x1 conv + batch norm + ReLU blocks, then four heads.
#[derive(Module, Debug)]
pub struct PlaneBranch<B: Backend> {
    conv1: Conv1d<B>,
    bn1: BatchNorm<B, 1>,
    conv2: Conv1d<B>,
    bn2: BatchNorm<B, 1>,
    angle: Conv1d<B>,
    residual: Conv1d<B>,
    sign: Conv1d<B>,
    offset: Conv1d<B>,
    activation: Relu,
}

impl<B: Backend> PlaneBranch<B> {
    /// Create a branch from configuration.
    pub fn new(config: &VotingPlaneConfig, device: &B::Device) -> Self {
        let hidden = config.seed_feature_dim;
        let head = |out: usize| Conv1dConfig::new(hidden, out, 1).init(device);

        Self {
            conv1: Conv1dConfig::new(config.input_channels(), hidden, 1).init(device),
            bn1: BatchNormConfig::new(hidden).init(device),
            conv2: Conv1dConfig::new(hidden, hidden, 1).init(device),
            bn2: BatchNormConfig::new(hidden).init(device),
            angle: head(config.num_angle_bins),
            residual: head(1),
            sign: head(1),
            offset: head(NUM_OFFSETS),
            activation: Relu::new(),
        }
    }

    /// Forward pass.
    ///
    /// `input`: `[batch, input_channels, num_seed]`; `seed_z`: `[batch, num_seed]`.
    pub fn forward(&self, input: Tensor<B, 3>, seed_z: Tensor<B, 2>) -> AxisVotes<B> {
        let x = self.conv1.forward(input);
        let x = self.activation.forward(self.bn1.forward(x));
        let x = self.conv2.forward(x);
        let x = self.activation.forward(self.bn2.forward(x));

        let offsets = self.offset.forward(x.clone());
        let [batch, _, num_seed] = offsets.dims();
        let off0: Tensor<B, 2> = offsets
            .clone()
            .slice([0..batch, 0..1, 0..num_seed])
            .squeeze(1);
        let off1: Tensor<B, 2> = offsets.slice([0..batch, 1..2, 0..num_seed]).squeeze(1);

        AxisVotes {
            angle: self.angle.forward(x.clone()),
            residual: self.residual.forward(x.clone()),
            sign: self.sign.forward(x),
            d0: seed_z.clone() + off0.clone(),
            d1: seed_z + off1.clone(),
            off0,
            off1,
        }
    }
}

/// Plane voting head over seed points.
///
/// Every seed produces exactly one vote per family.
#[derive(Module, Debug)]
pub struct VotingPlaneModule<B: Backend> {
    z: PlaneBranch<B>,
    y: PlaneBranch<B>,
    x: PlaneBranch<B>,
    #[module(skip)]
    feature_channels: usize,
}

impl<B: Backend> VotingPlaneModule<B> {
    /// Create a new voting head from configuration.
    pub fn new(config: &VotingPlaneConfig, device: &B::Device) -> Self {
        Self {
            z: PlaneBranch::new(config, device),
            y: PlaneBranch::new(config, device),
            x: PlaneBranch::new(config, device),
            feature_channels: config.feature_channels(),
        }
    }

    /// Channels expected on `seed_features`.
    pub fn feature_channels(&self) -> usize {
        self.feature_channels
    }

    /// Branch of one family.
    pub fn branch(&self, axis: PlaneAxis) -> &PlaneBranch<B> {
        match axis {
            PlaneAxis::Z => &self.z,
            PlaneAxis::Y => &self.y,
            PlaneAxis::X => &self.x,
        }
    }

    /// Forward pass.
    ///
    /// `seed_xyz`: `[batch, num_seed, 3]`;
    /// `seed_features`: `[batch, feature_channels, num_seed]`.
    /// Shapes are not checked; see [`Self::try_forward`].
    pub fn forward(&self, seed_xyz: Tensor<B, 3>, seed_features: Tensor<B, 3>) -> PlaneVotes<B> {
        let [batch, num_seed, _] = seed_xyz.dims();

        let seed_z: Tensor<B, 2> = seed_xyz
            .clone()
            .slice([0..batch, 0..num_seed, 2..3])
            .squeeze(2);
        let input = Tensor::cat(vec![seed_xyz.swap_dims(1, 2), seed_features], 1);

        PlaneVotes {
            z: self.z.forward(input.clone(), seed_z.clone()),
            y: self.y.forward(input.clone(), seed_z.clone()),
            x: self.x.forward(input, seed_z),
        }
    }

    /// Forward pass after checking both input shapes.
    pub fn try_forward(
        &self,
        seed_xyz: Tensor<B, 3>,
        seed_features: Tensor<B, 3>,
    ) -> Result<PlaneVotes<B>> {
        let [batch, num_seed, coords] = seed_xyz.dims();
        if coords != 3 {
            return Err(NeuralVoxfieldError::ShapeMismatch {
                expected: vec![batch, num_seed, 3],
                got: vec![batch, num_seed, coords],
            });
        }

        let expected = [batch, self.feature_channels, num_seed];
        let got = seed_features.dims();
        if got != expected {
            return Err(NeuralVoxfieldError::ShapeMismatch {
                expected: expected.to_vec(),
                got: got.to_vec(),
            });
        }

        Ok(self.forward(seed_xyz, seed_features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    fn small_config() -> VotingPlaneConfig {
        VotingPlaneConfig::new(8)
    }

    #[test]
    fn test_output_shapes() {
        let device = Default::default();
        let config = small_config();
        let head = VotingPlaneModule::<TestBackend>::new(&config, &device);

        let seed_xyz = Tensor::random([2, 16, 3], Distribution::Default, &device);
        let features = Tensor::random([2, 12, 16], Distribution::Default, &device);
        let votes = head.forward(seed_xyz, features);

        for axis in PlaneAxis::ALL {
            let v = votes.get(axis);
            assert_eq!(v.angle.dims(), [2, 12, 16], "{}", axis.name());
            assert_eq!(v.residual.dims(), [2, 1, 16]);
            assert_eq!(v.sign.dims(), [2, 1, 16]);
            assert_eq!(v.off0.dims(), [2, 16]);
            assert_eq!(v.off1.dims(), [2, 16]);
            assert_eq!(v.d0.dims(), [2, 16]);
            assert_eq!(v.d1.dims(), [2, 16]);
        }
    }

    #[test]
    fn test_distances_anchor_on_seed_z() {
        let device = Default::default();
        let head = VotingPlaneModule::<TestBackend>::new(&small_config(), &device);

        let seed_xyz = Tensor::from_data(
            TensorData::new(vec![0.1f32, 0.2, 1.5, -0.3, 0.4, 2.5], [1, 2, 3]),
            &device,
        );
        let features = Tensor::random([1, 12, 2], Distribution::Default, &device);
        let votes = head.forward(seed_xyz, features);

        let seed_z = Tensor::<TestBackend, 2>::from_data([[1.5f32, 2.5]], &device);
        for axis in PlaneAxis::ALL {
            let v = votes.get(axis);
            let diff0 = (v.d0.clone() - v.off0.clone() - seed_z.clone()).abs().max();
            let diff1 = (v.d1.clone() - v.off1.clone() - seed_z.clone()).abs().max();
            assert!(diff0.into_scalar() < 1e-5);
            assert!(diff1.into_scalar() < 1e-5);
        }
    }

    #[test]
    fn test_offset_head_has_one_channel_per_plane() {
        let device = Default::default();
        let branch = PlaneBranch::<TestBackend>::new(&small_config(), &device);

        let x = Tensor::random([1, 8, 5], Distribution::Default, &device);
        assert_eq!(branch.offset.forward(x).dims(), [1, NUM_OFFSETS, 5]);
    }

    #[test]
    fn test_try_forward_rejects_bad_shapes() {
        let device = Default::default();
        let head = VotingPlaneModule::<TestBackend>::new(&small_config(), &device);
        assert_eq!(head.feature_channels(), 12);

        let seed_xyz = Tensor::zeros([1, 4, 3], &device);
        let features = Tensor::zeros([1, 8, 4], &device);
        assert!(matches!(
            head.try_forward(seed_xyz, features),
            Err(NeuralVoxfieldError::ShapeMismatch { .. })
        ));

        let seed_xyz = Tensor::zeros([1, 4, 2], &device);
        let features = Tensor::zeros([1, 12, 4], &device);
        assert!(head.try_forward(seed_xyz, features).is_err());

        let seed_xyz = Tensor::zeros([1, 4, 3], &device);
        let features = Tensor::zeros([1, 12, 4], &device);
        assert!(head.try_forward(seed_xyz, features).is_ok());
    }

    #[test]
    fn test_gradients_reach_every_branch() {
        type AdBackend = Autodiff<NdArray>;

        let device = Default::default();
        let head = VotingPlaneModule::<AdBackend>::new(&small_config(), &device);

        let seed_xyz = Tensor::random([2, 8, 3], Distribution::Default, &device);
        let features = Tensor::random([2, 12, 8], Distribution::Default, &device);
        let votes = head.forward(seed_xyz, features);

        let loss = votes.z.d0.sum() + votes.y.angle.sum() + votes.x.sign.sum();
        let grads = loss.backward();

        assert!(head.z.offset.weight.grad(&grads).is_some());
        assert!(head.y.angle.weight.grad(&grads).is_some());
        assert!(head.x.sign.weight.grad(&grads).is_some());
        assert!(head.z.conv1.weight.grad(&grads).is_some());
    }
}
