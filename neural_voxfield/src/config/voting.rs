//! Plane voting head configuration.

use burn::config::Config;
use burn::prelude::Backend;

use crate::nn::VotingPlaneModule;

/// Configuration for [`VotingPlaneModule`].
#[derive(Config, Debug)]
pub struct VotingPlaneConfig {
    /// Channels of the per-seed features; also the hidden width of every branch.
    pub seed_feature_dim: usize,

    /// Channels concatenated onto the seed features before the head.
    #[config(default = 4)]
    pub extra_feature_dim: usize,

    /// Number of angle classes predicted per branch.
    #[config(default = 12)]
    pub num_angle_bins: usize,
}

impl VotingPlaneConfig {
    /// Channels expected on the input of the first convolution:
    /// seed coordinates plus seed and extra features.
    #[inline]
    pub fn input_channels(&self) -> usize {
        3 + self.seed_feature_dim + self.extra_feature_dim
    }

    /// Channels expected on the `seed_features` argument of the forward pass.
    #[inline]
    pub fn feature_channels(&self) -> usize {
        self.seed_feature_dim + self.extra_feature_dim
    }

    /// Initialize the voting head.
    pub fn init<B: Backend>(&self, device: &B::Device) -> VotingPlaneModule<B> {
        VotingPlaneModule::new(self, device)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.seed_feature_dim == 0 {
            return Err("seed_feature_dim must be > 0".to_string());
        }
        if self.num_angle_bins == 0 {
            return Err("num_angle_bins must be > 0".to_string());
        }
        Ok(())
    }
}
