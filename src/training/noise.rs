//! Latent noise sources
//!
//! Training noise and visualization noise are kept apart: the sampler draws a
//! fresh batch for every training step, the probe is drawn once and only ever
//! pushed through the generator without gradients.

use tch::{Device, Kind, Tensor};

use crate::model::Generator;

/// Draws standard normal latent batches for training steps
#[derive(Debug, Clone, Copy)]
pub struct NoiseSampler {
    latent_dim: i64,
    device: Device,
}

impl NoiseSampler {
    /// Create a sampler for `latent_dim`-sized vectors on `device`
    pub fn new(latent_dim: i64, device: Device) -> Self {
        Self { latent_dim, device }
    }

    /// Fresh noise of shape (batch_size, latent_dim)
    pub fn sample(&self, batch_size: i64) -> Tensor {
        Tensor::randn([batch_size, self.latent_dim], (Kind::Float, self.device))
    }
}

/// Fixed latent batch used to watch the generator evolve over training
#[derive(Debug)]
pub struct FixedProbe {
    noise: Tensor,
}

impl FixedProbe {
    /// Draw the probe once
    pub fn new(size: i64, latent_dim: i64, device: Device) -> Self {
        let noise = Tensor::randn([size, latent_dim], (Kind::Float, device));
        Self { noise }
    }

    /// Number of probe vectors
    pub fn size(&self) -> i64 {
        self.noise.size()[0]
    }

    /// Generate images from the probe in inference mode, outside autograd
    pub fn sample(&self, generator: &Generator) -> Tensor {
        tch::no_grad(|| generator.generate(&self.noise))
    }
}
