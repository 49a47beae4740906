//! GAN wrapper combining Generator and Discriminator
//!
//! Each network owns its own `VarStore`, so optimizers built from one store can
//! never touch the other network's parameters.

use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Tensor};

use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{Generator, GeneratorConfig};
use crate::error::Result;

/// Complete GAN model
pub struct Gan {
    /// Generator network
    pub generator: Generator,
    /// Discriminator network
    pub discriminator: Discriminator,
    /// Variable store for generator
    pub gen_vs: VarStore,
    /// Variable store for discriminator
    pub disc_vs: VarStore,
    /// Device (CPU/GPU)
    pub device: Device,
}

impl Gan {
    /// Create a new GAN model
    ///
    /// # Arguments
    ///
    /// * `gen_config` - Generator configuration
    /// * `disc_config` - Discriminator configuration
    /// * `device` - Device to create model on
    pub fn new(
        gen_config: GeneratorConfig,
        disc_config: DiscriminatorConfig,
        device: Device,
    ) -> Self {
        let gen_vs = VarStore::new(device);
        let disc_vs = VarStore::new(device);

        let generator = Generator::new(&gen_vs.root(), gen_config);
        let discriminator = Discriminator::new(&disc_vs.root(), disc_config);

        Self {
            generator,
            discriminator,
            gen_vs,
            disc_vs,
            device,
        }
    }

    /// Create a GAN with the default hidden widths for the given dimensions
    pub fn with_dims(latent_dim: i64, image_dim: i64, device: Device) -> Self {
        let gen_config = GeneratorConfig {
            latent_dim,
            image_dim,
            ..Default::default()
        };
        let disc_config = DiscriminatorConfig {
            image_dim,
            ..Default::default()
        };

        Self::new(gen_config, disc_config, device)
    }

    /// Generate synthetic samples from freshly drawn noise (inference mode)
    pub fn generate(&self, num_samples: i64) -> Tensor {
        self.generator.generate_random(num_samples, self.device)
    }

    /// Probability of each sample being real (inference mode)
    pub fn discriminate(&self, samples: &Tensor) -> Tensor {
        self.discriminator.classify(samples)
    }

    /// Adam optimizer over the generator's variables only
    pub fn gen_optimizer(&self, lr: f64) -> Result<nn::Optimizer> {
        Ok(nn::Adam::default().build(&self.gen_vs, lr)?)
    }

    /// Adam optimizer over the discriminator's variables only
    pub fn disc_optimizer(&self, lr: f64) -> Result<nn::Optimizer> {
        Ok(nn::Adam::default().build(&self.disc_vs, lr)?)
    }

    /// Get latent dimension
    pub fn latent_dim(&self) -> i64 {
        self.generator.config().latent_dim
    }

    /// Get flattened image dimension
    pub fn image_dim(&self) -> i64 {
        self.generator.config().image_dim
    }

    /// Number of trainable scalars in (generator, discriminator)
    pub fn parameter_counts(&self) -> (usize, usize) {
        let count = |vs: &VarStore| {
            vs.trainable_variables()
                .iter()
                .map(|t| t.numel())
                .sum::<usize>()
        };
        (count(&self.gen_vs), count(&self.disc_vs))
    }

    /// Deep copy of the generator's trainable parameters
    pub fn snapshot_generator(&self) -> ParameterSnapshot {
        ParameterSnapshot::capture(&self.gen_vs)
    }

    /// Deep copy of the discriminator's trainable parameters
    pub fn snapshot_discriminator(&self) -> ParameterSnapshot {
        ParameterSnapshot::capture(&self.disc_vs)
    }
}

/// Frozen copy of a variable store's trainable parameters
///
/// Batch-norm running statistics are buffers, not parameters, and are left out.
#[derive(Debug)]
pub struct ParameterSnapshot {
    params: Vec<(String, Tensor)>,
}

impl ParameterSnapshot {
    /// Copy every trainable variable of `vs`
    pub fn capture(vs: &VarStore) -> Self {
        let mut params: Vec<(String, Tensor)> = vs
            .variables()
            .into_iter()
            .filter(|(_, t)| t.requires_grad())
            .map(|(name, t)| (name, t.detach().copy()))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));

        Self { params }
    }

    /// Number of captured tensors
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Names of the parameters whose values differ bitwise from `other`
    pub fn changed(&self, other: &ParameterSnapshot) -> Vec<String> {
        self.params
            .iter()
            .filter(|(name, t)| {
                other
                    .params
                    .iter()
                    .find(|(n, _)| n == name)
                    .map_or(true, |(_, o)| !t.equal(o))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Whether every parameter is bitwise identical to `other`
    pub fn matches(&self, other: &ParameterSnapshot) -> bool {
        self.len() == other.len() && self.changed(other).is_empty()
    }
}
