//! Discriminator network
//!
//! The Discriminator scores flattened images with the probability of being real.
//! Architecture is a fully-connected stack that narrows down to a single unit.

use tch::{nn, nn::Module, nn::ModuleT, Tensor};

use super::{leaky_relu, LEAKY_SLOPE};

/// Discriminator network configuration
#[derive(Debug, Clone)]
pub struct DiscriminatorConfig {
    /// Size of the flattened input image
    pub image_dim: i64,
    /// Widths of the two hidden layers
    pub hidden_dims: [i64; 2],
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            image_dim: 784,
            hidden_dims: [512, 128],
        }
    }
}

/// Discriminator network
///
/// Architecture:
/// 1. Linear(image_dim -> 512), BatchNorm1d, LeakyReLU(0.1)
/// 2. Linear(512 -> 128), BatchNorm1d, LeakyReLU(0.1)
/// 3. Linear(128 -> 1), Sigmoid
#[derive(Debug)]
pub struct Discriminator {
    config: DiscriminatorConfig,
    fc1: nn::Linear,
    bn1: nn::BatchNorm,
    fc2: nn::Linear,
    bn2: nn::BatchNorm,
    pub(crate) out: nn::Linear,
}

impl Discriminator {
    /// Create a new Discriminator, registering its variables under `vs`
    pub fn new(vs: &nn::Path, config: DiscriminatorConfig) -> Self {
        let [h1, h2] = config.hidden_dims;

        let fc1 = nn::linear(vs / "fc1", config.image_dim, h1, Default::default());
        let bn1 = nn::batch_norm1d(vs / "bn1", h1, Default::default());

        let fc2 = nn::linear(vs / "fc2", h1, h2, Default::default());
        let bn2 = nn::batch_norm1d(vs / "bn2", h2, Default::default());

        let out = nn::linear(vs / "out", h2, 1, Default::default());

        Self {
            config,
            fc1,
            bn1,
            fc2,
            bn2,
            out,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `images` - Tensor of shape (batch_size, image_dim)
    /// * `train` - Whether in training mode (affects batch norm)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1) with realness probabilities (after sigmoid)
    pub fn forward_t(&self, images: &Tensor, train: bool) -> Tensor {
        let x = self.fc1.forward(images);
        let x = self.bn1.forward_t(&x, train);
        let x = leaky_relu(&x, LEAKY_SLOPE);

        let x = self.fc2.forward(&x);
        let x = self.bn2.forward_t(&x, train);
        let x = leaky_relu(&x, LEAKY_SLOPE);

        self.out.forward(&x).sigmoid()
    }

    /// Classify samples (inference mode)
    pub fn classify(&self, images: &Tensor) -> Tensor {
        self.forward_t(images, false)
    }

    /// Get configuration
    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }
}

impl ModuleT for Discriminator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Discriminator::forward_t(self, xs, train)
    }
}
