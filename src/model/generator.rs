//! Generator network
//!
//! The Generator maps latent noise vectors to flattened synthetic images.
//! Architecture is a fully-connected stack that widens towards the output.

use tch::{nn, nn::Module, nn::ModuleT, Device, Kind, Tensor};

use super::{leaky_relu, LEAKY_SLOPE};

/// Generator network configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Size of the latent noise vector
    pub latent_dim: i64,
    /// Size of the flattened output image (28 * 28 * 1 for MNIST)
    pub image_dim: i64,
    /// Widths of the two hidden layers
    pub hidden_dims: [i64; 2],
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_dim: 64,
            image_dim: 784,
            hidden_dims: [256, 512],
        }
    }
}

/// Generator network
///
/// Architecture:
/// 1. Linear(latent_dim -> 256), BatchNorm1d, LeakyReLU(0.1)
/// 2. Linear(256 -> 512), BatchNorm1d, LeakyReLU(0.1)
/// 3. Linear(512 -> image_dim), Tanh
///
/// Tanh keeps every output element in [-1, 1], the range real images are
/// normalized to.
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    fc1: nn::Linear,
    bn1: nn::BatchNorm,
    fc2: nn::Linear,
    bn2: nn::BatchNorm,
    out: nn::Linear,
}

impl Generator {
    /// Create a new Generator, registering its variables under `vs`
    pub fn new(vs: &nn::Path, config: GeneratorConfig) -> Self {
        let [h1, h2] = config.hidden_dims;

        let fc1 = nn::linear(vs / "fc1", config.latent_dim, h1, Default::default());
        let bn1 = nn::batch_norm1d(vs / "bn1", h1, Default::default());

        let fc2 = nn::linear(vs / "fc2", h1, h2, Default::default());
        let bn2 = nn::batch_norm1d(vs / "bn2", h2, Default::default());

        // No normalization after the output layer, only the squashing
        let out = nn::linear(vs / "out", h2, config.image_dim, Default::default());

        Self {
            config,
            fc1,
            bn1,
            fc2,
            bn2,
            out,
        }
    }

    /// Generate synthetic images from noise
    ///
    /// # Arguments
    ///
    /// * `noise` - Tensor of shape (batch_size, latent_dim)
    /// * `train` - Whether in training mode (batch statistics vs running statistics)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, image_dim) with values in [-1, 1]
    pub fn forward_t(&self, noise: &Tensor, train: bool) -> Tensor {
        let x = self.fc1.forward(noise);
        let x = self.bn1.forward_t(&x, train);
        let x = leaky_relu(&x, LEAKY_SLOPE);

        let x = self.fc2.forward(&x);
        let x = self.bn2.forward_t(&x, train);
        let x = leaky_relu(&x, LEAKY_SLOPE);

        self.out.forward(&x).tanh()
    }

    /// Generate samples (inference mode)
    pub fn generate(&self, noise: &Tensor) -> Tensor {
        self.forward_t(noise, false)
    }

    /// Generate samples from freshly drawn noise (inference mode)
    pub fn generate_random(&self, num_samples: i64, device: Device) -> Tensor {
        let noise = Tensor::randn([num_samples, self.config.latent_dim], (Kind::Float, device));
        self.generate(&noise)
    }

    /// Get configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl ModuleT for Generator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Generator::forward_t(self, xs, train)
    }
}
