//! # MNIST GAN
//!
//! A minimal Generative Adversarial Network trained on MNIST digits. Two
//! fully-connected networks compete: the generator turns latent noise into
//! flattened 28x28 images, the discriminator scores images as real or fake.
//!
//! ## Modules
//!
//! - `data`: MNIST loading, a synthetic digit set and batching
//! - `model`: Generator and Discriminator architectures
//! - `training`: Training loop, loss functions and metrics
//! - `utils`: Configuration and ASCII previews
//!
//! ## Example
//!
//! ```no_run
//! use mnist_gan::{data::synthetic_digits, DataLoader, Gan, Trainer, TrainingConfig};
//! use tch::Device;
//!
//! # fn main() -> mnist_gan::Result<()> {
//! let config = TrainingConfig { epochs: 1, ..Default::default() };
//! let dataset = synthetic_digits(256, 0)?;
//! let mut loader = DataLoader::new(&dataset, config.batch_size, true, false);
//!
//! let gan = Gan::with_dims(config.latent_dim, config.image_dim, Device::Cpu);
//! let mut trainer = Trainer::new(config, &gan)?;
//! let metrics = trainer.train(&gan, &mut loader)?;
//! println!("final generator loss: {:?}", metrics.latest_gen_loss());
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod model;
pub mod training;
pub mod utils;

pub use data::{DataLoader, ImageDataset};
pub use error::{GanError, Result};
pub use model::{Discriminator, Gan, Generator};
pub use training::{Trainer, TrainingConfig, TrainingMetrics};
pub use utils::{ComputeTarget, Config};
