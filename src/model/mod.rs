//! Model module containing the GAN networks
//!
//! This module provides:
//! - Generator network mapping latent noise to flattened images
//! - Discriminator network scoring flattened images as real or fake
//! - `Gan` wrapper owning both networks and their variable stores

mod discriminator;
mod gan;
mod generator;

pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use gan::{Gan, ParameterSnapshot};
pub use generator::{Generator, GeneratorConfig};

use tch::Tensor;

/// Negative slope shared by every hidden activation in both networks
pub const LEAKY_SLOPE: f64 = 0.1;

/// Leaky rectifier with an explicit negative slope
///
/// For `0 < slope < 1`, `max(x, slope * x)` is `x` on the positive side and
/// `slope * x` on the negative side.
pub(crate) fn leaky_relu(xs: &Tensor, slope: f64) -> Tensor {
    xs.maximum(&(xs * slope))
}
