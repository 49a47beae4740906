//! Image preprocessing for GAN training
//!
//! Real images enter the discriminator flattened and scaled to [-1, 1], the
//! same range the generator's tanh produces.
//!
//! Pixels are first taken to [0, 1] (the "to tensor" step) and then normalized
//! with a per-channel mean of 0.5 and standard deviation of 0.5.

use tch::{Kind, Tensor};

/// Per-channel mean used for normalization
pub const PIXEL_MEAN: f64 = 0.5;

/// Per-channel standard deviation used for normalization
pub const PIXEL_STD: f64 = 0.5;

/// Normalize [0, 1] pixels to [-1, 1]
///
/// Formula: x_norm = (x - mean) / std
pub fn normalize(pixels: &Tensor) -> Tensor {
    (pixels.to_kind(Kind::Float) - PIXEL_MEAN) / PIXEL_STD
}

/// Map [-1, 1] values back to [0, 1] pixels
///
/// Formula: x = x_norm * std + mean
pub fn denormalize(images: &Tensor) -> Tensor {
    images.to_kind(Kind::Float) * PIXEL_STD + PIXEL_MEAN
}

/// Flatten every image of a batch into a single row
///
/// Accepts (N, H, W), (N, C, H, W) or already flat (N, D) batches.
pub fn flatten_images(images: &Tensor) -> Tensor {
    let n = images.size().first().copied().unwrap_or(0);
    images.reshape([n, -1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn test_normalize_range() {
        let pixels = Tensor::from_slice(&[0.0f32, 0.25, 0.5, 1.0]);
        let values = Vec::<f32>::try_from(&normalize(&pixels)).unwrap();

        assert_eq!(values, vec![-1.0, -0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_denormalize_inverts_normalize() {
        let pixels = Tensor::rand([3, 784], (Kind::Float, Device::Cpu));
        let restored = denormalize(&normalize(&pixels));

        let diff = (restored - &pixels).abs().max().double_value(&[]);
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_flatten_images() {
        let images = Tensor::zeros([5, 1, 28, 28], (Kind::Float, Device::Cpu));
        assert_eq!(flatten_images(&images).size(), vec![5, 784]);

        let images = Tensor::zeros([5, 28, 28], (Kind::Uint8, Device::Cpu));
        assert_eq!(flatten_images(&images).size(), vec![5, 784]);
    }
}
