//! Synthetic digit-like images for offline runs
//!
//! Ten simple stroke patterns on a 28x28 grid, each sample randomly shifted
//! and dimmed so the set is not ten exact copies. Good enough to smoke-test the
//! training loop without the MNIST files.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tch::Tensor;

use super::dataset::ImageDataset;
use crate::error::{GanError, Result};

/// Side length of a synthetic image
pub const SIDE: usize = 28;

/// Number of distinct patterns
pub const NUM_CLASSES: usize = 10;

/// Whether pixel (row, col) is lit for pattern `digit`
fn stroke(digit: usize, row: i64, col: i64) -> bool {
    let ring = |cr: f32, cc: f32, inner: f32, outer: f32| {
        let dist = ((row as f32 - cr).powi(2) + (col as f32 - cc).powi(2)).sqrt();
        dist > inner && dist < outer
    };
    let hbar = |r: i64| row == r && col > 8 && col < 20;

    match digit {
        0 => ring(14.0, 14.0, 8.0, 11.0),
        1 => (12..=15).contains(&col) && (4..24).contains(&row),
        2 => hbar(6) || hbar(22) || (row > 6 && row < 22 && col == 20 - (row - 6) * 11 / 16),
        3 => hbar(6) || hbar(14) || hbar(22) || (col == 19 && row > 6 && row < 22),
        4 => (col == 8 && row > 4 && row < 16) || hbar(15) || (col == 18 && row > 4 && row < 24),
        5 => {
            hbar(6)
                || hbar(14)
                || hbar(22)
                || (col == 9 && row > 6 && row < 14)
                || (col == 19 && row > 14 && row < 22)
        }
        6 => ring(17.0, 14.0, 3.5, 6.0) || (col == 9 && row > 6 && row < 17) || hbar(6),
        7 => hbar(6) || (row > 6 && row < 24 && col == 19 - (row - 6) / 3),
        8 => ring(10.0, 14.0, 2.5, 4.5) || ring(18.0, 14.0, 2.5, 4.5),
        _ => ring(10.0, 14.0, 3.5, 6.0) || (col == 19 && row > 10 && row < 24),
    }
}

/// Pixel matrix of shape (num_samples, 784) with values in [0, 1]
///
/// Sample `i` uses pattern `i % 10`.
pub fn synthetic_pixels(num_samples: usize, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = Array2::<f32>::zeros((num_samples, SIDE * SIDE));

    for (i, mut row_pixels) in pixels.outer_iter_mut().enumerate() {
        let digit = i % NUM_CLASSES;
        let dy: i64 = rng.gen_range(-2..=2);
        let dx: i64 = rng.gen_range(-2..=2);
        let intensity: f32 = rng.gen_range(0.7..=1.0);

        for j in 0..SIDE * SIDE {
            let row = (j / SIDE) as i64 - dy;
            let col = (j % SIDE) as i64 - dx;
            if stroke(digit, row, col) {
                row_pixels[j] = intensity;
            }
        }
    }

    pixels
}

/// Synthetic dataset, flattened and normalized like MNIST
pub fn synthetic_digits(num_samples: usize, seed: u64) -> Result<ImageDataset> {
    let pixels = synthetic_pixels(num_samples, seed);
    let flat = pixels
        .as_slice()
        .ok_or_else(|| GanError::Data("synthetic pixels are not contiguous".into()))?;

    let images = Tensor::from_slice(flat).reshape([num_samples as i64, (SIDE * SIDE) as i64]);
    let labels: Vec<i64> = (0..num_samples).map(|i| (i % NUM_CLASSES) as i64).collect();

    ImageDataset::from_unit_pixels(&images, Some(Tensor::from_slice(&labels)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_pixels_shape_and_range() {
        let pixels = synthetic_pixels(20, 0);

        assert_eq!(pixels.shape(), &[20, 784]);
        assert!(pixels.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // Every pattern lights up something
        for row in pixels.outer_iter() {
            assert!(row.iter().any(|&v| v > 0.0));
        }
    }

    #[test]
    fn test_synthetic_pixels_deterministic() {
        assert_eq!(synthetic_pixels(12, 5), synthetic_pixels(12, 5));
        assert_ne!(synthetic_pixels(12, 5), synthetic_pixels(12, 6));
    }

    #[test]
    fn test_synthetic_digits_normalized() {
        let dataset = synthetic_digits(10, 1).unwrap();

        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.image_dim(), 784);
        assert_eq!(dataset.images().min().double_value(&[]), -1.0);
        assert!(dataset.images().max().double_value(&[]) <= 1.0);
        assert_eq!(dataset.get(3).and_then(|(_, label)| label), Some(3));
    }
}
