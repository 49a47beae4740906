//! In-memory image dataset
//!
//! Images are stored flattened and already normalized to [-1, 1], one row per
//! sample. Labels are kept when the source has them but play no part in
//! training.

use tch::{Kind, Tensor};

use super::preprocessing::{flatten_images, normalize};
use crate::error::{GanError, Result};

/// Flattened, normalized images ready for batching
#[derive(Debug)]
pub struct ImageDataset {
    images: Tensor,
    labels: Option<Tensor>,
}

impl ImageDataset {
    /// Wrap images that are already flat and in [-1, 1]
    ///
    /// # Arguments
    ///
    /// * `images` - Tensor of shape (num_samples, image_dim)
    /// * `labels` - Optional tensor of shape (num_samples,)
    pub fn new(images: Tensor, labels: Option<Tensor>) -> Result<Self> {
        let size = images.size();
        if size.len() != 2 {
            return Err(GanError::Data(format!(
                "expected flattened images of rank 2, got shape {:?}",
                size
            )));
        }
        if let Some(labels) = &labels {
            if labels.size().first() != Some(&size[0]) {
                return Err(GanError::ShapeMismatch {
                    what: "labels",
                    expected: vec![size[0]],
                    actual: labels.size(),
                });
            }
        }

        Ok(Self {
            images: images.to_kind(Kind::Float),
            labels,
        })
    }

    /// Build from pixels in [0, 1], flattening and normalizing them
    pub fn from_unit_pixels(pixels: &Tensor, labels: Option<Tensor>) -> Result<Self> {
        Self::new(normalize(&flatten_images(pixels)), labels)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.images.size()[0] as usize
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one flattened image
    pub fn image_dim(&self) -> i64 {
        self.images.size()[1]
    }

    /// All images, shape (num_samples, image_dim)
    pub fn images(&self) -> &Tensor {
        &self.images
    }

    /// Labels, if the source provided any
    pub fn labels(&self) -> Option<&Tensor> {
        self.labels.as_ref()
    }

    /// Single image and its label
    pub fn get(&self, index: usize) -> Option<(Tensor, Option<i64>)> {
        if index >= self.len() {
            return None;
        }
        let i = index as i64;
        let label = self.labels.as_ref().map(|l| l.int64_value(&[i]));
        Some((self.images.get(i), label))
    }

    /// Keep only the first `n` samples
    pub fn truncate(self, n: usize) -> Self {
        if n >= self.len() {
            return self;
        }
        let n = n as i64;
        Self {
            images: self.images.narrow(0, 0, n),
            labels: self.labels.map(|l| l.narrow(0, 0, n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn test_from_unit_pixels() {
        let pixels = Tensor::ones([6, 28, 28], (Kind::Float, Device::Cpu));
        let labels = Tensor::arange(6, (Kind::Int64, Device::Cpu));
        let dataset = ImageDataset::from_unit_pixels(&pixels, Some(labels)).unwrap();

        assert_eq!(dataset.len(), 6);
        assert_eq!(dataset.image_dim(), 784);
        assert_eq!(dataset.images().max().double_value(&[]), 1.0);

        let (image, label) = dataset.get(4).unwrap();
        assert_eq!(image.size(), vec![784]);
        assert_eq!(label, Some(4));
        assert!(dataset.get(6).is_none());
    }

    #[test]
    fn test_rejects_mismatched_labels() {
        let images = Tensor::zeros([4, 10], (Kind::Float, Device::Cpu));
        let labels = Tensor::zeros([3], (Kind::Int64, Device::Cpu));

        assert!(matches!(
            ImageDataset::new(images, Some(labels)),
            Err(GanError::ShapeMismatch { what: "labels", .. })
        ));
    }

    #[test]
    fn test_truncate() {
        let images = Tensor::zeros([10, 4], (Kind::Float, Device::Cpu));
        let dataset = ImageDataset::new(images, None).unwrap().truncate(3);

        assert_eq!(dataset.len(), 3);
        assert!(dataset.labels().is_none());
    }
}
