//! DataLoader for batching and iterating over training images
//!
//! Provides batching for GAN training with support for:
//! - Random shuffling (optionally seeded)
//! - Drop last incomplete batch
//! - Iteration over batches
//!
//! A trailing batch holding a single image is always skipped, since training
//! mode batch norm cannot normalize it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tch::Tensor;

use super::dataset::ImageDataset;

/// DataLoader for iterating over batched images
pub struct DataLoader {
    /// Full dataset of shape (num_samples, image_dim)
    images: Tensor,
    /// Batch size
    batch_size: usize,
    /// Whether to shuffle data each epoch
    shuffle: bool,
    /// Whether to drop the last incomplete batch
    drop_last: bool,
    /// Current indices for iteration
    indices: Vec<i64>,
    /// Current position in iteration
    current_idx: usize,
    rng: StdRng,
}

impl DataLoader {
    /// Create a new DataLoader
    ///
    /// # Arguments
    ///
    /// * `dataset` - Flattened, normalized images
    /// * `batch_size` - Number of images per batch
    /// * `shuffle` - Whether to shuffle data each epoch
    /// * `drop_last` - Whether to drop incomplete final batch
    pub fn new(dataset: &ImageDataset, batch_size: usize, shuffle: bool, drop_last: bool) -> Self {
        let num_samples = dataset.len() as i64;
        let indices: Vec<i64> = (0..num_samples).collect();

        let mut loader = Self {
            images: dataset.images().shallow_clone(),
            batch_size: batch_size.max(1),
            shuffle,
            drop_last,
            indices,
            current_idx: 0,
            rng: StdRng::from_entropy(),
        };

        if shuffle {
            loader.shuffle_indices();
        }

        loader
    }

    /// Make the shuffling order reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.indices.sort_unstable();
        if self.shuffle {
            self.shuffle_indices();
        }
        self
    }

    /// Get the number of batches per epoch
    pub fn num_batches(&self) -> usize {
        let num_samples = self.num_samples();
        let full = num_samples / self.batch_size;
        let remainder = num_samples % self.batch_size;

        if self.drop_last || remainder < 2 {
            full
        } else {
            full + 1
        }
    }

    /// Get total number of samples
    pub fn num_samples(&self) -> usize {
        self.indices.len()
    }

    /// Get batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Shuffle indices for a new epoch
    fn shuffle_indices(&mut self) {
        self.indices.shuffle(&mut self.rng);
    }

    /// Reset for new epoch
    pub fn reset(&mut self) {
        self.current_idx = 0;
        if self.shuffle {
            self.shuffle_indices();
        }
    }

    /// Get next batch
    ///
    /// Returns None when epoch is complete
    pub fn next_batch(&mut self) -> Option<Tensor> {
        let num_samples = self.indices.len();
        let start = self.current_idx;

        if start >= num_samples {
            return None;
        }

        let end = (start + self.batch_size).min(num_samples);
        let actual_batch_size = end - start;

        // Skip incomplete batch if drop_last, and a lone trailing image always
        if actual_batch_size < self.batch_size && (self.drop_last || actual_batch_size < 2) {
            self.current_idx = num_samples;
            return None;
        }

        let index = Tensor::from_slice(&self.indices[start..end]);
        let batch = self.images.index_select(0, &index);

        self.current_idx = end;
        Some(batch)
    }

    /// Iterate over all batches of a fresh epoch
    pub fn iter(&mut self) -> DataLoaderIter<'_> {
        self.reset();
        DataLoaderIter { loader: self }
    }
}

/// Iterator adapter for DataLoader
pub struct DataLoaderIter<'a> {
    loader: &'a mut DataLoader,
}

impl<'a> Iterator for DataLoaderIter<'a> {
    type Item = Tensor;

    fn next(&mut self) -> Option<Self::Item> {
        self.loader.next_batch()
    }
}
