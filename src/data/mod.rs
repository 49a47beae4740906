//! Data module for loading and batching training images
//!
//! This module provides:
//! - MNIST loading from local IDX files
//! - A synthetic digit set for offline runs
//! - Image normalization to [-1, 1]
//! - DataLoader for batching flattened images

mod dataset;
mod loader;
mod mnist;
mod preprocessing;
mod synthetic;

pub use dataset::ImageDataset;
pub use loader::{DataLoader, DataLoaderIter};
pub use mnist::{load_mnist, MnistSplit, MNIST_FILES};
pub use preprocessing::{denormalize, flatten_images, normalize, PIXEL_MEAN, PIXEL_STD};
pub use synthetic::{synthetic_digits, synthetic_pixels};
