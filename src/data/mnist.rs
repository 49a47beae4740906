//! MNIST loading
//!
//! Reads the four raw IDX files (`train-images-idx3-ubyte`, ...) from a local
//! directory. Nothing is downloaded.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::dataset::ImageDataset;
use crate::error::{GanError, Result};

/// Which half of MNIST to train on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MnistSplit {
    #[default]
    Train,
    Test,
}

/// Files that must be present in an MNIST directory
pub const MNIST_FILES: [&str; 4] = [
    "train-images-idx3-ubyte",
    "train-labels-idx1-ubyte",
    "t10k-images-idx3-ubyte",
    "t10k-labels-idx1-ubyte",
];

/// Load one MNIST split, flattened to 784 and normalized to [-1, 1]
pub fn load_mnist<P: AsRef<Path>>(dir: P, split: MnistSplit) -> Result<ImageDataset> {
    let dir = dir.as_ref();
    let missing: Vec<&str> = MNIST_FILES
        .iter()
        .copied()
        .filter(|name| !dir.join(name).exists())
        .collect();
    if !missing.is_empty() {
        return Err(GanError::Data(format!(
            "MNIST files missing from {}: {}",
            dir.display(),
            missing.join(", ")
        )));
    }

    let mnist = tch::vision::mnist::load_dir(dir)?;
    let (pixels, labels) = match split {
        MnistSplit::Train => (mnist.train_images, mnist.train_labels),
        MnistSplit::Test => (mnist.test_images, mnist.test_labels),
    };

    let dataset = ImageDataset::from_unit_pixels(&pixels, Some(labels))?;
    info!(
        "Loaded {} MNIST {:?} images from {}",
        dataset.len(),
        split,
        dir.display()
    );

    Ok(dataset)
}
