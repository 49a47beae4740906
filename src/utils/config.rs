//! Configuration management
//!
//! Provides unified configuration for data loading and training. Files may be
//! TOML or JSON, picked by extension, and may leave out any field.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tch::Device;
use tracing::{info, warn};

use crate::data::{load_mnist, synthetic_digits, ImageDataset, MnistSplit};
use crate::error::{GanError, Result};
use crate::training::TrainingConfig;

/// Where tensors are allocated and computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeTarget {
    /// CUDA when available, CPU otherwise
    #[default]
    Auto,
    Cpu,
    /// CUDA, falling back to CPU with a warning
    Cuda,
}

impl ComputeTarget {
    /// Pick the concrete device; never fails
    pub fn resolve(self) -> Device {
        match self {
            ComputeTarget::Cpu => Device::Cpu,
            ComputeTarget::Auto => Device::cuda_if_available(),
            ComputeTarget::Cuda => {
                if tch::Cuda::is_available() {
                    Device::Cuda(0)
                } else {
                    warn!("CUDA requested but not available, falling back to CPU");
                    Device::Cpu
                }
            }
        }
    }
}

impl FromStr for ComputeTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ComputeTarget::Auto),
            "cpu" => Ok(ComputeTarget::Cpu),
            "cuda" | "gpu" => Ok(ComputeTarget::Cuda),
            other => Err(format!("unknown compute target '{}' (auto, cpu, cuda)", other)),
        }
    }
}

impl fmt::Display for ComputeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeTarget::Auto => write!(f, "auto"),
            ComputeTarget::Cpu => write!(f, "cpu"),
            ComputeTarget::Cuda => write!(f, "cuda"),
        }
    }
}

/// Source of real images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Mnist,
    Synthetic,
}

/// Data-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Where real images come from
    pub source: DataSource,
    /// Directory holding the raw MNIST IDX files
    pub mnist_dir: String,
    /// MNIST split to train on
    pub split: MnistSplit,
    /// Number of images in the synthetic set
    pub synthetic_samples: usize,
    /// Use at most this many images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Reshuffle every epoch
    pub shuffle: bool,
    /// Drop the last incomplete batch
    pub drop_last: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Mnist,
            mnist_dir: "data/mnist".to_string(),
            split: MnistSplit::Train,
            synthetic_samples: 1000,
            limit: None,
            shuffle: true,
            drop_last: false,
        }
    }
}

impl DataConfig {
    /// Load the configured dataset
    pub fn load_dataset(&self, seed: u64) -> Result<ImageDataset> {
        let dataset = match self.source {
            DataSource::Mnist => load_mnist(&self.mnist_dir, self.split)?,
            DataSource::Synthetic => {
                info!("Generating {} synthetic digit images", self.synthetic_samples);
                synthetic_digits(self.synthetic_samples, seed)?
            }
        };

        Ok(match self.limit {
            Some(limit) => dataset.truncate(limit),
            None => dataset,
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data configuration
    pub data: DataConfig,
    /// Training configuration
    pub training: TrainingConfig,
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load from TOML or JSON depending on the extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        if is_toml(path.as_ref()) {
            Self::from_toml(path)
        } else {
            Self::from_json(path)
        }
    }

    /// Save as TOML or JSON depending on the extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if is_toml(path.as_ref()) {
            self.save_toml(path)
        } else {
            self.save_json(path)
        }
    }

    /// Resolve the configured compute target
    pub fn device(&self) -> Device {
        self.training.compute_target.resolve()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;

        if self.data.source == DataSource::Synthetic
            && self.data.synthetic_samples < crate::training::MIN_TRAIN_BATCH as usize
        {
            return Err(GanError::InvalidConfig(
                "synthetic_samples must hold at least one trainable batch".into(),
            ));
        }
        if self.data.limit == Some(0) {
            return Err(GanError::InvalidConfig("limit must be > 0".into()));
        }
        if self.data.source == DataSource::Mnist && self.training.image_dim != 784 {
            return Err(GanError::InvalidConfig(format!(
                "MNIST images have 784 pixels, image_dim is {}",
                self.training.image_dim
            )));
        }
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "toml")
}

/// Create default configuration file if it doesn't exist
pub fn ensure_config_exists<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if path.exists() {
        Config::load(path)
    } else {
        let config = Config::default();
        config.save(path)?;
        info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::LossReporting;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.data.source, DataSource::Mnist);
        assert_eq!(config.training.latent_dim, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.training.seed = Some(7);
        config.training.loss_reporting = LossReporting::EpochReset;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"training\": {{\"epochs\": 3, \"compute_target\": \"cpu\"}}}}").unwrap();

        let config = Config::from_json(file.path()).unwrap();
        assert_eq!(config.training.epochs, 3);
        assert_eq!(config.training.compute_target, ComputeTarget::Cpu);
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.training.image_dim = 100;
        assert!(config.validate().is_err());

        config.data.source = DataSource::Synthetic;
        config.data.synthetic_samples = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ensure_config_exists_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");

        let created = ensure_config_exists(&path).unwrap();
        assert!(path.exists());
        assert_eq!(ensure_config_exists(&path).unwrap(), created);
    }

    #[test]
    fn test_compute_target_parsing() {
        assert_eq!("CPU".parse::<ComputeTarget>().unwrap(), ComputeTarget::Cpu);
        assert_eq!("gpu".parse::<ComputeTarget>().unwrap(), ComputeTarget::Cuda);
        assert!("tpu".parse::<ComputeTarget>().is_err());
        assert_eq!(ComputeTarget::Cpu.resolve(), Device::Cpu);
    }
}
