//! Error types for the GAN training loop

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, GanError>;

/// Which network a loss or parameter set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Generator,
    Discriminator,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Generator => write!(f, "generator"),
            Network::Discriminator => write!(f, "discriminator"),
        }
    }
}

/// Main error type for the library
#[derive(Error, Debug)]
pub enum GanError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Batch too small for training-mode batch normalization
    #[error("Batch of size {size} is too small, training needs at least {min} samples")]
    BatchTooSmall { size: i64, min: i64 },

    /// Tensor shape does not match what the network expects
    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<i64>,
        actual: Vec<i64>,
    },

    /// Loss diverged to NaN or infinity
    #[error("Non-finite {network} loss ({value}) at epoch {epoch}, batch {batch}")]
    NonFiniteLoss {
        network: Network,
        value: f64,
        epoch: usize,
        batch: usize,
    },

    /// Dataset could not be loaded or is unusable
    #[error("Data error: {0}")]
    Data(String),

    /// libtorch error
    #[error("Torch error: {0}")]
    Torch(#[from] tch::TchError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GanError::NonFiniteLoss {
            network: Network::Discriminator,
            value: f64::NAN,
            epoch: 3,
            batch: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("discriminator"));
        assert!(msg.contains("epoch 3"));

        let err = GanError::BatchTooSmall { size: 1, min: 2 };
        assert!(err.to_string().contains("size 1"));
    }
}
