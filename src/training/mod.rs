//! Training module for the GAN
//!
//! This module provides:
//! - Training loop implementation
//! - Loss functions (Binary Cross Entropy)
//! - Noise sources for training and for the visualization probe
//! - Training configuration and metrics

mod losses;
mod metrics;
mod noise;
mod trainer;

pub use losses::{bce, discriminator_loss, generator_loss, DiscriminatorLossTerms};
pub use metrics::{BatchReport, LossReporting, LossTracker, ProbeStats, TrainingMetrics};
pub use noise::{FixedProbe, NoiseSampler};
pub use trainer::{BatchLosses, DiscriminatorLosses, Trainer, TrainingConfig, MIN_TRAIN_BATCH};
