//! Training metrics for monitoring GAN progress
//!
//! Provides the running loss totals behind the per-batch report and the
//! per-epoch history used for logging and collapse detection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the reported loss totals behave across epoch boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReporting {
    /// Totals keep growing for the whole run
    #[default]
    RunCumulative,
    /// Totals restart from zero at every epoch
    EpochReset,
}

/// Running sums of per-batch losses
#[derive(Debug, Clone, Default)]
pub struct LossTracker {
    mode: LossReporting,
    gen_total: f64,
    disc_total: f64,
    epoch_gen: f64,
    epoch_disc: f64,
    epoch_batches: usize,
    total_batches: usize,
}

impl LossTracker {
    /// Create an empty tracker
    pub fn new(mode: LossReporting) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Called at the start of every epoch
    pub fn begin_epoch(&mut self) {
        if self.mode == LossReporting::EpochReset {
            self.gen_total = 0.0;
            self.disc_total = 0.0;
        }
        self.epoch_gen = 0.0;
        self.epoch_disc = 0.0;
        self.epoch_batches = 0;
    }

    /// Add one batch worth of losses
    pub fn record(&mut self, gen_loss: f64, disc_loss: f64) {
        self.gen_total += gen_loss;
        self.disc_total += disc_loss;
        self.epoch_gen += gen_loss;
        self.epoch_disc += disc_loss;
        self.epoch_batches += 1;
        self.total_batches += 1;
    }

    /// Reported generator total
    pub fn gen_total(&self) -> f64 {
        self.gen_total
    }

    /// Reported discriminator total
    pub fn disc_total(&self) -> f64 {
        self.disc_total
    }

    /// Batches seen in the current epoch
    pub fn epoch_batches(&self) -> usize {
        self.epoch_batches
    }

    /// Batches seen over the whole run
    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    /// Mean (generator, discriminator) loss over the current epoch
    pub fn epoch_means(&self) -> Option<(f64, f64)> {
        if self.epoch_batches == 0 {
            return None;
        }
        let n = self.epoch_batches as f64;
        Some((self.epoch_gen / n, self.epoch_disc / n))
    }
}

/// Per-batch progress report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchReport {
    /// Zero-based epoch index
    pub epoch: usize,
    /// Reported generator total
    pub gen_total: f64,
    /// Reported discriminator total
    pub disc_total: f64,
}

impl BatchReport {
    /// Snapshot the tracker's totals for `epoch`
    pub fn from_tracker(epoch: usize, tracker: &LossTracker) -> Self {
        Self {
            epoch,
            gen_total: tracker.gen_total(),
            disc_total: tracker.disc_total(),
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Epoch: {} Generator loss: {:.4}, Discriminator loss: {:.4}",
            self.epoch, self.gen_total, self.disc_total
        )
    }
}

/// Summary statistics of a batch of probe samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeStats {
    /// Epoch the probe was sampled after (one-based)
    pub epoch: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Metrics collected during training
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Mean generator loss per epoch
    pub gen_losses: Vec<f64>,
    /// Mean discriminator loss per epoch
    pub disc_losses: Vec<f64>,
    /// Probe summaries, in sampling order
    pub probe_stats: Vec<ProbeStats>,
}

impl TrainingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record epoch metrics
    pub fn record_epoch(&mut self, gen_loss: f64, disc_loss: f64) {
        self.gen_losses.push(gen_loss);
        self.disc_losses.push(disc_loss);
    }

    /// Record a probe summary
    pub fn record_probe(&mut self, stats: ProbeStats) {
        self.probe_stats.push(stats);
    }

    /// Get number of recorded epochs
    pub fn num_epochs(&self) -> usize {
        self.gen_losses.len()
    }

    /// Get latest generator loss
    pub fn latest_gen_loss(&self) -> Option<f64> {
        self.gen_losses.last().copied()
    }

    /// Get latest discriminator loss
    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.disc_losses.last().copied()
    }

    /// Calculate moving average of generator loss
    pub fn gen_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.gen_losses, window)
    }

    /// Calculate moving average of discriminator loss
    pub fn disc_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.disc_losses, window)
    }

    /// Check if training appears to have collapsed
    ///
    /// Collapse shows up as a discriminator that wins easily (very low loss)
    /// against a generator that cannot fool it (very high loss).
    pub fn check_mode_collapse(&self, window: usize) -> bool {
        if window == 0 || self.num_epochs() < window {
            return false;
        }

        self.disc_loss_ma(window) < 0.1 && self.gen_loss_ma(window) > 5.0
    }
}

/// Calculate moving average of last `window` values
fn moving_average(values: &[f64], window: usize) -> f64 {
    if values.is_empty() || window == 0 {
        return 0.0;
    }

    let n = window.min(values.len());
    let sum: f64 = values.iter().rev().take(n).sum();
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_cumulative_totals() {
        let mut tracker = LossTracker::new(LossReporting::RunCumulative);

        tracker.begin_epoch();
        tracker.record(1.0, 0.5);
        tracker.record(2.0, 0.5);
        tracker.begin_epoch();
        tracker.record(3.0, 1.0);

        assert_eq!(tracker.gen_total(), 6.0);
        assert_eq!(tracker.disc_total(), 2.0);
        assert_eq!(tracker.epoch_means(), Some((3.0, 1.0)));
        assert_eq!(tracker.total_batches(), 3);
    }

    #[test]
    fn test_epoch_reset_totals() {
        let mut tracker = LossTracker::new(LossReporting::EpochReset);

        tracker.begin_epoch();
        tracker.record(1.0, 0.5);
        tracker.begin_epoch();
        assert_eq!(tracker.epoch_means(), None);
        tracker.record(3.0, 1.0);

        assert_eq!(tracker.gen_total(), 3.0);
        assert_eq!(tracker.disc_total(), 1.0);
        assert_eq!(tracker.total_batches(), 2);
    }

    #[test]
    fn test_report_format() {
        let report = BatchReport {
            epoch: 2,
            gen_total: 1.23456,
            disc_total: 0.5,
        };
        assert_eq!(
            report.to_string(),
            "Epoch: 2 Generator loss: 1.2346, Discriminator loss: 0.5000"
        );
    }

    #[test]
    fn test_training_metrics() {
        let mut metrics = TrainingMetrics::new();

        metrics.record_epoch(1.5, 0.8);
        metrics.record_epoch(1.3, 0.75);

        assert_eq!(metrics.num_epochs(), 2);
        assert_eq!(metrics.latest_gen_loss(), Some(1.3));
        assert!((metrics.gen_loss_ma(10) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_mode_collapse_heuristic() {
        let mut metrics = TrainingMetrics::new();
        for _ in 0..3 {
            metrics.record_epoch(6.0, 0.05);
        }

        assert!(!metrics.check_mode_collapse(5));
        assert!(metrics.check_mode_collapse(3));

        metrics.record_epoch(0.7, 0.7);
        assert!(!metrics.check_mode_collapse(3));
    }
}
