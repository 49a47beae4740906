//! Training loop implementation for the GAN
//!
//! Each batch runs the discriminator update first and then the generator
//! update against the freshly updated discriminator, both on the same fake
//! batch. Only the discriminator update sees that batch detached.

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tch::{nn, Kind, Tensor};
use tracing::{debug, info, warn};

use super::losses::{discriminator_loss, generator_loss};
use super::metrics::{BatchReport, LossReporting, LossTracker, ProbeStats, TrainingMetrics};
use super::noise::{FixedProbe, NoiseSampler};
use crate::data::{flatten_images, DataLoader};
use crate::error::{GanError, Network, Result};
use crate::model::Gan;
use crate::utils::ComputeTarget;

/// Smallest batch training-mode batch norm can normalize
pub const MIN_TRAIN_BATCH: i64 = 2;

/// Epoch window used for the mode-collapse check
const COLLAPSE_WINDOW: usize = 10;

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Where tensors live
    pub compute_target: ComputeTarget,
    /// Adam learning rate, shared by both optimizers
    pub learning_rate: f64,
    /// Size of the latent noise vector
    pub latent_dim: i64,
    /// Size of a flattened image
    pub image_dim: i64,
    /// Number of samples per batch
    pub batch_size: usize,
    /// Number of training epochs
    pub epochs: usize,
    /// Whether reported loss totals reset every epoch
    pub loss_reporting: LossReporting,
    /// Sample the fixed probe every N epochs (0 disables)
    pub sample_every: usize,
    /// Number of vectors in the fixed probe
    pub probe_size: i64,
    /// Seed for the training noise and the probe, applied by `Trainer::new`.
    /// The CLI also seeds weight init and shuffling with it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Draw a progress bar per epoch
    pub show_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            compute_target: ComputeTarget::Auto,
            learning_rate: 3e-4,
            latent_dim: 64,
            image_dim: 784,
            batch_size: 32,
            epochs: 50,
            loss_reporting: LossReporting::RunCumulative,
            sample_every: 10,
            probe_size: 32,
            seed: None,
            show_progress: true,
        }
    }
}

impl TrainingConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(GanError::InvalidConfig(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if self.latent_dim <= 0 {
            return Err(GanError::InvalidConfig("latent_dim must be positive".into()));
        }
        if self.image_dim <= 0 {
            return Err(GanError::InvalidConfig("image_dim must be positive".into()));
        }
        if (self.batch_size as i64) < MIN_TRAIN_BATCH {
            return Err(GanError::InvalidConfig(format!(
                "batch_size must be at least {}, got {}",
                MIN_TRAIN_BATCH, self.batch_size
            )));
        }
        if self.probe_size <= 0 {
            return Err(GanError::InvalidConfig("probe_size must be positive".into()));
        }
        Ok(())
    }
}

/// Discriminator losses of one update, as plain numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscriminatorLosses {
    pub real: f64,
    pub fake: f64,
    pub combined: f64,
}

/// Losses of one full batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchLosses {
    pub generator: f64,
    pub discriminator: DiscriminatorLosses,
}

/// GAN Trainer
///
/// Owns one Adam optimizer per network. The generator optimizer is built from
/// the generator's variable store only, and likewise for the discriminator.
pub struct Trainer {
    config: TrainingConfig,
    gen_opt: nn::Optimizer,
    disc_opt: nn::Optimizer,
    noise: NoiseSampler,
    probe: FixedProbe,
    tracker: LossTracker,
    metrics: TrainingMetrics,
    epoch: usize,
    batch: usize,
}

impl Trainer {
    /// Create a new trainer for `gan`
    pub fn new(config: TrainingConfig, gan: &Gan) -> Result<Self> {
        config.validate()?;

        if gan.latent_dim() != config.latent_dim || gan.image_dim() != config.image_dim {
            return Err(GanError::InvalidConfig(format!(
                "model dims (latent {}, image {}) do not match config (latent {}, image {})",
                gan.latent_dim(),
                gan.image_dim(),
                config.latent_dim,
                config.image_dim
            )));
        }

        if let Some(seed) = config.seed {
            tch::manual_seed(seed as i64);
        }

        let gen_opt = gan.gen_optimizer(config.learning_rate)?;
        let disc_opt = gan.disc_optimizer(config.learning_rate)?;
        let noise = NoiseSampler::new(config.latent_dim, gan.device);
        let probe = FixedProbe::new(config.probe_size, config.latent_dim, gan.device);
        let tracker = LossTracker::new(config.loss_reporting);

        Ok(Self {
            config,
            gen_opt,
            disc_opt,
            noise,
            probe,
            tracker,
            metrics: TrainingMetrics::new(),
            epoch: 0,
            batch: 0,
        })
    }

    /// Train the GAN model
    ///
    /// # Arguments
    ///
    /// * `gan` - GAN model to train
    /// * `data_loader` - DataLoader providing flattened, normalized real batches
    ///
    /// # Returns
    ///
    /// Training metrics, or the first error that aborted the run
    pub fn train(&mut self, gan: &Gan, data_loader: &mut DataLoader) -> Result<&TrainingMetrics> {
        let num_batches = data_loader.num_batches();

        info!(
            "Starting training for {} epochs, {} batches per epoch",
            self.config.epochs, num_batches
        );

        for epoch in 0..self.config.epochs {
            self.epoch = epoch;
            self.batch = 0;
            self.tracker.begin_epoch();

            let pb = self.progress_bar(num_batches);

            for real_batch in data_loader.iter() {
                if let Err(e) = self.train_batch(gan, &real_batch) {
                    if let Some(pb) = &pb {
                        pb.abandon();
                    }
                    return Err(e);
                }

                let report = BatchReport::from_tracker(epoch, &self.tracker);
                match &pb {
                    Some(pb) => {
                        pb.set_message(report.to_string());
                        pb.inc(1);
                        debug!("{}", report);
                    }
                    None => info!("{}", report),
                }
            }

            if let Some(pb) = pb {
                pb.finish();
            }

            match self.tracker.epoch_means() {
                Some((gen_loss, disc_loss)) => {
                    self.metrics.record_epoch(gen_loss, disc_loss);
                    info!(
                        "Epoch {}/{}: G_loss={:.4}, D_loss={:.4}",
                        epoch + 1,
                        self.config.epochs,
                        gen_loss,
                        disc_loss
                    );
                }
                None => warn!("Epoch {} produced no batches", epoch + 1),
            }

            if self.metrics.check_mode_collapse(COLLAPSE_WINDOW) {
                warn!("Possible mode collapse detected! Consider adjusting the learning rate.");
            }

            if self.config.sample_every > 0 && (epoch + 1) % self.config.sample_every == 0 {
                self.record_probe(gan, epoch + 1)?;
            }
        }

        Ok(&self.metrics)
    }

    /// Run the full update protocol on one real batch
    pub fn train_batch(&mut self, gan: &Gan, real: &Tensor) -> Result<BatchLosses> {
        let real = self.check_real_batch(gan, real)?;
        let batch_size = real.size()[0];

        let noise = self.noise.sample(batch_size);
        let fake = gan.generator.forward_t(&noise, true);
        if fake.size() != [batch_size, self.config.image_dim] {
            return Err(GanError::ShapeMismatch {
                what: "fake batch",
                expected: vec![batch_size, self.config.image_dim],
                actual: fake.size(),
            });
        }

        let discriminator = self.discriminator_step(gan, &real, &fake)?;
        let generator = self.generator_step(gan, &fake)?;

        self.tracker.record(generator, discriminator.combined);
        self.batch += 1;

        Ok(BatchLosses {
            generator,
            discriminator,
        })
    }

    /// One discriminator update on real and (detached) fake samples
    ///
    /// Generator parameters are never touched: the fake batch is detached and
    /// only the discriminator optimizer steps.
    pub fn discriminator_step(
        &mut self,
        gan: &Gan,
        real: &Tensor,
        fake: &Tensor,
    ) -> Result<DiscriminatorLosses> {
        let real_scores = gan.discriminator.forward_t(real, true);
        let fake_scores = gan.discriminator.forward_t(&fake.detach(), true);
        self.ensure_finite_scores(Network::Discriminator, &real_scores)?;
        self.ensure_finite_scores(Network::Discriminator, &fake_scores)?;

        let terms = discriminator_loss(&real_scores, &fake_scores);
        let losses = DiscriminatorLosses {
            real: f64::try_from(&terms.real)?,
            fake: f64::try_from(&terms.fake)?,
            combined: f64::try_from(&terms.combined)?,
        };
        self.ensure_finite(Network::Discriminator, losses.combined)?;

        self.disc_opt.zero_grad();
        terms.combined.backward();
        self.disc_opt.step();

        Ok(losses)
    }

    /// One generator update against the current discriminator
    ///
    /// Gradients reach the discriminator's variables too, but only the
    /// generator optimizer steps. The next discriminator update clears them.
    pub fn generator_step(&mut self, gan: &Gan, fake: &Tensor) -> Result<f64> {
        let fake_scores = gan.discriminator.forward_t(fake, true);
        self.ensure_finite_scores(Network::Generator, &fake_scores)?;

        let loss = generator_loss(&fake_scores);
        let value = f64::try_from(&loss)?;
        self.ensure_finite(Network::Generator, value)?;

        self.gen_opt.zero_grad();
        loss.backward();
        self.gen_opt.step();

        Ok(value)
    }

    /// Images generated from the fixed probe, without gradients
    pub fn sample_probe(&self, gan: &Gan) -> Tensor {
        self.probe.sample(&gan.generator)
    }

    /// Get configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Get training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Get the running loss totals
    pub fn tracker(&self) -> &LossTracker {
        &self.tracker
    }

    fn check_real_batch(&self, gan: &Gan, real: &Tensor) -> Result<Tensor> {
        // Image-shaped batches, e.g. (N, 1, 28, 28), are flattened first
        let real = if real.dim() > 2 {
            flatten_images(real)
        } else {
            real.shallow_clone()
        };

        let size = real.size();
        if size.len() != 2 || size[1] != self.config.image_dim {
            return Err(GanError::ShapeMismatch {
                what: "real batch",
                expected: vec![size.first().copied().unwrap_or(0), self.config.image_dim],
                actual: size,
            });
        }
        if size[0] < MIN_TRAIN_BATCH {
            return Err(GanError::BatchTooSmall {
                size: size[0],
                min: MIN_TRAIN_BATCH,
            });
        }

        Ok(real.to_kind(Kind::Float).to_device(gan.device))
    }

    fn ensure_finite_scores(&self, network: Network, scores: &Tensor) -> Result<()> {
        let finite = scores.isfinite().all().to_kind(Kind::Int64).int64_value(&[]) != 0;
        if finite {
            Ok(())
        } else {
            Err(self.non_finite(network, f64::NAN))
        }
    }

    fn ensure_finite(&self, network: Network, value: f64) -> Result<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(self.non_finite(network, value))
        }
    }

    fn non_finite(&self, network: Network, value: f64) -> GanError {
        GanError::NonFiniteLoss {
            network,
            value,
            epoch: self.epoch,
            batch: self.batch,
        }
    }

    fn record_probe(&mut self, gan: &Gan, epoch: usize) -> Result<()> {
        let samples = self.sample_probe(gan);
        let stats = ProbeStats {
            epoch,
            mean: f64::try_from(&samples.mean(Kind::Float))?,
            std: f64::try_from(&samples.std(true))?,
            min: f64::try_from(&samples.min())?,
            max: f64::try_from(&samples.max())?,
        };

        info!(
            "Probe after epoch {}: mean={:.4}, std={:.4}, range=[{:.4}, {:.4}]",
            stats.epoch, stats.mean, stats.std, stats.min, stats.max
        );
        self.metrics.record_probe(stats);
        Ok(())
    }

    fn progress_bar(&self, num_batches: usize) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }

        let pb = ProgressBar::new(num_batches as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::losses::bce;
    use tch::Device;

    const LATENT: i64 = 8;
    const IMAGE: i64 = 16;

    fn small_setup(seed: i64) -> (Gan, Trainer) {
        tch::manual_seed(seed);
        let gan = Gan::with_dims(LATENT, IMAGE, Device::Cpu);
        let config = TrainingConfig {
            compute_target: ComputeTarget::Cpu,
            latent_dim: LATENT,
            image_dim: IMAGE,
            batch_size: 4,
            show_progress: false,
            ..Default::default()
        };
        let trainer = Trainer::new(config, &gan).unwrap();
        (gan, trainer)
    }

    #[test]
    fn test_training_config_default() {
        let config = TrainingConfig::default();
        assert_eq!(config.compute_target, ComputeTarget::Auto);
        assert_eq!(config.learning_rate, 3e-4);
        assert_eq!(config.latent_dim, 64);
        assert_eq!(config.image_dim, 784);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.epochs, 50);
        assert_eq!(config.loss_reporting, LossReporting::RunCumulative);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_single_sample_batches() {
        let config = TrainingConfig {
            batch_size: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GanError::InvalidConfig(_))));
    }

    #[test]
    fn test_trainer_rejects_mismatched_model() {
        let gan = Gan::with_dims(LATENT, IMAGE, Device::Cpu);
        let result = Trainer::new(TrainingConfig::default(), &gan);
        assert!(matches!(result, Err(GanError::InvalidConfig(_))));
    }

    #[test]
    fn test_discriminator_step_leaves_generator_untouched() {
        let (gan, mut trainer) = small_setup(1);
        let real = Tensor::randn([4, IMAGE], (Kind::Float, Device::Cpu));
        let noise = Tensor::randn([4, LATENT], (Kind::Float, Device::Cpu));
        let fake = gan.generator.forward_t(&noise, true);

        let gen_before = gan.snapshot_generator();
        let disc_before = gan.snapshot_discriminator();
        trainer.discriminator_step(&gan, &real, &fake).unwrap();

        assert!(gen_before.matches(&gan.snapshot_generator()));
        assert!(!disc_before.matches(&gan.snapshot_discriminator()));
    }

    #[test]
    fn test_generator_step_leaves_discriminator_untouched() {
        let (gan, mut trainer) = small_setup(2);
        let noise = Tensor::randn([4, LATENT], (Kind::Float, Device::Cpu));
        let fake = gan.generator.forward_t(&noise, true);

        let gen_before = gan.snapshot_generator();
        let disc_before = gan.snapshot_discriminator();
        trainer.generator_step(&gan, &fake).unwrap();

        assert!(disc_before.matches(&gan.snapshot_discriminator()));
        assert!(!gen_before.matches(&gan.snapshot_generator()));
    }

    #[test]
    fn test_indistinguishable_batch_scores_ln2() {
        let (gan, mut trainer) = small_setup(3);
        // Identical rows collapse to the same activations under batch norm,
        // so every score is sigmoid of the output bias, which starts near 0
        let image = Tensor::randn([1, IMAGE], (Kind::Float, Device::Cpu)).repeat([2, 1]);

        let losses = trainer.discriminator_step(&gan, &image, &image).unwrap();

        let ln2 = std::f64::consts::LN_2;
        assert!((losses.real - ln2).abs() < 0.1, "real {}", losses.real);
        assert!((losses.fake - ln2).abs() < 0.1, "fake {}", losses.fake);
        assert!((losses.combined - ln2).abs() < 0.01, "combined {}", losses.combined);
        assert!((losses.combined - (losses.real + losses.fake) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_discriminator_step_reduces_real_loss() {
        let (gan, mut trainer) = small_setup(42);
        let real = Tensor::zeros([4, IMAGE], (Kind::Float, Device::Cpu));
        let noise = Tensor::randn([4, LATENT], (Kind::Float, Device::Cpu));
        let fake = gan.generator.forward_t(&noise, true);

        // Start the discriminator far on the "fake" side so the real branch
        // dominates the first gradient
        tch::no_grad(|| {
            if let Some(bs) = &gan.discriminator.out.bs {
                let _ = bs.shallow_clone().fill_(-8.0);
            }
        });

        let real_loss = |gan: &Gan| {
            tch::no_grad(|| bce(&gan.discriminator.forward_t(&real, true), 1.0).double_value(&[]))
        };

        let before = real_loss(&gan);
        let losses = trainer.discriminator_step(&gan, &real, &fake).unwrap();
        let after = real_loss(&gan);

        assert!((losses.real - before).abs() < 1e-5);
        assert!(after < before, "real loss went from {} to {}", before, after);
    }

    #[test]
    fn test_train_batch_rejects_bad_shapes() {
        let (gan, mut trainer) = small_setup(4);

        let single = Tensor::zeros([1, IMAGE], (Kind::Float, Device::Cpu));
        assert!(matches!(
            trainer.train_batch(&gan, &single),
            Err(GanError::BatchTooSmall { size: 1, min: 2 })
        ));

        let wrong_width = Tensor::zeros([4, IMAGE + 1], (Kind::Float, Device::Cpu));
        assert!(matches!(
            trainer.train_batch(&gan, &wrong_width),
            Err(GanError::ShapeMismatch { what: "real batch", .. })
        ));

        assert_eq!(trainer.tracker().total_batches(), 0);
    }

    #[test]
    fn test_train_batch_flattens_image_shaped_batches() {
        let (gan, mut trainer) = small_setup(8);

        // 4x4 single-channel images hold exactly IMAGE pixels
        let images = Tensor::rand([4, 1, 4, 4], (Kind::Float, Device::Cpu)) * 2.0 - 1.0;
        let losses = trainer.train_batch(&gan, &images).unwrap();

        assert!(losses.generator.is_finite());
        assert_eq!(trainer.tracker().total_batches(), 1);

        let wrong_pixels = Tensor::zeros([4, 1, 3, 3], (Kind::Float, Device::Cpu));
        assert!(matches!(
            trainer.train_batch(&gan, &wrong_pixels),
            Err(GanError::ShapeMismatch { what: "real batch", .. })
        ));
    }

    #[test]
    fn test_non_finite_scores_abort_before_update() {
        let (gan, mut trainer) = small_setup(5);
        tch::no_grad(|| {
            if let Some(bs) = &gan.discriminator.out.bs {
                let _ = bs.shallow_clone().fill_(f64::NAN);
            }
        });
        let before = gan.snapshot_discriminator();

        let real = Tensor::randn([4, IMAGE], (Kind::Float, Device::Cpu));
        let err = trainer.train_batch(&gan, &real).unwrap_err();

        assert!(matches!(
            err,
            GanError::NonFiniteLoss {
                network: Network::Discriminator,
                ..
            }
        ));
        // NaN never equals itself, so compare the weights that were left alone
        let after = gan.snapshot_discriminator();
        assert_eq!(before.changed(&after), vec!["out.bias".to_string()]);
    }

    #[test]
    fn test_train_batch_accumulates() {
        let (gan, mut trainer) = small_setup(6);
        let real = Tensor::rand([4, IMAGE], (Kind::Float, Device::Cpu)) * 2.0 - 1.0;

        let first = trainer.train_batch(&gan, &real).unwrap();
        let second = trainer.train_batch(&gan, &real).unwrap();

        let tracker = trainer.tracker();
        assert_eq!(tracker.total_batches(), 2);
        let expected_gen = first.generator + second.generator;
        assert!((tracker.gen_total() - expected_gen).abs() < 1e-12);
        assert!(first.discriminator.combined > 0.0);
    }

    #[test]
    fn test_seed_fixes_probe_noise() {
        let gan = Gan::with_dims(LATENT, IMAGE, Device::Cpu);
        let config = TrainingConfig {
            latent_dim: LATENT,
            image_dim: IMAGE,
            seed: Some(11),
            show_progress: false,
            ..Default::default()
        };

        let first = Trainer::new(config.clone(), &gan).unwrap();
        let _ = Tensor::randn([8, 8], (Kind::Float, Device::Cpu));
        let second = Trainer::new(config, &gan).unwrap();

        assert!(first.sample_probe(&gan).equal(&second.sample_probe(&gan)));
    }

    #[test]
    fn test_probe_sampling_is_deterministic() {
        let (gan, trainer) = small_setup(7);

        let a = trainer.sample_probe(&gan);
        let b = trainer.sample_probe(&gan);
        assert_eq!(a.size(), vec![32, IMAGE]);
        assert!(a.equal(&b));
    }
}
