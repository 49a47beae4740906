//! GAN on MNIST
//!
//! Main entry point providing CLI interface for:
//! - Training the GAN on MNIST or on synthetic digits
//! - Writing a default configuration file

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mnist_gan::{
    training::LossReporting,
    utils::{ensure_config_exists, render_grid, ComputeTarget, Config, DataSource},
    DataLoader, Gan, Trainer,
};

/// Minimal fully-connected GAN on MNIST
#[derive(Parser)]
#[command(name = "mnist_gan")]
#[command(version = "0.1.0")]
#[command(about = "Train a fully-connected GAN to generate MNIST-like digits")]
struct Cli {
    /// Path to configuration file (.toml or .json)
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the GAN
    Train {
        /// Number of epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Directory with the raw MNIST IDX files
        #[arg(long)]
        mnist_dir: Option<String>,

        /// Train on N synthetic digit images instead of MNIST
        #[arg(long, value_name = "N")]
        synthetic: Option<usize>,

        /// Compute target: auto, cpu or cuda
        #[arg(long)]
        device: Option<ComputeTarget>,

        /// Seed for weight init, noise and shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Restart the reported loss totals every epoch
        #[arg(long)]
        epoch_reset: bool,

        /// Log every batch instead of drawing a progress bar
        #[arg(long)]
        no_progress: bool,

        /// Print a few probe samples as ASCII art when done
        #[arg(long)]
        preview: bool,
    },

    /// Initialize default configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },
}

/// Command line overrides for the train command
struct TrainOverrides {
    epochs: Option<usize>,
    mnist_dir: Option<String>,
    synthetic: Option<usize>,
    device: Option<ComputeTarget>,
    seed: Option<u64>,
    epoch_reset: bool,
    no_progress: bool,
}

impl TrainOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(epochs) = self.epochs {
            config.training.epochs = epochs;
        }
        if let Some(dir) = self.mnist_dir {
            config.data.source = DataSource::Mnist;
            config.data.mnist_dir = dir;
        }
        if let Some(n) = self.synthetic {
            config.data.source = DataSource::Synthetic;
            config.data.synthetic_samples = n;
        }
        if let Some(device) = self.device {
            config.training.compute_target = device;
        }
        if self.seed.is_some() {
            config.training.seed = self.seed;
        }
        if self.epoch_reset {
            config.training.loss_reporting = LossReporting::EpochReset;
        }
        if self.no_progress {
            config.training.show_progress = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            epochs,
            mnist_dir,
            synthetic,
            device,
            seed,
            epoch_reset,
            no_progress,
            preview,
        } => {
            let overrides = TrainOverrides {
                epochs,
                mnist_dir,
                synthetic,
                device,
                seed,
                epoch_reset,
                no_progress,
            };
            train_model(&cli.config, overrides, preview)?;
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}

/// Train the GAN
fn train_model(config_path: &str, overrides: TrainOverrides, preview: bool) -> Result<()> {
    // Load configuration
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };
    overrides.apply(&mut config);
    config.validate()?;

    let seed = config.training.seed;
    if let Some(seed) = seed {
        tch::manual_seed(seed as i64);
        info!("Seeded run with {}", seed);
    }

    let device = config.device();
    info!("Using device: {:?}", device);

    // Load data
    let dataset = config.data.load_dataset(seed.unwrap_or(0))?;
    if dataset.image_dim() != config.training.image_dim {
        anyhow::bail!(
            "dataset images have {} pixels but image_dim is {}",
            dataset.image_dim(),
            config.training.image_dim
        );
    }
    info!("Training on {} images", dataset.len());

    let mut data_loader = DataLoader::new(
        &dataset,
        config.training.batch_size,
        config.data.shuffle,
        config.data.drop_last,
    );
    if let Some(seed) = seed {
        data_loader = data_loader.with_seed(seed);
    }

    // Create model
    let gan = Gan::with_dims(config.training.latent_dim, config.training.image_dim, device);
    let (gen_params, disc_params) = gan.parameter_counts();
    info!(
        "Generator: {} parameters, Discriminator: {} parameters",
        gen_params, disc_params
    );

    // Train
    let mut trainer = Trainer::new(config.training.clone(), &gan)?;
    let metrics = trainer.train(&gan, &mut data_loader)?;

    info!(
        "Training complete. Final G_loss: {:.4}, D_loss: {:.4}",
        metrics.latest_gen_loss().unwrap_or(0.0),
        metrics.latest_disc_loss().unwrap_or(0.0)
    );
    info!(
        "Reported totals: G={:.4}, D={:.4}",
        trainer.tracker().gen_total(),
        trainer.tracker().disc_total()
    );

    if preview {
        let image_dim = config.training.image_dim;
        let side = (image_dim as f64).sqrt().round() as i64;
        let width = if side * side == image_dim { side } else { image_dim };

        let probe = trainer.sample_probe(&gan);
        let count = probe.size()[0].min(4);
        println!("{}", render_grid(&probe.narrow(0, 0, count), width, 2)?);
    }

    Ok(())
}

/// Initialize default configuration file
fn init_config(output: &str) -> Result<()> {
    if Path::new(output).exists() {
        info!("{} already exists, leaving it untouched", output);
    }

    let config = ensure_config_exists(output)?;
    config.validate()?;

    info!(
        "Configuration at {}: {} epochs, batch size {}, learning rate {}",
        output, config.training.epochs, config.training.batch_size, config.training.learning_rate
    );
    Ok(())
}
