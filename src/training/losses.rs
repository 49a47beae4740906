//! Loss functions for GAN training
//!
//! Both networks end in a sigmoid, so the losses here are plain Binary Cross
//! Entropy on probabilities rather than the logit-fused variant.

use tch::Tensor;

/// Mean Binary Cross Entropy between probabilities and a constant target
///
/// # Arguments
///
/// * `scores` - Probabilities in (0, 1), any shape
/// * `target` - Label every score is compared against (1.0 real, 0.0 fake)
///
/// # Returns
///
/// Scalar loss tensor
pub fn bce(scores: &Tensor, target: f64) -> Tensor {
    let targets = Tensor::full_like(scores, target);
    scores.binary_cross_entropy::<Tensor>(&targets, None, tch::Reduction::Mean)
}

/// Discriminator loss split into its two branches
pub struct DiscriminatorLossTerms {
    /// BCE of real scores against 1
    pub real: Tensor,
    /// BCE of fake scores against 0
    pub fake: Tensor,
    /// Arithmetic mean of the two branches, the value that is backpropagated
    pub combined: Tensor,
}

/// Discriminator loss: (-log(D(x)) - log(1 - D(G(z)))) / 2
///
/// The discriminator wants to output 1 for real samples and 0 for fake samples.
///
/// # Arguments
///
/// * `real_scores` - Discriminator output on real samples (probabilities)
/// * `fake_scores` - Discriminator output on generated samples (probabilities)
pub fn discriminator_loss(real_scores: &Tensor, fake_scores: &Tensor) -> DiscriminatorLossTerms {
    let real = bce(real_scores, 1.0);
    let fake = bce(fake_scores, 0.0);
    let combined = (&real + &fake) / 2.0;

    DiscriminatorLossTerms {
        real,
        fake,
        combined,
    }
}

/// Generator loss: -log(D(G(z)))
///
/// The generator wants the discriminator to output 1 (real) for fake samples.
pub fn generator_loss(fake_scores: &Tensor) -> Tensor {
    bce(fake_scores, 1.0)
}
