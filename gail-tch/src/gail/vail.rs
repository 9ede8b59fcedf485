//! Variational information bottleneck of the discriminator.
use crate::util::{linear_layer, Initialization};
use log::trace;
use tch::{nn, nn::Module, Kind, Tensor};

/// Width of the latent code.
pub const Z_SIZE: i64 = 128;

/// Step size of the update of `beta`.
pub const ALPHA: f64 = 0.0005;

/// Target of the KL divergence between the latent code and a standard normal.
pub const MUTUAL_INFORMATION: f64 = 0.5;

/// Initial value of `beta`.
pub const INITIAL_BETA: f64 = 0.0;

/// Returns the value of `beta` after observing the KL divergence `kl_loss`.
///
/// This is a projected dual ascent step: `beta` moves along the violation of the
/// KL constraint and never becomes negative.
pub fn next_beta(beta: f64, kl_loss: f64) -> f64 {
    (beta + ALPHA * (kl_loss - MUTUAL_INFORMATION)).max(0.0)
}

/// Stochastic latent code inserted between the encoder and the estimator.
///
/// The latent code is sampled from `Normal(z_mu, z_sigma)` with the
/// reparameterization trick, so that gradients flow into both `z_mu` and
/// `z_sigma`. `beta` weights the KL term of the discriminator loss; it is plain
/// state, not a variable of the [`VarStore`](tch::nn::VarStore), and is only
/// changed by [`Vail::update_beta`].
pub struct Vail {
    z_mu_layer: nn::Linear,
    z_sigma: Tensor,
    beta: f64,
}

impl Vail {
    /// Builds the bottleneck under `path` for inputs of `in_dim` features.
    pub fn build(path: &nn::Path, in_dim: i64) -> Self {
        let z_mu_layer = linear_layer(
            path / "z_mu",
            in_dim,
            Z_SIZE,
            Initialization::KaimingHeNormal,
            0.1,
        );
        let z_sigma = path.var("z_sigma", &[Z_SIZE], nn::Init::Const(1.0));

        Self {
            z_mu_layer,
            z_sigma,
            beta: INITIAL_BETA,
        }
    }

    /// Returns the latent code and its mean.
    ///
    /// Without noise, the latent code is the mean itself.
    pub fn forward(&self, hidden: &Tensor, use_noise: bool) -> (Tensor, Tensor) {
        let z_mu = self.z_mu_layer.forward(hidden);
        let z = if use_noise {
            &z_mu + z_mu.randn_like() * &self.z_sigma
        } else {
            z_mu.shallow_clone()
        };
        (z, z_mu)
    }

    /// KL divergence of the latent codes of a policy and an expert batch from a
    /// standard normal, summed over the latent dimensions and averaged over the
    /// batch.
    pub fn kl_loss(&self, policy_mu: &Tensor, expert_mu: &Tensor) -> Tensor {
        let sigma_sq = self.z_sigma.pow_tensor_scalar(2);
        let kl = -(sigma_sq.log() + 1.0
            - expert_mu.pow_tensor_scalar(2) * 0.5
            - policy_mu.pow_tensor_scalar(2) * 0.5
            - &sigma_sq)
            .sum_dim_intlist(Some([1].as_slice()), false, Kind::Float);
        kl.mean(Kind::Float)
    }

    /// The KL term added to the discriminator loss, weighted by the current `beta`.
    pub fn loss(&self, kl_loss: &Tensor) -> Tensor {
        (kl_loss - MUTUAL_INFORMATION) * self.beta
    }

    /// Updates `beta` given the KL divergence. No gradient flows through the update.
    pub fn update_beta(&mut self, kl_loss: &Tensor) {
        let kl_loss = tch::no_grad(|| kl_loss.double_value(&[]));
        self.beta = next_beta(self.beta, kl_loss);
        trace!("beta = {}", self.beta);
    }

    /// Current value of `beta`.
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn test_beta_is_clamped() {
        let mut beta = INITIAL_BETA;
        for kl in [-1e6, 0.4, 0.0, -3.0] {
            beta = next_beta(beta, kl);
            assert!(beta >= 0.0);
        }
        assert_eq!(beta, 0.0);

        let beta = next_beta(0.0, 2.5);
        assert!((beta - ALPHA * 2.0).abs() < 1e-12);
        assert_eq!(next_beta(beta, MUTUAL_INFORMATION), beta);
        assert_eq!(next_beta(1.0, -1e9), 0.0);
    }

    #[test]
    fn test_noiseless_code_is_mean() {
        let vs = nn::VarStore::new(Device::Cpu);
        let vail = Vail::build(&(vs.root() / "vail"), 16);
        let hidden = Tensor::randn(&[4, 16], (Kind::Float, Device::Cpu));
        let (z, z_mu) = vail.forward(&hidden, false);

        assert_eq!(z.size(), vec![4, Z_SIZE]);
        assert!(z.equal(&z_mu));

        let (z, z_mu) = vail.forward(&hidden, true);
        assert!(!z.equal(&z_mu));
    }

    #[test]
    fn test_kl_of_standard_code() {
        let vs = nn::VarStore::new(Device::Cpu);
        let vail = Vail::build(&(vs.root() / "vail"), 16);
        let zeros = Tensor::zeros(&[3, Z_SIZE], (Kind::Float, Device::Cpu));

        // With z_sigma = 1 and zero means, every term of the sum vanishes.
        let kl = vail.kl_loss(&zeros, &zeros).double_value(&[]);
        assert!(kl.abs() < 1e-6);

        let ones = Tensor::ones(&[3, Z_SIZE], (Kind::Float, Device::Cpu));
        let kl = vail.kl_loss(&ones, &zeros).double_value(&[]);
        assert!((kl - 0.5 * Z_SIZE as f64).abs() < 1e-3);
    }
}
