//! Discriminator network of GAIL.
use super::{vail::Vail, GailConfig};
use crate::{
    action::ActionFlattener,
    encoder::StateEncoder,
    mlp::{Activation, Mlp, MlpConfig},
    model::SubModel,
    tensor::column_to_tensor,
    util::{linear_layer, Initialization},
};
use anyhow::{Context, Result};
use gail_core::{
    buffer::{ACTIONS, DONE},
    AgentBuffer, BehaviorSpec, GailError,
};
use tch::{nn, nn::Module, Device, Kind, Tensor};

/// Losses and estimates computed by [`Discriminator::compute_loss`].
#[derive(Debug)]
pub struct DiscriminatorLoss {
    /// Total loss to be minimized.
    pub loss: Tensor,

    /// Mean estimate on the policy batch.
    pub policy_estimate: Tensor,

    /// Mean estimate on the expert batch.
    pub expert_estimate: Tensor,

    /// KL divergence of the latent code, only with VAIL.
    pub kl_loss: Option<Tensor>,
}

/// Estimates the probability that experiences come from the expert.
///
/// The network is a pipeline of stages:
///
/// 1. [`StateEncoder`] embeds observations; flattened actions and done flags are
///    appended to the embedding when actions are used,
/// 2. a two-layer Swish [`Mlp`] encodes the result,
/// 3. with VAIL, [`Vail`] maps the encoding to a stochastic latent code,
/// 4. a single sigmoid unit outputs the estimate.
pub struct Discriminator {
    state_encoder: StateEncoder,
    action_flattener: Option<ActionFlattener>,
    encoder: Mlp,
    vail: Option<Vail>,
    estimator: nn::Linear,
    device: Device,
}

impl Discriminator {
    /// Weight of the gradient penalty in the loss.
    pub const GRADIENT_PENALTY_WEIGHT: f64 = 10.0;

    /// Guard against infinite logarithms.
    pub const EPSILON: f64 = 1e-7;

    /// Builds the discriminator under `path`.
    pub fn build(path: &nn::Path, spec: &BehaviorSpec, config: &GailConfig) -> Result<Self> {
        config.validate()?;
        let encoding_size = config.encoding_size;
        let state_encoder = StateEncoder::build(&(path / "state_encoder"), spec, encoding_size, 2)?;

        let action_flattener = match config.use_actions {
            true => Some(ActionFlattener::new(&spec.action_spec)),
            false => None,
        };
        // One more input for the done flag
        let encoder_input_size = state_encoder.out_dim()
            + action_flattener
                .as_ref()
                .map_or(0, |f| f.flattened_size() + 1);
        let encoder = Mlp::build(
            &(path / "encoder"),
            MlpConfig::new(
                encoder_input_size,
                vec![encoding_size, encoding_size],
                Activation::Swish,
            ),
        );

        let (vail, estimator_input_size) = match config.use_vail {
            true => (
                Some(Vail::build(&(path / "vail"), encoding_size)),
                super::vail::Z_SIZE,
            ),
            false => (None, encoding_size),
        };
        let estimator = linear_layer(
            path / "estimator",
            estimator_input_size,
            1,
            Initialization::XavierGlorotUniform,
            1.0,
        );

        Ok(Self {
            state_encoder,
            action_flattener,
            encoder,
            vail,
            estimator,
            device: path.device(),
        })
    }

    /// Returns `true` if the discriminator has a variational bottleneck.
    pub fn use_vail(&self) -> bool {
        self.vail.is_some()
    }

    /// Returns `true` if actions and done flags are fed to the discriminator.
    pub fn use_actions(&self) -> bool {
        self.action_flattener.is_some()
    }

    /// Current KL coefficient, only with VAIL.
    pub fn beta(&self) -> Option<f64> {
        self.vail.as_ref().map(Vail::beta)
    }

    fn state_encoding(&self, batch: &AgentBuffer) -> Result<Tensor, GailError> {
        self.state_encoder.forward(batch)
    }

    /// Flattened actions and done flags, if actions are used.
    fn action_input(&self, batch: &AgentBuffer) -> Result<Option<(Tensor, Tensor)>, GailError> {
        let flattener = match &self.action_flattener {
            Some(flattener) => flattener,
            None => return Ok(None),
        };
        let actions = column_to_tensor(batch, ACTIONS, &[flattener.action_dim()], self.device)?;
        let dones = column_to_tensor(batch, DONE, &[1], self.device)?;
        Ok(Some((flattener.forward(&actions), dones)))
    }

    fn encoder_input(&self, batch: &AgentBuffer) -> Result<Tensor, GailError> {
        let mut inputs = vec![self.state_encoding(batch)?];
        if let Some((actions, dones)) = self.action_input(batch)? {
            inputs.push(actions);
            inputs.push(dones);
        }
        Ok(Tensor::cat(&inputs, 1))
    }

    /// Runs the encoder, the bottleneck and the estimator on an encoder input.
    fn estimate_from_input(&self, input: &Tensor, use_noise: bool) -> (Tensor, Option<Tensor>) {
        let hidden = self.encoder.forward(input);
        let (hidden, z_mu) = match &self.vail {
            Some(vail) => {
                let (z, z_mu) = vail.forward(&hidden, use_noise);
                (z, Some(z_mu))
            }
            None => (hidden, None),
        };
        (self.estimator.forward(&hidden).sigmoid(), z_mu)
    }

    /// Estimates, for each experience of `batch`, the probability that it comes
    /// from the expert.
    ///
    /// Returns the estimates of shape `[n, 1]` and, with VAIL, the mean of the
    /// latent code. `use_noise` only matters with VAIL: if `false`, the latent
    /// code is its mean.
    pub fn compute_estimate(
        &self,
        batch: &AgentBuffer,
        use_noise: bool,
    ) -> Result<(Tensor, Option<Tensor>), GailError> {
        let input = self.encoder_input(batch)?;
        Ok(self.estimate_from_input(&input, use_noise))
    }

    /// Computes the loss of the discriminator on a policy and an expert batch of
    /// the same size.
    ///
    /// With VAIL, `beta` is updated from the KL divergence of this call; the
    /// returned loss is weighted with the value of `beta` before the update.
    pub fn compute_loss(
        &mut self,
        policy_batch: &AgentBuffer,
        expert_batch: &AgentBuffer,
    ) -> Result<DiscriminatorLoss> {
        check_batch_sizes(policy_batch, expert_batch)?;
        let (policy_estimate, policy_mu) = self.compute_estimate(policy_batch, true)?;
        let (expert_estimate, expert_mu) = self.compute_estimate(expert_batch, true)?;

        let mut loss = -((&expert_estimate * (1.0 - Self::EPSILON)).log()
            + (1.0f64 - &policy_estimate * (1.0 - Self::EPSILON)).log())
        .mean(Kind::Float);

        let kl_loss = match (&mut self.vail, policy_mu, expert_mu) {
            (Some(vail), Some(policy_mu), Some(expert_mu)) => {
                let kl_loss = vail.kl_loss(&policy_mu, &expert_mu);
                loss = loss + vail.loss(&kl_loss);
                vail.update_beta(&kl_loss);
                Some(kl_loss)
            }
            _ => None,
        };

        if Self::GRADIENT_PENALTY_WEIGHT > 0.0 {
            loss = loss
                + self.compute_gradient_magnitude(policy_batch, expert_batch)?
                    * Self::GRADIENT_PENALTY_WEIGHT;
        }

        Ok(DiscriminatorLoss {
            loss,
            policy_estimate: policy_estimate.mean(Kind::Float),
            expert_estimate: expert_estimate.mean(Kind::Float),
            kl_loss,
        })
    }

    /// Gradient penalty of WGAN-GP (<https://arxiv.org/abs/1704.00028>).
    ///
    /// The estimate is differentiated with respect to random interpolations of
    /// the encoder inputs of the two batches. Returns the mean squared deviation
    /// of the norms of the gradients from 1. The graph of the gradient is kept,
    /// so that the penalty can be minimized.
    pub fn compute_gradient_magnitude(
        &self,
        policy_batch: &AgentBuffer,
        expert_batch: &AgentBuffer,
    ) -> Result<Tensor> {
        check_batch_sizes(policy_batch, expert_batch)?;
        let encoder_input = self.interpolated_input(policy_batch, expert_batch)?;

        let (estimate, _) = self.estimate_from_input(&encoder_input, true);
        let estimate = estimate
            .sum_dim_intlist(Some([1].as_slice()), false, Kind::Float)
            .mean(Kind::Float);
        let gradient = Tensor::f_run_backward(&[&estimate], &[&encoder_input], true, true)?
            .pop()
            .context("No gradient with respect to the interpolated input")?;

        Ok(gradient_penalty(&gradient, Self::EPSILON))
    }

    /// Encoder input interpolated between the two batches, one group of features
    /// at a time.
    fn interpolated_input(
        &self,
        policy_batch: &AgentBuffer,
        expert_batch: &AgentBuffer,
    ) -> Result<Tensor, GailError> {
        let policy_obs = self.state_encoding(policy_batch)?;
        let expert_obs = self.state_encoding(expert_batch)?;
        let mut inputs = vec![interpolate(&policy_obs, &expert_obs)];

        // Expert actions and dones are both read from the expert batch
        if let (Some((policy_action, policy_dones)), Some((expert_action, expert_dones))) = (
            self.action_input(policy_batch)?,
            self.action_input(expert_batch)?,
        ) {
            inputs.push(interpolate(&policy_action, &expert_action));
            inputs.push(interpolate(&policy_dones, &expert_dones));
        }
        Ok(Tensor::cat(&inputs, 1))
    }
}

/// `eps * policy + (1 - eps) * expert` with `eps` uniform in `[0, 1)` per element.
fn interpolate(policy: &Tensor, expert: &Tensor) -> Tensor {
    let epsilon = policy.rand_like();
    &epsilon * policy + (1.0 - &epsilon) * expert
}

/// Mean of `(|g| - 1)^2` over the rows `g` of `gradient`, where the norm is
/// computed as `sqrt(sum(g^2) + epsilon)` to stay differentiable at zero.
pub(crate) fn gradient_penalty(gradient: &Tensor, epsilon: f64) -> Tensor {
    let safe_norm = (gradient
        .pow_tensor_scalar(2)
        .sum_dim_intlist(Some([1].as_slice()), false, Kind::Float)
        + epsilon)
        .sqrt();
    (safe_norm - 1.0).pow_tensor_scalar(2).mean(Kind::Float)
}

fn check_batch_sizes(
    policy_batch: &AgentBuffer,
    expert_batch: &AgentBuffer,
) -> Result<(), GailError> {
    let n = policy_batch.num_experiences();
    if expert_batch.num_experiences() != n {
        return Err(GailError::shape_mismatch(
            "expert batch",
            n,
            expert_batch.num_experiences(),
        ));
    }
    Ok(())
}
