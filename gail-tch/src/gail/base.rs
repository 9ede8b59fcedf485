use super::{Discriminator, GailConfig};
use crate::opt::Optimizer;
use anyhow::{bail, Result};
use gail_core::{
    demo_to_buffer,
    record::{Record, RecordValue},
    AgentBuffer, BehaviorSpec, GailError, RewardProvider,
};
use log::{debug, info};
use std::convert::TryFrom;
use tch::{nn, Device, Kind, Tensor};

/// Converts estimates of the discriminator into rewards, `-log(1 - e (1 - eps))`.
///
/// The reward is zero for an estimate of zero and grows as the estimate
/// approaches one, i.e., as the discriminator takes the experience for an
/// expert one.
pub fn reward_from_estimate(estimate: &Tensor) -> Tensor {
    -(1.0f64 - estimate * (1.0 - Discriminator::EPSILON)).log()
}

/// Reward provider of GAIL and VAIL.
///
/// The provider owns the discriminator, its optimizer and the buffer of expert
/// demonstrations. [`RewardProvider::update`] trains the discriminator on a
/// policy batch and an expert batch of the same size drawn from the
/// demonstrations; [`RewardProvider::evaluate`] rewards experiences the
/// discriminator takes for expert ones.
pub struct GailRewardProvider {
    var_store: nn::VarStore,
    discriminator: Discriminator,
    opt: Optimizer,
    demo_buffer: AgentBuffer,
    gamma: f32,
    strength: f32,
    device: Device,
}

impl GailRewardProvider {
    /// Builds the provider, loading the demonstrations at
    /// [`GailConfig::demo_path`].
    pub fn build(spec: BehaviorSpec, config: GailConfig) -> Result<Self> {
        if config.demo_path.as_os_str().is_empty() {
            return Err(GailError::Config("demo_path is not given".to_string()).into());
        }
        let demo_buffer = demo_to_buffer(&config.demo_path, &spec)?;
        Self::with_demo_buffer(spec, config, demo_buffer)
    }

    /// Builds the provider with demonstrations already loaded into `demo_buffer`.
    pub fn with_demo_buffer(
        spec: BehaviorSpec,
        config: GailConfig,
        demo_buffer: AgentBuffer,
    ) -> Result<Self> {
        config.validate()?;
        spec.validate()?;
        if demo_buffer.is_empty() {
            return Err(GailError::Demo("no expert experience".to_string()).into());
        }
        demo_buffer.check_spec(&spec, config.use_actions)?;

        if let Some(seed) = config.seed {
            tch::manual_seed(seed);
        }
        let device = config.device.map_or(Device::Cpu, Into::into);
        let var_store = nn::VarStore::new(device);
        let discriminator = Discriminator::build(&var_store.root(), &spec, &config)?;
        let opt = config.get_opt_config().build(&var_store)?;
        info!(
            "Build {} reward provider with {} expert experiences, use_actions = {}, use_vail = {}",
            if config.use_vail { "VAIL" } else { "GAIL" },
            demo_buffer.num_experiences(),
            config.use_actions,
            config.use_vail
        );

        Ok(Self {
            var_store,
            discriminator,
            opt,
            demo_buffer,
            gamma: config.gamma,
            strength: config.strength,
            device,
        })
    }

    /// Draws `n` expert experiences uniformly at random.
    ///
    /// Experiences are drawn without replacement if the demonstrations hold at
    /// least `n` of them, with replacement otherwise.
    pub fn sample_expert_batch(&self, n: usize) -> Result<AgentBuffer> {
        let m = self.demo_buffer.num_experiences() as i64;
        let options = (Kind::Int64, Device::Cpu);
        let ixs = if n as i64 <= m {
            Tensor::randperm(m, options).narrow(0, 0, n as i64)
        } else {
            Tensor::randint(m, &[n as i64], options)
        };
        let ixs = Vec::<i64>::try_from(&ixs)?
            .into_iter()
            .map(|i| i as usize)
            .collect::<Vec<_>>();
        Ok(self.demo_buffer.sample(&ixs))
    }

    /// The discriminator.
    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    /// Current KL coefficient, only with VAIL.
    pub fn beta(&self) -> Option<f64> {
        self.discriminator.beta()
    }

    /// Expert demonstrations.
    pub fn demo_buffer(&self) -> &AgentBuffer {
        &self.demo_buffer
    }

    /// Variables of the discriminator.
    pub fn var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    /// Device of the discriminator.
    pub fn device(&self) -> Device {
        self.device
    }
}

impl RewardProvider for GailRewardProvider {
    fn name(&self) -> &str {
        "GAIL"
    }

    fn gamma(&self) -> f32 {
        self.gamma
    }

    fn strength(&self) -> f32 {
        self.strength
    }

    fn ignore_done(&self) -> bool {
        true
    }

    fn evaluate(&self, batch: &AgentBuffer) -> Result<Vec<f32>> {
        let rewards = tch::no_grad(|| -> Result<Tensor> {
            let (estimate, _) = self.discriminator.compute_estimate(batch, false)?;
            Ok(reward_from_estimate(&estimate))
        })?;
        let rewards = rewards
            .flatten(0, -1)
            .to_kind(Kind::Float)
            .to_device(Device::Cpu);
        Ok(Vec::<f32>::try_from(&rewards)?)
    }

    fn update(&mut self, batch: &AgentBuffer) -> Result<Record> {
        let n = batch.num_experiences();
        if n == 0 {
            bail!("Policy batch is empty");
        }
        let expert_batch = self.sample_expert_batch(n)?;
        let loss = self.discriminator.compute_loss(batch, &expert_batch)?;
        self.opt.backward_step(&loss.loss);

        let scalar = |t: &Tensor| RecordValue::Scalar(t.double_value(&[]) as f32);
        let mut record = Record::from_slice(&[
            ("Losses/GAIL Discriminator Loss", scalar(&loss.loss)),
            ("Policy/GAIL Policy Estimate", scalar(&loss.policy_estimate)),
            ("Policy/GAIL Expert Estimate", scalar(&loss.expert_estimate)),
        ]);
        if let (Some(beta), Some(kl_loss)) = (self.discriminator.beta(), &loss.kl_loss) {
            record.insert("Policy/GAIL Beta", RecordValue::Scalar(beta as f32));
            record.insert("Losses/GAIL KL Loss", scalar(kl_loss));
        }
        debug!("{:?}", record);

        Ok(record)
    }
}
