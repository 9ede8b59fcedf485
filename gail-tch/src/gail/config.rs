//! Configuration of the GAIL reward provider.
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use gail_core::GailError;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Constructs [`GailRewardProvider`](super::GailRewardProvider).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct GailConfig {
    pub(super) demo_path: PathBuf,
    pub(super) encoding_size: i64,
    pub(super) learning_rate: f64,
    pub(super) use_actions: bool,
    pub(super) use_vail: bool,
    pub(super) gamma: f32,
    pub(super) strength: f32,
    pub(super) opt_config: Option<OptimizerConfig>,
    pub(super) seed: Option<i64>,
    pub device: Option<Device>,
}

impl Default for GailConfig {
    fn default() -> Self {
        Self {
            demo_path: PathBuf::new(),
            encoding_size: 64,
            learning_rate: 3e-4,
            use_actions: false,
            use_vail: false,
            gamma: 0.99,
            strength: 1.0,
            opt_config: None,
            seed: None,
            device: None,
        }
    }
}

impl GailConfig {
    /// Path of a demonstration file or a directory of demonstration files.
    pub fn demo_path(mut self, v: impl AsRef<Path>) -> Self {
        self.demo_path = v.as_ref().to_path_buf();
        self
    }

    /// Width of the layers of the discriminator.
    pub fn encoding_size(mut self, v: i64) -> Self {
        self.encoding_size = v;
        self
    }

    /// Learning rate of the default Adam optimizer.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.learning_rate = v;
        self
    }

    /// If `true`, actions and done flags are fed to the discriminator.
    pub fn use_actions(mut self, v: bool) -> Self {
        self.use_actions = v;
        self
    }

    /// If `true`, the discriminator has a variational information bottleneck.
    pub fn use_vail(mut self, v: bool) -> Self {
        self.use_vail = v;
        self
    }

    /// Discount factor of the reward signal.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Scale of the reward signal.
    pub fn strength(mut self, v: f32) -> Self {
        self.strength = v;
        self
    }

    /// Optimizer. Defaults to Adam with [`GailConfig::learning_rate`].
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = Some(v);
        self
    }

    /// Seed of the random number generator of tch, set when the provider is built.
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Device.
    pub fn device(mut self, device: tch::Device) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Returns the optimizer configuration in effect.
    pub fn get_opt_config(&self) -> OptimizerConfig {
        self.opt_config.clone().unwrap_or(OptimizerConfig::Adam {
            lr: self.learning_rate,
        })
    }

    /// Checks the values of the configuration.
    ///
    /// The demonstration path is not checked here as it is not needed when the
    /// provider is built with an expert buffer at hand.
    pub fn validate(&self) -> Result<(), GailError> {
        if self.encoding_size <= 0 {
            return Err(GailError::Config(format!(
                "encoding_size must be positive, got {}",
                self.encoding_size
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(GailError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(GailError::Config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !self.strength.is_finite() {
            return Err(GailError::Config(format!(
                "strength must be finite, got {}",
                self.strength
            )));
        }
        Ok(())
    }

    /// Constructs [`GailConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of GAIL reward provider from {}", path_.display());
        Ok(b)
    }

    /// Saves [`GailConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of GAIL reward provider into {}", path_.display());
        Ok(())
    }
}
