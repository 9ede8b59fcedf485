//! Optimizer of the discriminator.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tch::{nn, nn::OptimizerConfig as _, Tensor};

/// Configures the optimizer of the discriminator.
///
/// Moment decay rates and `eps` take the defaults of tch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,
        /// Weight decay.
        wd: f64,
    },
}

impl OptimizerConfig {
    /// Constructs an optimizer of the variables in `vs`.
    pub fn build(&self, vs: &nn::VarStore) -> Result<Optimizer> {
        let opt = match *self {
            Self::Adam { lr } => nn::Adam::default().build(vs, lr)?,
            Self::AdamW { lr, wd } => nn::AdamW {
                wd,
                ..Default::default()
            }
            .build(vs, lr)?,
        };
        Ok(Optimizer(opt))
    }
}

/// Optimizer built by [`OptimizerConfig::build`].
pub struct Optimizer(nn::Optimizer);

impl Optimizer {
    /// Zeroes the gradients, backpropagates `loss` and applies an update step.
    pub fn backward_step(&mut self, loss: &Tensor) {
        self.0.backward_step(loss);
    }
}
