use serde::{Deserialize, Serialize};

/// Activation function applied after each layer of [`Mlp`](super::Mlp).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum Activation {
    /// Rectified linear unit.
    Relu,

    /// `x * sigmoid(x)`.
    Swish,

    /// Leaky rectified linear unit with slope 0.01.
    LeakyRelu,
}

impl Activation {
    pub(crate) fn apply(&self, xs: &tch::Tensor) -> tch::Tensor {
        match self {
            Self::Relu => xs.relu(),
            Self::Swish => xs.silu(),
            Self::LeakyRelu => xs.leaky_relu(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: i64,
    pub(super) units: Vec<i64>,
    pub(super) activation: Activation,
}

impl MlpConfig {
    /// Creates configuration of an MLP with `units.len()` layers, each followed
    /// by `activation`.
    pub fn new(in_dim: i64, units: Vec<i64>, activation: Activation) -> Self {
        Self {
            in_dim,
            units,
            activation,
        }
    }

    /// Output dimension.
    pub fn out_dim(&self) -> i64 {
        *self.units.last().unwrap_or(&self.in_dim)
    }
}
