//! Utilities.
use serde::{Deserialize, Serialize};
use tch::nn;

/// Weight initialization of linear layers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum Initialization {
    /// Uniform in `[-b, b]` with `b = gain * sqrt(6 / (in_dim + out_dim))`.
    XavierGlorotUniform,

    /// Normal with standard deviation `gain * sqrt(2 / in_dim)`.
    KaimingHeNormal,
}

/// Constructs a linear layer with zero bias.
pub fn linear_layer(
    path: nn::Path,
    in_dim: i64,
    out_dim: i64,
    init: Initialization,
    gain: f64,
) -> nn::Linear {
    let ws_init = match init {
        Initialization::XavierGlorotUniform => {
            let bound = gain * (6.0 / (in_dim + out_dim) as f64).sqrt();
            nn::Init::Uniform {
                lo: -bound,
                up: bound,
            }
        }
        Initialization::KaimingHeNormal => nn::Init::Randn {
            mean: 0.0,
            stdev: gain * (2.0 / in_dim as f64).sqrt(),
        },
    };
    let config = nn::LinearConfig {
        ws_init,
        bs_init: Some(nn::Init::Const(0.0)),
        bias: true,
    };
    nn::linear(path, in_dim, out_dim, config)
}
