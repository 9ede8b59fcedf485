use super::MlpConfig;
use crate::{
    model::SubModel,
    util::{linear_layer, Initialization},
};
use tch::{nn, nn::Module, Tensor};

/// Multilayer perceptron with an activation function after every layer.
pub struct Mlp {
    out_dim: i64,
    seq: nn::Sequential,
}

impl Mlp {
    fn create_net(path: &nn::Path, config: &MlpConfig) -> nn::Sequential {
        let mut seq = nn::seq();
        let mut in_dim = config.in_dim;
        let activation = config.activation;

        for (i, &out_dim) in config.units.iter().enumerate() {
            seq = seq.add(linear_layer(
                path / format!("ln{}", i),
                in_dim,
                out_dim,
                Initialization::XavierGlorotUniform,
                1.0,
            ));
            seq = seq.add_fn(move |x| activation.apply(x));
            in_dim = out_dim;
        }

        seq
    }

    /// Output dimension.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }
}

impl SubModel for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Tensor {
        self.seq.forward(x)
    }

    fn build(path: &nn::Path, config: Self::Config) -> Self {
        let seq = Self::create_net(path, &config);

        Self {
            out_dim: config.out_dim(),
            seq,
        }
    }
}
