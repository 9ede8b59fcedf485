use super::SimpleVisualEncoderConfig;
use crate::{
    model::SubModel,
    util::{linear_layer, Initialization},
};
use tch::{nn, nn::Module, Tensor};

/// Encoder of visual observations with two convolutional layers and a dense layer.
pub struct SimpleVisualEncoder {
    out_dim: i64,
    seq: nn::Sequential,
}

impl SimpleVisualEncoder {
    fn stride(s: i64) -> nn::ConvConfig {
        nn::ConvConfig {
            stride: s,
            ..Default::default()
        }
    }

    fn create_net(path: &nn::Path, config: &SimpleVisualEncoderConfig) -> nn::Sequential {
        nn::seq()
            .add_fn(|xs| xs.permute(&[0, 3, 1, 2]))
            .add(nn::conv2d(path / "c1", config.channels, 16, 8, Self::stride(4)))
            .add_fn(|xs| xs.leaky_relu())
            .add(nn::conv2d(path / "c2", 16, 32, 4, Self::stride(2)))
            .add_fn(|xs| xs.leaky_relu().flat_view())
            .add(linear_layer(
                path / "l1",
                config.conv_out_dim(),
                config.out_dim,
                Initialization::KaimingHeNormal,
                1.41,
            ))
            .add_fn(|xs| xs.leaky_relu())
    }

    /// Output dimension.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }
}

impl SubModel for SimpleVisualEncoder {
    type Config = SimpleVisualEncoderConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Tensor {
        self.seq.forward(x)
    }

    fn build(path: &nn::Path, config: Self::Config) -> Self {
        Self {
            out_dim: config.out_dim,
            seq: Self::create_net(path, &config),
        }
    }
}
