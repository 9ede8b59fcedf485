//! Adversarial imitation learning rewards implemented with [tch](https://crates.io/crates/tch).
//!
//! [`gail::GailRewardProvider`] trains a discriminator to tell expert
//! demonstrations from agent experiences and rewards the agent for experiences
//! the discriminator takes for expert ones.
mod action;
mod cnn;
mod encoder;
pub mod gail;
mod mlp;
mod model;
pub mod opt;
mod tensor;
pub mod util;
pub use action::ActionFlattener;
pub use cnn::{SimpleVisualEncoder, SimpleVisualEncoderConfig};
pub use encoder::StateEncoder;
pub use mlp::{Activation, Mlp, MlpConfig};
pub use model::SubModel;
use serde::{Deserialize, Serialize};
pub use tensor::column_to_tensor;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using tch.
///
/// This enum is added because [`tch::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// A CUDA device of the given index.
    Cuda(usize),

    /// The Metal Performance Shaders device.
    Mps,

    /// A Vulkan device.
    Vulkan,
}

impl From<tch::Device> for Device {
    fn from(device: tch::Device) -> Self {
        match device {
            tch::Device::Cpu => Self::Cpu,
            tch::Device::Cuda(n) => Self::Cuda(n),
            tch::Device::Mps => Self::Mps,
            tch::Device::Vulkan => Self::Vulkan,
        }
    }
}

impl From<Device> for tch::Device {
    fn from(device: Device) -> Self {
        match device {
            Device::Cpu => tch::Device::Cpu,
            Device::Cuda(n) => tch::Device::Cuda(n),
            Device::Mps => tch::Device::Mps,
            Device::Vulkan => tch::Device::Vulkan,
        }
    }
}
