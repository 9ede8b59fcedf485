//! Convolutional encoder of visual observations.
//!
//! The architecture consists of two convolutional layers followed by a dense
//! layer, all with leaky ReLU activations. Input images are laid out as
//! `[batch, height, width, channels]`.
mod base;
mod config;
pub use base::SimpleVisualEncoder;
pub use config::SimpleVisualEncoderConfig;
