use gail_core::GailError;
use serde::{Deserialize, Serialize};

/// Smallest height and width accepted by [`SimpleVisualEncoder`](super::SimpleVisualEncoder).
pub const MIN_RESOLUTION: usize = 20;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`SimpleVisualEncoder`](super::SimpleVisualEncoder).
pub struct SimpleVisualEncoderConfig {
    pub(super) height: i64,
    pub(super) width: i64,
    pub(super) channels: i64,
    pub(super) out_dim: i64,
}

impl SimpleVisualEncoderConfig {
    /// Creates configuration for images of shape `[height, width, channels]`.
    pub fn new(shape: [usize; 3], out_dim: i64) -> Result<Self, GailError> {
        let [height, width, channels] = shape;
        if height < MIN_RESOLUTION || width < MIN_RESOLUTION {
            return Err(GailError::Config(format!(
                "visual observation {:?} is smaller than {}x{}",
                shape, MIN_RESOLUTION, MIN_RESOLUTION
            )));
        }
        Ok(Self {
            height: height as _,
            width: width as _,
            channels: channels as _,
            out_dim,
        })
    }

    /// Number of features after the convolutional layers.
    pub(super) fn conv_out_dim(&self) -> i64 {
        let h = conv_out(conv_out(self.height, 8, 4), 4, 2);
        let w = conv_out(conv_out(self.width, 8, 4), 4, 2);
        32 * h * w
    }
}

fn conv_out(size: i64, kernel: i64, stride: i64) -> i64 {
    (size - kernel) / stride + 1
}
