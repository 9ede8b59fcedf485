//! Encoder of observations.
use crate::{
    cnn::{SimpleVisualEncoder, SimpleVisualEncoderConfig},
    mlp::{Activation, Mlp, MlpConfig},
    model::SubModel,
    tensor::column_to_tensor,
};
use anyhow::Result;
use gail_core::{behavior::visual_obs_key, buffer::VECTOR_OBS, AgentBuffer, BehaviorSpec, GailError};
use log::trace;
use tch::{nn, Device, Tensor};

/// Maps the observations of a batch to embeddings of a fixed size.
///
/// Each visual observation is encoded by its own [`SimpleVisualEncoder`]; the
/// results are concatenated with the vector observations and passed through an
/// [`Mlp`] with Swish activations.
pub struct StateEncoder {
    vector_obs_size: usize,
    visual_shapes: Vec<[usize; 3]>,
    visual_encoders: Vec<SimpleVisualEncoder>,
    body: Mlp,
    device: Device,
}

impl StateEncoder {
    /// Builds the encoder under `path`.
    ///
    /// Outputs have `hidden_units` features, computed by `num_layers` layers after
    /// the visual encoders.
    pub fn build(
        path: &nn::Path,
        spec: &BehaviorSpec,
        hidden_units: i64,
        num_layers: usize,
    ) -> Result<Self> {
        spec.validate()?;
        if spec.observation_shapes.is_empty() {
            return Err(GailError::Config("behavior has no observation".to_string()).into());
        }

        let vector_obs_size = spec.vector_obs_size();
        let visual_shapes = spec.visual_obs_shapes();
        let visual_encoders = visual_shapes
            .iter()
            .enumerate()
            .map(|(i, &shape)| {
                let config = SimpleVisualEncoderConfig::new(shape, hidden_units)?;
                Ok(SimpleVisualEncoder::build(
                    &(path / format!("visual{}", i)),
                    config,
                ))
            })
            .collect::<Result<Vec<_>, GailError>>()?;

        let in_dim = vector_obs_size as i64 + hidden_units * visual_encoders.len() as i64;
        let body = Mlp::build(
            &(path / "body"),
            MlpConfig::new(in_dim, vec![hidden_units; num_layers], Activation::Swish),
        );
        trace!(
            "State encoder: {} vector features, {} visual observations, {} outputs",
            vector_obs_size,
            visual_encoders.len(),
            body.out_dim()
        );

        Ok(Self {
            vector_obs_size,
            visual_shapes,
            visual_encoders,
            body,
            device: path.device(),
        })
    }

    /// Size of embeddings.
    pub fn out_dim(&self) -> i64 {
        self.body.out_dim()
    }

    /// Number of visual observations.
    pub fn num_visual(&self) -> usize {
        self.visual_encoders.len()
    }

    /// Encodes the observations of `batch` into a tensor of shape `[n, out_dim]`.
    pub fn forward(&self, batch: &AgentBuffer) -> Result<Tensor, GailError> {
        let mut features = Vec::with_capacity(1 + self.visual_encoders.len());
        if self.vector_obs_size > 0 {
            features.push(column_to_tensor(
                batch,
                VECTOR_OBS,
                &[self.vector_obs_size],
                self.device,
            )?);
        }
        for (i, (encoder, shape)) in self
            .visual_encoders
            .iter()
            .zip(&self.visual_shapes)
            .enumerate()
        {
            let obs = column_to_tensor(batch, &visual_obs_key(i), shape, self.device)?;
            features.push(encoder.forward(&obs));
        }
        Ok(self.body.forward(&Tensor::cat(&features, 1)))
    }
}
