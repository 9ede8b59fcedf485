//! Interface of reward providers.
use crate::{buffer::AgentBuffer, record::Record};
use anyhow::Result;

/// A source of reward signals computed from experiences.
///
/// A trainer calls [`RewardProvider::evaluate`] to obtain one reward per
/// experience of a batch and [`RewardProvider::update`] once per update cycle
/// to train the provider on the same kind of batch. Calls are expected to be
/// made sequentially from a single thread.
pub trait RewardProvider {
    /// Name of the reward signal, used as a prefix of statistics by trainers.
    fn name(&self) -> &str;

    /// Discount factor applied by the trainer to this reward signal.
    fn gamma(&self) -> f32;

    /// Scale applied by the trainer to this reward signal.
    fn strength(&self) -> f32;

    /// If `true`, the trainer should bootstrap the value of terminal states,
    /// i.e., ignore episode termination for this reward signal.
    fn ignore_done(&self) -> bool {
        false
    }

    /// Computes rewards of the experiences in `batch`, one per experience.
    fn evaluate(&self, batch: &AgentBuffer) -> Result<Vec<f32>>;

    /// Trains the provider on `batch` and returns statistics of the update.
    fn update(&mut self, batch: &AgentBuffer) -> Result<Record>;
}
