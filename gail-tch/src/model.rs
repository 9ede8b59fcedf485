//! Definition of interfaces of neural networks.
use tch::nn;

/// Neural network model that can be initialized with a [`nn::Path`] and configuration.
///
/// The purpose of this trait is modularity of neural network models. Modules
/// of a network share a single [`VarStore`] and are placed under distinct
/// paths of it, so that a single optimizer trains all of them.
///
/// [`VarStore`]: https://docs.rs/tch/0.16.0/tch/nn/struct.VarStore.html
pub trait SubModel {
    /// Configuration from which [`SubModel`] is constructed.
    type Config;

    /// Input of the [`SubModel`].
    type Input;

    /// Output of the [`SubModel`].
    type Output;

    /// Builds [`SubModel`] under `path` with [`SubModel::Config`].
    fn build(path: &nn::Path, config: Self::Config) -> Self;

    /// A generalized forward function.
    fn forward(&self, input: &Self::Input) -> Self::Output;
}
