//! Flattening of actions.
use gail_core::ActionSpec;
use tch::{Kind, Tensor};

/// Converts actions to fixed-size float vectors.
///
/// Continuous actions are passed through. Discrete actions, given as one index
/// per branch, are converted to the concatenation of the one-hot encodings of
/// all branches.
#[derive(Debug, Clone)]
pub struct ActionFlattener {
    action_spec: ActionSpec,
}

impl ActionFlattener {
    /// Constructs a flattener of the given action space.
    pub fn new(action_spec: &ActionSpec) -> Self {
        Self {
            action_spec: action_spec.clone(),
        }
    }

    /// Number of values of an action before flattening.
    pub fn action_dim(&self) -> usize {
        self.action_spec.action_dim()
    }

    /// Size of flattened actions.
    pub fn flattened_size(&self) -> i64 {
        self.action_spec.flattened_size() as _
    }

    /// Flattens actions of shape `[batch, action_dim]` into `[batch, flattened_size]`.
    pub fn forward(&self, actions: &Tensor) -> Tensor {
        match &self.action_spec {
            ActionSpec::Continuous(_) => actions.to_kind(Kind::Float),
            ActionSpec::Discrete(branches) => {
                let one_hots = branches
                    .iter()
                    .enumerate()
                    .map(|(i, &n)| {
                        actions
                            .select(1, i as i64)
                            .to_kind(Kind::Int64)
                            .one_hot(n as i64)
                            .to_kind(Kind::Float)
                    })
                    .collect::<Vec<_>>();
                Tensor::cat(&one_hots, 1)
            }
        }
    }
}
