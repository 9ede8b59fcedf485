//! Observation and action spaces of a behavior.
use crate::error::GailError;
use serde::{Deserialize, Serialize};

/// Action space of a behavior.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum ActionSpec {
    /// Continuous actions with the given dimensionality.
    Continuous(usize),

    /// Discrete actions, one integer per branch. Each element is the number of
    /// choices of the branch.
    Discrete(Vec<usize>),
}

impl ActionSpec {
    /// Number of values per experience in the `actions` column of a buffer.
    pub fn action_dim(&self) -> usize {
        match self {
            Self::Continuous(n) => *n,
            Self::Discrete(branches) => branches.len(),
        }
    }

    /// Size of the flattened action vector. For discrete actions, this is the
    /// total size of the concatenated one-hot encodings.
    pub fn flattened_size(&self) -> usize {
        match self {
            Self::Continuous(n) => *n,
            Self::Discrete(branches) => branches.iter().sum(),
        }
    }
}

/// Describes the observations and actions of a behavior.
///
/// Observation shapes of rank 1 are vector observations; they are concatenated
/// in order in the `vector_obs` column of an [`AgentBuffer`](crate::AgentBuffer).
/// Shapes of rank 3 are visual observations laid out as `[height, width, channels]`,
/// stored in the `visual_obs{i}` columns where `i` counts visual observations only.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BehaviorSpec {
    /// Shapes of observations.
    pub observation_shapes: Vec<Vec<usize>>,

    /// Action space.
    pub action_spec: ActionSpec,
}

impl BehaviorSpec {
    /// Constructs a behavior specification.
    pub fn new(observation_shapes: Vec<Vec<usize>>, action_spec: ActionSpec) -> Self {
        Self {
            observation_shapes,
            action_spec,
        }
    }

    /// Checks that every observation is a vector or a visual observation, that
    /// no dimension is zero and that actions have at least one value.
    pub fn validate(&self) -> Result<(), GailError> {
        for (i, shape) in self.observation_shapes.iter().enumerate() {
            if shape.len() != 1 && shape.len() != 3 {
                return Err(GailError::Config(format!(
                    "observation {} has unsupported rank {} (shape {:?})",
                    i,
                    shape.len(),
                    shape
                )));
            }
            if shape.iter().any(|&d| d == 0) {
                return Err(GailError::Config(format!(
                    "observation {} has a zero-sized dimension (shape {:?})",
                    i, shape
                )));
            }
        }

        if self.action_spec.action_dim() == 0 {
            return Err(GailError::Config(format!(
                "action space {:?} has no dimension",
                self.action_spec
            )));
        }
        match &self.action_spec {
            ActionSpec::Discrete(branches) if branches.iter().any(|&b| b == 0) => Err(
                GailError::Config(format!("discrete branch of size 0 in {:?}", branches)),
            ),
            _ => Ok(()),
        }
    }

    /// Total size of the vector observations.
    pub fn vector_obs_size(&self) -> usize {
        self.observation_shapes
            .iter()
            .filter(|s| s.len() == 1)
            .map(|s| s[0])
            .sum()
    }

    /// Shapes of visual observations, `[height, width, channels]`.
    pub fn visual_obs_shapes(&self) -> Vec<[usize; 3]> {
        self.observation_shapes
            .iter()
            .filter(|s| s.len() == 3)
            .map(|s| [s[0], s[1], s[2]])
            .collect()
    }
}

/// Name of the buffer column holding the `i`-th visual observation.
pub fn visual_obs_key(i: usize) -> String {
    format!("visual_obs{}", i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_split() {
        let spec = BehaviorSpec::new(
            vec![vec![8], vec![24, 26, 1], vec![3]],
            ActionSpec::Continuous(2),
        );
        assert!(spec.validate().is_ok());
        assert_eq!(spec.vector_obs_size(), 11);
        assert_eq!(spec.visual_obs_shapes(), vec![[24, 26, 1]]);
        assert_eq!(visual_obs_key(0), "visual_obs0");
    }

    #[test]
    fn test_action_sizes() {
        let spec = ActionSpec::Discrete(vec![3, 2]);
        assert_eq!(spec.action_dim(), 2);
        assert_eq!(spec.flattened_size(), 5);
        assert_eq!(ActionSpec::Continuous(4).flattened_size(), 4);
    }

    #[test]
    fn test_invalid_specs() {
        let spec = BehaviorSpec::new(vec![vec![4, 4]], ActionSpec::Continuous(1));
        assert!(matches!(spec.validate(), Err(GailError::Config(_))));

        let spec = BehaviorSpec::new(vec![vec![4]], ActionSpec::Discrete(vec![2, 0]));
        assert!(matches!(spec.validate(), Err(GailError::Config(_))));
    }

    #[test]
    fn test_rejects_empty_action_space() {
        for action_spec in [ActionSpec::Continuous(0), ActionSpec::Discrete(vec![])] {
            let spec = BehaviorSpec::new(vec![vec![2]], action_spec);
            assert!(matches!(spec.validate(), Err(GailError::Config(_))));
        }
    }
}
