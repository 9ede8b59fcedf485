use super::Column;
use crate::{
    behavior::{visual_obs_key, BehaviorSpec},
    error::GailError,
};
use serde::{Deserialize, Serialize};
use std::collections::{btree_map::Keys, BTreeMap};

/// Key of the column of concatenated vector observations.
pub const VECTOR_OBS: &str = "vector_obs";

/// Key of the column of actions.
pub const ACTIONS: &str = "actions";

/// Key of the column of episode termination flags.
pub const DONE: &str = "done";

/// An ordered collection of equal-length named columns.
///
/// Row `i` of every column belongs to the `i`-th experience. Both live policy
/// batches and expert demonstrations are stored as [`AgentBuffer`]s, with the
/// columns `vector_obs`, `visual_obs{i}`, `actions` and `done`.
///
/// ```rust
/// use gail_core::{AgentBuffer, Column};
///
/// let mut buffer = AgentBuffer::new();
/// buffer.insert("vector_obs", Column::new(vec![2], vec![0.0, 1.0, 2.0, 3.0]).unwrap()).unwrap();
/// buffer.insert("done", Column::from_scalars(vec![0.0, 1.0])).unwrap();
/// assert_eq!(buffer.num_experiences(), 2);
///
/// let batch = buffer.sample(&[1]);
/// assert_eq!(batch.get("vector_obs").unwrap().data(), &[2.0, 3.0]);
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AgentBuffer {
    columns: BTreeMap<String, Column>,
}

impl AgentBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer of `n` experiences filled with zeros, with the columns
    /// expected for `spec`.
    pub fn zeros(spec: &BehaviorSpec, n: usize) -> Self {
        let mut columns = BTreeMap::new();
        let vector_obs_size = spec.vector_obs_size();
        if vector_obs_size > 0 {
            columns.insert(
                VECTOR_OBS.to_string(),
                Column::zeros(vec![vector_obs_size], n),
            );
        }
        for (i, shape) in spec.visual_obs_shapes().iter().enumerate() {
            columns.insert(visual_obs_key(i), Column::zeros(shape.to_vec(), n));
        }
        columns.insert(
            ACTIONS.to_string(),
            Column::zeros(vec![spec.action_spec.action_dim()], n),
        );
        columns.insert(DONE.to_string(), Column::zeros(vec![1], n));
        Self { columns }
    }

    /// Inserts a column, replacing a column with the same key.
    ///
    /// Fails if the number of rows differs from the other columns.
    pub fn insert(&mut self, key: impl Into<String>, column: Column) -> Result<(), GailError> {
        let key = key.into();
        let expected = self
            .columns
            .iter()
            .find(|(k, _)| **k != key)
            .map(|(_, c)| c.len());
        if let Some(expected) = expected {
            if column.len() != expected {
                return Err(GailError::shape_mismatch(key, expected, column.len()));
            }
        }
        self.columns.insert(key, column);
        Ok(())
    }

    /// Returns the column of the given key.
    pub fn get(&self, key: &str) -> Result<&Column, GailError> {
        self.columns
            .get(key)
            .ok_or_else(|| GailError::MissingColumn(key.to_string()))
    }

    /// Returns `true` if the buffer has a column of the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    /// Keys of the columns in lexicographic order.
    pub fn keys(&self) -> Keys<'_, String, Column> {
        self.columns.keys()
    }

    /// The number of experiences, i.e., the number of rows of each column.
    pub fn num_experiences(&self) -> usize {
        self.columns.values().next().map_or(0, Column::len)
    }

    /// Returns `true` if the buffer has no experience.
    pub fn is_empty(&self) -> bool {
        self.num_experiences() == 0
    }

    /// Checks that all columns have the same number of rows.
    ///
    /// Buffers built with [`AgentBuffer::insert`] are always consistent, but
    /// deserialized buffers are not checked on construction.
    pub fn validate(&self) -> Result<(), GailError> {
        let n = self.num_experiences();
        for (key, column) in self.columns.iter() {
            if column.len() != n {
                return Err(GailError::shape_mismatch(key.as_str(), n, column.len()));
            }
        }
        Ok(())
    }

    /// Checks that the buffer has the columns described by `spec`, with the
    /// expected row shapes. The `actions` and `done` columns are only checked
    /// when `with_actions` is `true`.
    pub fn check_spec(&self, spec: &BehaviorSpec, with_actions: bool) -> Result<(), GailError> {
        self.validate()?;

        let vector_obs_size = spec.vector_obs_size();
        if vector_obs_size > 0 {
            check_row_size(self.get(VECTOR_OBS)?, VECTOR_OBS, vector_obs_size)?;
        }
        for (i, shape) in spec.visual_obs_shapes().iter().enumerate() {
            let key = visual_obs_key(i);
            let column = self.get(&key)?;
            if column.shape() != &shape[..] {
                return Err(GailError::shape_mismatch(
                    key,
                    shape.iter().product(),
                    column.row_size(),
                ));
            }
        }
        if with_actions {
            check_row_size(self.get(ACTIONS)?, ACTIONS, spec.action_spec.action_dim())?;
            check_row_size(self.get(DONE)?, DONE, 1)?;
        }
        Ok(())
    }

    /// Gathers the experiences at the given indices into a new buffer.
    ///
    /// Panics if an index is out of range.
    pub fn sample(&self, ixs: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(k, c)| (k.clone(), c.sample(ixs)))
            .collect();
        Self { columns }
    }

    /// Appends the experiences of `other`.
    ///
    /// An empty buffer takes the columns of `other`; otherwise both buffers must
    /// have the same keys and row shapes.
    pub fn extend(&mut self, other: &AgentBuffer) -> Result<(), GailError> {
        if self.columns.is_empty() {
            self.columns = other.columns.clone();
            return Ok(());
        }
        if self.columns.len() != other.columns.len() {
            return Err(GailError::shape_mismatch(
                "number of columns",
                self.columns.len(),
                other.columns.len(),
            ));
        }
        for key in self.columns.keys() {
            if !other.columns.contains_key(key) {
                return Err(GailError::MissingColumn(key.clone()));
            }
        }
        for (key, column) in self.columns.iter_mut() {
            column.extend(&other.columns[key])?;
        }
        Ok(())
    }
}

fn check_row_size(column: &Column, key: &str, expected: usize) -> Result<(), GailError> {
    if column.row_size() != expected {
        return Err(GailError::shape_mismatch(key, expected, column.row_size()));
    }
    Ok(())
}
