//! Named training statistics.
//!
//! Reward providers report the result of an update as a [`Record`], a flat map
//! from metric names (e.g. `"Losses/GAIL Discriminator Loss"`) to values.
use crate::error::GailError;
use std::collections::{
    hash_map::{Iter, Keys},
    HashMap,
};

/// Values stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, e.g. a loss or a mean estimate.
    Scalar(f32),
}

/// A container of key-value pairs.
///
/// # Examples
///
/// ```rust
/// use gail_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_slice(&[(
///     "Losses/GAIL Discriminator Loss",
///     RecordValue::Scalar(1.38),
/// )]);
/// record.insert("Policy/GAIL Beta", RecordValue::Scalar(0.0));
///
/// assert_eq!(record.get_scalar("Policy/GAIL Beta").unwrap(), 0.0);
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist.
    pub fn get_scalar(&self, k: &str) -> Result<f32, GailError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            None => Err(GailError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordValue};
    use crate::error::GailError;

    #[test]
    fn test_scalar_access() {
        let mut record = Record::from_slice(&[
            ("loss", RecordValue::Scalar(0.5)),
            ("estimate", RecordValue::Scalar(0.25)),
        ]);
        record.insert("loss", RecordValue::Scalar(1.5));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get_scalar("loss").unwrap(), 1.5);
        assert_eq!(record.get("estimate"), Some(&RecordValue::Scalar(0.25)));
        assert!(matches!(
            record.get_scalar("beta"),
            Err(GailError::RecordKeyError(_))
        ));

        let sum: f32 = record
            .iter()
            .map(|(_, v)| match v {
                RecordValue::Scalar(x) => *x,
            })
            .sum();
        assert_eq!(sum, 1.75);
    }
}
