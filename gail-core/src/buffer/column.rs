use crate::error::GailError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// A column of an [`AgentBuffer`](super::AgentBuffer).
///
/// Values are stored row-major as `f32`, one row per experience. `shape` is the
/// shape of a single row, e.g. `[8]` for a vector observation or `[84, 84, 3]`
/// for a visual observation.
///
/// Deserialized columns go through the same checks as [`Column::new`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "RawColumn")]
pub struct Column {
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Deserialize)]
struct RawColumn {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl TryFrom<RawColumn> for Column {
    type Error = GailError;

    fn try_from(raw: RawColumn) -> Result<Self, Self::Error> {
        Self::new(raw.shape, raw.data)
    }
}

impl Column {
    /// Constructs a column from flattened data.
    ///
    /// Fails if the length of `data` is not a multiple of the row size.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, GailError> {
        let row_size = shape.iter().product::<usize>();
        if row_size == 0 {
            return Err(GailError::Config(format!(
                "column row shape {:?} has no elements",
                shape
            )));
        }
        if data.len() % row_size != 0 {
            return Err(GailError::shape_mismatch(
                format!("column of row shape {:?}", shape),
                (data.len() / row_size + 1) * row_size,
                data.len(),
            ));
        }
        Ok(Self { shape, data })
    }

    /// Constructs a column of `n` rows filled with zeros.
    pub fn zeros(shape: Vec<usize>, n: usize) -> Self {
        let data = vec![0f32; n * shape.iter().product::<usize>()];
        Self { shape, data }
    }

    /// Constructs a column of scalar rows, e.g. `done` flags.
    pub fn from_scalars(values: Vec<f32>) -> Self {
        Self {
            shape: vec![1],
            data: values,
        }
    }

    /// Shape of a single row.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of values in a single row.
    pub fn row_size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Number of rows. A column with rows of no elements has no rows.
    pub fn len(&self) -> usize {
        match self.row_size() {
            0 => 0,
            n => self.data.len() / n,
        }
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flattened values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The `i`-th row.
    pub fn row(&self, i: usize) -> &[f32] {
        let n = self.row_size();
        &self.data[i * n..(i + 1) * n]
    }

    /// Appends a row.
    pub fn push(&mut self, row: &[f32]) -> Result<(), GailError> {
        if row.len() != self.row_size() {
            return Err(GailError::shape_mismatch(
                "pushed row",
                self.row_size(),
                row.len(),
            ));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Appends all rows of `other`, which must have the same row shape.
    pub fn extend(&mut self, other: &Column) -> Result<(), GailError> {
        if other.shape != self.shape {
            return Err(GailError::shape_mismatch(
                format!("extended column {:?}", other.shape),
                self.row_size(),
                other.row_size(),
            ));
        }
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    /// Gathers the rows at the given indices.
    ///
    /// Panics if an index is out of range.
    pub fn sample(&self, ixs: &[usize]) -> Self {
        let mut data = Vec::with_capacity(ixs.len() * self.row_size());
        for &ix in ixs {
            data.extend_from_slice(self.row(ix));
        }
        Self {
            shape: self.shape.clone(),
            data,
        }
    }
}
