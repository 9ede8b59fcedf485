//! Conversion of buffer columns into tensors.
use gail_core::{AgentBuffer, GailError};
use tch::{Device, Tensor};

/// Converts a column of `buffer` into a float tensor of shape `[n, row_shape..]`.
///
/// Fails if the column is missing or its rows do not have `row_shape`.
pub fn column_to_tensor(
    buffer: &AgentBuffer,
    key: &str,
    row_shape: &[usize],
    device: Device,
) -> Result<Tensor, GailError> {
    let column = buffer.get(key)?;
    let expected = row_shape.iter().product::<usize>();
    if column.row_size() != expected {
        return Err(GailError::shape_mismatch(key, expected, column.row_size()));
    }

    let mut shape = vec![column.len() as i64];
    shape.extend(row_shape.iter().map(|&d| d as i64));
    Ok(Tensor::from_slice(column.data()).reshape(&shape).to(device))
}
