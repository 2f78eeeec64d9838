use ndarray::Array2;

pub use crate::grid::{AxisExtent, AxisStride, ColumnCoordinates, LayerSet, ScatterMode};

/// Dense single-precision field indexed by (ray, bin). NaN marks a missing observation.
pub type Field2D = Array2<f32>;

/// Common error type for every regridding operation.
///
/// All variants are raised before any output cell is written.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegridError {
    #[error("shape mismatch: {0}")]
    Shape(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("output size error: {0}")]
    Size(String),
}

pub type RegridResult<T> = Result<T, RegridError>;

/// Fails with [`RegridError::Shape`] unless `actual` equals `expected`.
pub fn ensure_shape(what: &str, actual: &[usize], expected: &[usize]) -> RegridResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(RegridError::Shape(format!(
            "{} has shape {:?}, expected {:?}",
            what, actual, expected
        )))
    }
}

/// Checks that an output of `rows` x `cols` cells is addressable.
pub fn checked_cells(rows: usize, cols: usize) -> RegridResult<usize> {
    rows.checked_mul(cols)
        .filter(|&cells| cells <= isize::MAX as usize / std::mem::size_of::<f32>())
        .ok_or_else(|| RegridError::Size(format!("{} x {} output overflows", rows, cols)))
}
