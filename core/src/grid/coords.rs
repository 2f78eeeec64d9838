use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::prelude::{ensure_shape, RegridResult};

/// Input coordinates along the second axis of a field.
#[derive(Debug, Clone, Copy)]
pub enum ColumnCoordinates<'a> {
    /// One coordinate vector shared by every row.
    Shared(ArrayView1<'a, f32>),
    /// Independent coordinates per row, co-indexed with the field.
    PerRow(ArrayView2<'a, f32>),
}

impl<'a> ColumnCoordinates<'a> {
    /// Checks the coordinates against a field of shape `(rows, cols)`.
    pub fn validate(&self, rows: usize, cols: usize) -> RegridResult<()> {
        match self {
            Self::Shared(coords) => ensure_shape("shared coordinates", coords.shape(), &[cols]),
            Self::PerRow(coords) => {
                ensure_shape("per-row coordinates", coords.shape(), &[rows, cols])
            }
        }
    }

    /// True when every coordinate vector is strictly increasing.
    pub fn is_monotonic(&self) -> bool {
        match self {
            Self::Shared(coords) => strictly_increasing(coords.view()),
            Self::PerRow(coords) => coords.outer_iter().all(strictly_increasing),
        }
    }
}

pub(crate) fn strictly_increasing(coords: ArrayView1<'_, f32>) -> bool {
    coords
        .iter()
        .zip(coords.iter().skip(1))
        .all(|(prev, next)| next > prev)
}

/// How overlapping splats are combined in the scattered gridder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterMode {
    /// The sample projecting closest to the cell centre wins.
    #[default]
    Nearest,
    /// Inverse squared distance weighted mean of every covering sample.
    InverseDistance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn shared_coordinates_must_match_columns() {
        let coords = array![0.0f32, 1.0, 2.0];
        let shared = ColumnCoordinates::Shared(coords.view());
        assert!(shared.validate(5, 3).is_ok());
        assert!(shared.validate(5, 4).is_err());
    }

    #[test]
    fn per_row_coordinates_must_match_field() {
        let coords = Array2::<f32>::zeros((2, 3));
        let per_row = ColumnCoordinates::PerRow(coords.view());
        assert!(per_row.validate(2, 3).is_ok());
        assert!(per_row.validate(3, 3).is_err());
    }

    #[test]
    fn monotonic_detection() {
        let rising = array![[0.0f32, 1.0, 2.0], [5.0, 6.0, 9.0]];
        assert!(ColumnCoordinates::PerRow(rising.view()).is_monotonic());

        let dip = array![0.0f32, 2.0, 1.0];
        assert!(!ColumnCoordinates::Shared(dip.view()).is_monotonic());
    }

    #[test]
    fn scatter_mode_reads_snake_case() {
        let mode: ScatterMode = serde_json::from_str("\"inverse_distance\"").unwrap();
        assert_eq!(mode, ScatterMode::InverseDistance);
        assert_eq!(ScatterMode::default(), ScatterMode::Nearest);
    }
}
