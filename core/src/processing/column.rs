use ndarray::{ArrayView1, ArrayView2, Zip};

use crate::grid::ColumnCoordinates;
use crate::prelude::{checked_cells, Field2D, RegridError, RegridResult};
use crate::telemetry::log::LogManager;

/// Nearest-neighbour resampling of a field along its second axis.
///
/// Both `coords_in` and `coords_out` must increase monotonically. This is not
/// checked here; [`ColumnCoordinates::is_monotonic`] is available to callers
/// that cannot guarantee it. On non-monotonic input the cursor search stops
/// early and returns a local, not global, nearest neighbour.
#[derive(Debug, Clone, Copy)]
pub struct ColumnResampler<'a, 'b> {
    pub coords_in: ColumnCoordinates<'a>,
    pub coords_out: ArrayView1<'b, f32>,
}

impl<'a, 'b> ColumnResampler<'a, 'b> {
    pub fn new(coords_in: ColumnCoordinates<'a>, coords_out: ArrayView1<'b, f32>) -> Self {
        Self {
            coords_in,
            coords_out,
        }
    }

    pub fn apply(&self, data: ArrayView2<'_, f32>) -> RegridResult<Field2D> {
        let (rows, cols) = data.dim();
        self.coords_in.validate(rows, cols)?;

        let out_cols = self.coords_out.len();
        if cols == 0 && out_cols > 0 && rows > 0 {
            return Err(RegridError::Shape(
                "cannot resample from an empty coordinate axis".into(),
            ));
        }
        checked_cells(rows, out_cols)?;
        let logger = LogManager::new("ColumnResampler");

        let mut out = Field2D::zeros((rows, out_cols));
        match self.coords_in {
            ColumnCoordinates::Shared(coords) => {
                // One mapping serves every row.
                let mapping = nearest_indices(coords, self.coords_out);
                Zip::from(out.rows_mut())
                    .and(data.rows())
                    .par_for_each(|mut out_row, data_row| {
                        for (cell, &source) in out_row.iter_mut().zip(&mapping) {
                            *cell = data_row[source];
                        }
                    });
            }
            ColumnCoordinates::PerRow(coords) => {
                Zip::from(out.rows_mut())
                    .and(data.rows())
                    .and(coords.rows())
                    .par_for_each(|mut out_row, data_row, coord_row| {
                        let mapping = nearest_indices(coord_row, self.coords_out);
                        for (cell, &source) in out_row.iter_mut().zip(&mapping) {
                            *cell = data_row[source];
                        }
                    });
            }
        }

        logger.record_shapes(&[rows, cols], &[rows, out_cols]);
        Ok(out)
    }
}

/// For each target coordinate, the index of the nearest source coordinate.
///
/// The cursor only moves forward: from the last match it advances while the
/// distance strictly decreases.
fn nearest_indices(source: ArrayView1<'_, f32>, targets: ArrayView1<'_, f32>) -> Vec<usize> {
    let mut cursor = 0usize;
    targets
        .iter()
        .map(|&target| {
            let mut best = f32::INFINITY;
            for (index, &coord) in source.iter().enumerate().skip(cursor) {
                let distance = (target - coord).abs();
                if distance < best {
                    best = distance;
                    cursor = index;
                } else {
                    break;
                }
            }
            cursor
        })
        .collect()
}

/// Resamples `data` onto `coords_out`; see [`ColumnResampler`].
pub fn resample_column(
    data: ArrayView2<'_, f32>,
    coords_in: ColumnCoordinates<'_>,
    coords_out: ArrayView1<'_, f32>,
) -> RegridResult<Field2D> {
    ColumnResampler::new(coords_in, coords_out).apply(data)
}
