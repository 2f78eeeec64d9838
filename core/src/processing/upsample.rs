use ndarray::{ArrayView2, ArrayViewMut2, Zip};
use serde::{Deserialize, Serialize};

use crate::grid::AxisStride;
use crate::math::{signed_remainder, wrap_into};
use crate::prelude::{checked_cells, Field2D, RegridResult};
use crate::telemetry::log::LogManager;

/// Bilinear upsampling of a coarse field onto an integer-stride dense grid.
///
/// With a non-zero `modulus` the field is treated as cyclic (e.g. degrees),
/// and corner differences are taken the short way round before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionUpsampler {
    pub x: AxisStride,
    pub y: AxisStride,
    #[serde(default)]
    pub modulus: Option<f32>,
}

impl DimensionUpsampler {
    pub fn new(x: AxisStride, y: AxisStride) -> Self {
        Self {
            x,
            y,
            modulus: None,
        }
    }

    pub fn cyclic(mut self, modulus: f32) -> Self {
        self.modulus = Some(modulus);
        self
    }

    /// Output shape for a `rows` x `cols` source field.
    pub fn output_shape(&self, rows: usize, cols: usize) -> RegridResult<(usize, usize)> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        let out_rows = self.x.output_len(rows)?;
        let out_cols = self.y.output_len(cols)?;
        checked_cells(out_rows, out_cols)?;
        Ok((out_rows, out_cols))
    }

    pub fn apply(&self, data: ArrayView2<'_, f32>) -> RegridResult<Field2D> {
        let (rows, cols) = data.dim();
        let shape = self.output_shape(rows, cols)?;
        let logger = LogManager::new("DimensionUpsampler");

        let mut out = Field2D::zeros(shape);
        let modulus = self.modulus.filter(|m| *m != 0.0);
        Zip::indexed(&mut out).par_for_each(|(i, j), cell| {
            *cell = self.sample(&data, i, j, modulus);
        });

        logger.record_shapes(&[rows, cols], &[shape.0, shape.1]);
        Ok(out)
    }

    fn sample(&self, data: &ArrayView2<'_, f32>, i: usize, j: usize, modulus: Option<f32>) -> f32 {
        let (rows, cols) = data.dim();
        let (k0, k1, dk) = corners(self.x.source_position(i), rows);
        let (l0, l1, dl) = corners(self.y.source_position(j), cols);

        let anchor = data[[k0, l0]];
        let terms = [
            ((1.0 - dk) * dl, data[[k0, l1]]),
            (dk * (1.0 - dl), data[[k1, l0]]),
            (dk * dl, data[[k1, l1]]),
        ];

        match modulus {
            Some(m) => {
                // Offsets from the anchor, reduced into (-m/2, m/2].
                anchor
                    + terms
                        .iter()
                        .filter(|(w, _)| *w != 0.0)
                        .map(|&(w, v)| w * signed_remainder(v - anchor, m))
                        .sum::<f32>()
            }
            None => {
                let w0 = (1.0 - dk) * (1.0 - dl);
                let base = if w0 != 0.0 { w0 * anchor } else { 0.0 };
                base + terms
                    .iter()
                    .filter(|(w, _)| *w != 0.0)
                    .map(|&(w, v)| w * v)
                    .sum::<f32>()
            }
        }
    }
}

/// Floors a fractional position to its two bracketing indices, clamped to `[0, dim - 1]`.
fn corners(position: f32, dim: usize) -> (usize, usize, f32) {
    let lower = position.floor();
    let fraction = position - lower;
    let last = dim.saturating_sub(1) as i64;
    let k0 = (lower as i64).clamp(0, last) as usize;
    let k1 = (lower as i64).saturating_add(1).clamp(0, last) as usize;
    (k0, k1, fraction)
}

/// Upsamples `data` by `(stride_x, stride_y)`; see [`DimensionUpsampler`].
pub fn upsample(
    data: ArrayView2<'_, f32>,
    offset_x: i32,
    stride_x: i32,
    offset_y: i32,
    stride_y: i32,
    modulus: Option<f32>,
) -> RegridResult<Field2D> {
    DimensionUpsampler {
        x: AxisStride::new(offset_x, stride_x),
        y: AxisStride::new(offset_y, stride_y),
        modulus,
    }
    .apply(data)
}

/// Folds every finite cell of `field` into `[lower, lower + period)`.
///
/// Used after cyclic upsampling of geolocation, e.g. longitudes with
/// `(-180, 360)` and latitudes with `(-90, 180)`.
pub fn normalize_cyclic(mut field: ArrayViewMut2<'_, f32>, lower: f32, period: f32) {
    field.par_mapv_inplace(|value| {
        if value.is_finite() {
            wrap_into(value, lower, period)
        } else {
            value
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::RegridError;
    use ndarray::array;

    #[test]
    fn output_shape_is_scaled_by_stride() {
        let data = array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let out = upsample(data.view(), 0, 2, 0, 3, None).unwrap();
        assert_eq!(out.dim(), (6, 6));
    }

    #[test]
    fn midpoints_are_bilinear() {
        let data = array![[0.0f32, 10.0], [20.0, 30.0]];
        let out = upsample(data.view(), 0, 2, 0, 2, None).unwrap();
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 1]], 5.0);
        assert_eq!(out[[1, 0]], 10.0);
        assert_eq!(out[[1, 1]], 15.0);
        assert_eq!(out[[2, 2]], 30.0);
        // Beyond the last source row the border is replicated.
        assert_eq!(out[[3, 3]], 30.0);
    }

    #[test]
    fn negative_positions_clamp_to_first_cell() {
        let data = array![[7.0f32, 9.0], [11.0, 13.0]];
        let out = upsample(data.view(), 2, 2, 0, 1, None).unwrap();
        assert_eq!(out[[0, 0]], 7.0);
        assert_eq!(out[[1, 1]], 9.0);
        assert_eq!(out[[2, 0]], 7.0);
    }

    #[test]
    fn cyclic_mode_interpolates_across_wrap_point() {
        let data = array![[350.0f32, 10.0]];
        let out = upsample(data.view(), 0, 1, 0, 2, Some(360.0)).unwrap();
        assert_eq!(out[[0, 0]], 350.0);
        assert_eq!(out[[0, 1]], 360.0);
        assert_eq!(out[[0, 2]], 10.0);

        let plain = upsample(data.view(), 0, 1, 0, 2, None).unwrap();
        assert_eq!(plain[[0, 1]], 180.0);
    }

    #[test]
    fn zero_modulus_is_plain_bilinear() {
        let data = array![[0.0f32, 4.0]];
        let out = upsample(data.view(), 0, 1, 0, 2, Some(0.0)).unwrap();
        assert_eq!(out[[0, 1]], 2.0);
    }

    #[test]
    fn aligned_cells_ignore_nan_neighbours() {
        let data = array![[1.0f32, f32::NAN], [f32::NAN, f32::NAN]];
        let out = upsample(data.view(), 0, 2, 0, 2, None).unwrap();
        assert_eq!(out[[0, 0]], 1.0);
        assert!(out[[0, 1]].is_nan());
    }

    #[test]
    fn non_positive_stride_is_rejected() {
        let data = array![[1.0f32]];
        let err = upsample(data.view(), 0, 0, 0, 1, None).unwrap_err();
        assert!(matches!(err, RegridError::InvalidParameter(_)));
        let err = upsample(data.view(), 0, 1, 0, -3, None).unwrap_err();
        assert!(matches!(err, RegridError::InvalidParameter(_)));
    }

    #[test]
    fn normalize_cyclic_wraps_longitudes() {
        let mut lon = array![[170.0f32, 190.0], [-200.0, f32::NAN]];
        normalize_cyclic(lon.view_mut(), -180.0, 360.0);
        assert_eq!(lon[[0, 0]], 170.0);
        assert_eq!(lon[[0, 1]], -170.0);
        assert_eq!(lon[[1, 0]], 160.0);
        assert!(lon[[1, 1]].is_nan());
    }
}
