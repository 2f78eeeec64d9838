use ndarray::{s, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use crate::grid::{AxisExtent, LayerSet};
use crate::prelude::{checked_cells, Field2D, RegridResult};
use crate::telemetry::log::LogManager;

fn default_fill() -> f32 {
    f32::NAN
}

/// Paints per-ray vertical layers onto a regular altitude grid.
///
/// Layers are painted in array order, so where two layers of a ray overlap
/// the one with the higher index wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerRasterizer {
    pub y: AxisExtent,
    #[serde(default = "default_fill")]
    pub fill: f32,
}

impl LayerRasterizer {
    pub fn new(y: AxisExtent) -> Self {
        Self {
            y,
            fill: default_fill(),
        }
    }

    pub fn with_fill(mut self, fill: f32) -> Self {
        self.fill = fill;
        self
    }

    /// Half-open range of grid cells covered by a layer between `base` and `top`.
    fn cells(&self, base: f32, top: f32) -> std::ops::Range<usize> {
        if !base.is_finite() || !top.is_finite() {
            return 0..0;
        }
        let low = self.y.pixel_position(base).round().max(0.0) as usize;
        let high = self
            .y
            .pixel_position(top)
            .round()
            .clamp(0.0, self.y.count as f32) as usize;
        low.min(high)..high
    }

    /// `data` holds one value per (ray, layer) and fixes the layer-array shape.
    pub fn apply(
        &self,
        data: ArrayView2<'_, f32>,
        layers: &LayerSet<'_>,
    ) -> RegridResult<Field2D> {
        let (rays, max_layers) = data.dim();
        layers.validate(rays, max_layers)?;
        self.y.validate("y")?;
        checked_cells(rays, self.y.count)?;
        let logger = LogManager::new("LayerRasterizer");

        let mut out = Field2D::from_elem((rays, self.y.count), self.fill);
        Zip::indexed(out.rows_mut()).par_for_each(|ray, mut row| {
            for (layer, base, top) in layers.layers(ray) {
                let value = data[[ray, layer]];
                row.slice_mut(s![self.cells(base, top)]).fill(value);
            }
        });

        logger.record_shapes(&[rays, max_layers], &[rays, self.y.count]);
        Ok(out)
    }
}

/// Rasterizes a layer product; see [`LayerRasterizer`].
pub fn rasterize_layers(
    data: ArrayView2<'_, f32>,
    layers: &LayerSet<'_>,
    y_extent: AxisExtent,
    fill: f32,
) -> RegridResult<Field2D> {
    LayerRasterizer::new(y_extent).with_fill(fill).apply(data, layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::RegridError;
    use ndarray::array;

    fn altitude() -> AxisExtent {
        // 0..20 km in 1 km cells.
        AxisExtent::new(0.0, 20.0, 20)
    }

    #[test]
    fn ray_without_layers_is_all_fill() {
        let data = array![[5.0f32], [6.0]];
        let counts = array![0u8, 1];
        let base = array![[2.0f32], [2.0]];
        let top = array![[4.0f32], [4.0]];
        let layers = LayerSet::new(counts.view(), base.view(), top.view());

        let out = rasterize_layers(data.view(), &layers, altitude(), -1.0).unwrap();
        assert!(out.row(0).iter().all(|&v| v == -1.0));
        assert_eq!(out[[1, 2]], 6.0);
        assert_eq!(out[[1, 3]], 6.0);
        assert_eq!(out[[1, 4]], -1.0);
    }

    #[test]
    fn later_layer_wins_overlap() {
        let data = array![[1.0f32, 2.0]];
        let counts = array![2u8];
        let base = array![[1.0f32, 3.0]];
        let top = array![[5.0f32, 7.0]];
        let layers = LayerSet::new(counts.view(), base.view(), top.view());

        let out = rasterize_layers(data.view(), &layers, altitude(), 0.0).unwrap();
        assert_eq!(
            out.row(0).slice(s![0..8]).to_vec(),
            vec![0.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 0.0]
        );
    }

    #[test]
    fn layers_are_clipped_to_grid() {
        let data = array![[9.0f32]];
        let counts = array![1u8];
        let base = array![[-3.0f32]];
        let top = array![[40.0f32]];
        let layers = LayerSet::new(counts.view(), base.view(), top.view());

        let out = rasterize_layers(data.view(), &layers, altitude(), 0.0).unwrap();
        assert!(out.iter().all(|&v| v == 9.0));
    }

    #[test]
    fn counts_beyond_layer_width_are_ignored() {
        let data = array![[4.0f32]];
        let counts = array![9u8];
        let base = array![[0.0f32]];
        let top = array![[1.0f32]];
        let layers = LayerSet::new(counts.view(), base.view(), top.view());

        let out = rasterize_layers(data.view(), &layers, altitude(), 0.0).unwrap();
        assert_eq!(out[[0, 0]], 4.0);
        assert_eq!(out[[0, 1]], 0.0);
    }

    #[test]
    fn inverted_or_missing_layers_paint_nothing() {
        let data = array![[1.0f32, 2.0]];
        let counts = array![2u8];
        let base = array![[6.0f32, f32::NAN]];
        let top = array![[2.0f32, 8.0]];
        let layers = LayerSet::new(counts.view(), base.view(), top.view());

        let out = rasterize_layers(data.view(), &layers, altitude(), 0.0).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let data = array![[1.0f32, 2.0]];
        let counts = array![1u8, 1];
        let base = array![[1.0f32, 2.0]];
        let layers = LayerSet::new(counts.view(), base.view(), base.view());
        let err = rasterize_layers(data.view(), &layers, altitude(), 0.0).unwrap_err();
        assert!(matches!(err, RegridError::Shape(_)));
    }
}
