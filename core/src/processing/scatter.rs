use ndarray::{ArrayView2, ArrayViewMut1, Zip};
use serde::{Deserialize, Serialize};

use crate::grid::{AxisExtent, ScatterMode};
use crate::math::anchor_index;
use crate::prelude::{checked_cells, ensure_shape, Field2D, RegridError, RegridResult};
use crate::telemetry::log::LogManager;

fn default_fill() -> f32 {
    f32::NAN
}

/// Rasterizes scattered samples with per-cell coordinates onto a rectilinear grid.
///
/// Every finite sample is projected into output pixel space, anchored to the
/// nearest cell and splatted over a `(2 * radius_x + 1) x (2 * radius_y + 1)`
/// window. How overlapping splats combine is selected by [`ScatterMode`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatteredGridder {
    pub x: AxisExtent,
    pub y: AxisExtent,
    #[serde(default = "default_fill")]
    pub fill: f32,
    #[serde(default)]
    pub radius_x: i32,
    #[serde(default)]
    pub radius_y: i32,
    #[serde(default)]
    pub mode: ScatterMode,
}

/// A sample projected into output pixel space.
#[derive(Debug, Clone, Copy)]
struct Splat {
    kf: f32,
    lf: f32,
    k: i64,
    l: i64,
    value: f32,
}

impl Splat {
    fn columns(&self, radius: i64, count: usize) -> std::ops::Range<usize> {
        window(self.l, radius, count)
    }
}

/// Cells of an axis of length `count` within `radius` of `anchor`.
fn window(anchor: i64, radius: i64, count: usize) -> std::ops::Range<usize> {
    let lo = anchor.saturating_sub(radius).max(0);
    let hi = anchor.saturating_add(radius).saturating_add(1).min(count as i64);
    if lo >= hi {
        0..0
    } else {
        lo as usize..hi as usize
    }
}

impl ScatteredGridder {
    pub fn new(x: AxisExtent, y: AxisExtent) -> Self {
        Self {
            x,
            y,
            fill: default_fill(),
            radius_x: 0,
            radius_y: 0,
            mode: ScatterMode::default(),
        }
    }

    pub fn with_radius(mut self, radius_x: i32, radius_y: i32) -> Self {
        self.radius_x = radius_x;
        self.radius_y = radius_y;
        self
    }

    pub fn with_fill(mut self, fill: f32) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_mode(mut self, mode: ScatterMode) -> Self {
        self.mode = mode;
        self
    }

    fn validate(
        &self,
        data: &ArrayView2<'_, f32>,
        x_in: &ArrayView2<'_, f32>,
        y_in: &ArrayView2<'_, f32>,
    ) -> RegridResult<()> {
        ensure_shape("x coordinates", x_in.shape(), data.shape())?;
        ensure_shape("y coordinates", y_in.shape(), data.shape())?;
        self.x.validate("x")?;
        self.y.validate("y")?;
        if self.radius_x < 0 || self.radius_y < 0 {
            return Err(RegridError::InvalidParameter(format!(
                "splat radius must be non-negative, got ({}, {})",
                self.radius_x, self.radius_y
            )));
        }
        checked_cells(self.x.count, self.y.count)?;
        Ok(())
    }

    pub fn apply(
        &self,
        data: ArrayView2<'_, f32>,
        x_in: ArrayView2<'_, f32>,
        y_in: ArrayView2<'_, f32>,
    ) -> RegridResult<Field2D> {
        self.validate(&data, &x_in, &y_in)?;
        let logger = LogManager::new("ScatteredGridder");

        let splats = self.project(&data, &x_in, &y_in);
        logger.detail(&format!(
            "{} of {} samples projected ({:?})",
            splats.len(),
            data.len(),
            self.mode
        ));

        // Per output row, the splats touching it in input order. Keeping input
        // order makes nearest-mode ties resolve to the first sample.
        let radius_x = i64::from(self.radius_x);
        let mut by_row: Vec<Vec<usize>> = vec![Vec::new(); self.x.count];
        for (index, splat) in splats.iter().enumerate() {
            for row in window(splat.k, radius_x, self.x.count) {
                by_row[row].push(index);
            }
        }

        let mut out = Field2D::from_elem((self.x.count, self.y.count), self.fill);
        Zip::indexed(out.rows_mut()).par_for_each(|row, out_row| {
            let touching = by_row[row].iter().map(|&index| &splats[index]);
            match self.mode {
                ScatterMode::Nearest => self.paint_nearest(row, touching, out_row),
                ScatterMode::InverseDistance => self.paint_weighted(row, touching, out_row),
            }
        });

        logger.record_shapes(data.shape(), &[self.x.count, self.y.count]);
        Ok(out)
    }

    fn project(
        &self,
        data: &ArrayView2<'_, f32>,
        x_in: &ArrayView2<'_, f32>,
        y_in: &ArrayView2<'_, f32>,
    ) -> Vec<Splat> {
        data.indexed_iter()
            .filter(|(_, value)| !value.is_nan())
            .filter_map(|(index, &value)| {
                let kf = self.x.pixel_position(x_in[index]);
                let lf = self.y.pixel_position(y_in[index]);
                if !kf.is_finite() || !lf.is_finite() {
                    return None;
                }
                Some(Splat {
                    kf,
                    lf,
                    k: anchor_index(kf),
                    l: anchor_index(lf),
                    value,
                })
            })
            .collect()
    }

    fn paint_nearest<'s>(
        &self,
        row: usize,
        touching: impl Iterator<Item = &'s Splat>,
        mut out_row: ArrayViewMut1<'_, f32>,
    ) {
        let radius_y = i64::from(self.radius_y);
        let mut best = vec![f32::INFINITY; out_row.len()];
        for splat in touching {
            let dk = row as f32 - splat.kf;
            for col in splat.columns(radius_y, self.y.count) {
                let dl = col as f32 - splat.lf;
                let distance = dk * dk + dl * dl;
                if distance < best[col] {
                    best[col] = distance;
                    out_row[col] = splat.value;
                }
            }
        }
    }

    fn paint_weighted<'s>(
        &self,
        row: usize,
        touching: impl Iterator<Item = &'s Splat>,
        mut out_row: ArrayViewMut1<'_, f32>,
    ) {
        let radius_y = i64::from(self.radius_y);
        let mut cells = vec![WeightedCell::default(); out_row.len()];
        for splat in touching {
            let dk = row as f64 - f64::from(splat.kf);
            for col in splat.columns(radius_y, self.y.count) {
                let dl = col as f64 - f64::from(splat.lf);
                cells[col].add(splat.value, dk * dk + dl * dl);
            }
        }
        for (cell, acc) in out_row.iter_mut().zip(&cells) {
            if let Some(value) = acc.value() {
                *cell = value;
            }
        }
    }
}

/// Running inverse squared distance sums for one output cell.
///
/// Accumulated in `f64`: a sample a hair off a cell centre has a weight far
/// beyond the `f32` range.
#[derive(Debug, Clone, Copy, Default)]
struct WeightedCell {
    weighted: f64,
    weight: f64,
    exact: f64,
    exact_hits: u32,
}

impl WeightedCell {
    fn add(&mut self, value: f32, distance_sq: f64) {
        let value = f64::from(value);
        if distance_sq == 0.0 {
            // Infinite weight: exact hits override everything else.
            self.exact += value;
            self.exact_hits += 1;
        } else {
            let coef = 1.0 / distance_sq;
            self.weighted += value * coef;
            self.weight += coef;
        }
    }

    fn value(&self) -> Option<f32> {
        if self.exact_hits > 0 {
            Some((self.exact / f64::from(self.exact_hits)) as f32)
        } else if self.weight != 0.0 {
            Some((self.weighted / self.weight) as f32)
        } else {
            None
        }
    }
}

/// Grids `data` sampled at `(x_in, y_in)`; see [`ScatteredGridder`].
#[allow(clippy::too_many_arguments)]
pub fn grid_scattered(
    data: ArrayView2<'_, f32>,
    x_in: ArrayView2<'_, f32>,
    y_in: ArrayView2<'_, f32>,
    x_extent: AxisExtent,
    y_extent: AxisExtent,
    fill: f32,
    radius_x: i32,
    radius_y: i32,
    mode: ScatterMode,
) -> RegridResult<Field2D> {
    ScatteredGridder::new(x_extent, y_extent)
        .with_fill(fill)
        .with_radius(radius_x, radius_y)
        .with_mode(mode)
        .apply(data, x_in, y_in)
}
