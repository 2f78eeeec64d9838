use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// NaN-aware summary of a field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldStats {
    pub cells: usize,
    pub valid: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub mean: Option<f32>,
}

impl FieldStats {
    pub fn of(field: ArrayView2<'_, f32>) -> Self {
        let mut stats = Self {
            cells: field.len(),
            ..Default::default()
        };
        let mut sum = 0.0f64;
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;

        for &value in field.iter().filter(|v| v.is_finite()) {
            stats.valid += 1;
            sum += f64::from(value);
            lo = lo.min(value);
            hi = hi.max(value);
        }

        if stats.valid > 0 {
            stats.min = Some(lo);
            stats.max = Some(hi);
            stats.mean = Some((sum / stats.valid as f64) as f32);
        }
        stats
    }

    /// Fraction of cells holding a finite value.
    pub fn coverage(&self) -> f32 {
        if self.cells == 0 {
            return 0.0;
        }
        self.valid as f32 / self.cells as f32
    }
}
