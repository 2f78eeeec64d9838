use serde::{Deserialize, Serialize};

use crate::prelude::{RegridError, RegridResult};

/// Rectilinear output axis: `count` cells spanning physical `start..end`.
///
/// `end` may be smaller than `start` for axes drawn top-down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisExtent {
    pub start: f32,
    pub end: f32,
    pub count: usize,
}

impl AxisExtent {
    pub fn new(start: f32, end: f32, count: usize) -> Self {
        Self { start, end, count }
    }

    pub fn span(&self) -> f32 {
        self.end - self.start
    }

    /// Rejects a degenerate span, which would make every pixel position infinite.
    pub fn validate(&self, axis: &str) -> RegridResult<()> {
        let span = self.span();
        if !span.is_finite() || span == 0.0 {
            return Err(RegridError::InvalidParameter(format!(
                "{} extent {}..{} has no usable span",
                axis, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Continuous output-pixel coordinate of a physical value.
    pub fn pixel_position(&self, value: f32) -> f32 {
        (value - self.start) / self.span() * self.count as f32
    }

    /// Splat radius in pixels covering a data point of physical size `footprint`.
    ///
    /// Never smaller than one pixel, so adjacent samples always overlap.
    pub fn footprint_radius(&self, footprint: f32) -> i32 {
        let pixels = footprint / self.span().abs() * self.count as f32 + 0.5;
        if pixels.is_finite() {
            (pixels as i32).max(1)
        } else {
            1
        }
    }
}

/// Offset/stride pair describing how a coarse axis maps onto a dense one.
///
/// Source cell `k` lands on output index `offset + k * stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisStride {
    #[serde(default)]
    pub offset: i32,
    pub stride: i32,
}

impl AxisStride {
    pub fn new(offset: i32, stride: i32) -> Self {
        Self { offset, stride }
    }

    pub fn validate(&self, axis: &str) -> RegridResult<()> {
        if self.stride <= 0 {
            return Err(RegridError::InvalidParameter(format!(
                "{} stride must be positive, got {}",
                axis, self.stride
            )));
        }
        Ok(())
    }

    /// Length of the dense axis produced from `dim` source cells.
    pub fn output_len(&self, dim: usize) -> RegridResult<usize> {
        usize::try_from(self.stride)
            .ok()
            .and_then(|stride| dim.checked_mul(stride))
            .ok_or_else(|| {
                RegridError::Size(format!(
                    "{} source cells with stride {} overflow",
                    dim, self.stride
                ))
            })
    }

    /// Fractional source position of dense index `index`.
    pub fn source_position(&self, index: usize) -> f32 {
        (index as f64 - self.offset as f64) as f32 / self.stride as f32
    }
}
