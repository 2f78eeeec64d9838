use ndarray::{ArrayView1, ArrayView2};

use crate::prelude::{ensure_shape, RegridResult};

/// Per-ray layer geometry of a layer product.
///
/// `base` and `top` are shaped `(rays, max_layers)`; only the first
/// `counts[ray]` entries of each row describe real layers.
#[derive(Debug, Clone, Copy)]
pub struct LayerSet<'a> {
    pub counts: ArrayView1<'a, u8>,
    pub base: ArrayView2<'a, f32>,
    pub top: ArrayView2<'a, f32>,
}

impl<'a> LayerSet<'a> {
    pub fn new(
        counts: ArrayView1<'a, u8>,
        base: ArrayView2<'a, f32>,
        top: ArrayView2<'a, f32>,
    ) -> Self {
        Self { counts, base, top }
    }

    pub fn validate(&self, rays: usize, max_layers: usize) -> RegridResult<()> {
        ensure_shape("layer counts", self.counts.shape(), &[rays])?;
        ensure_shape("base altitudes", self.base.shape(), &[rays, max_layers])?;
        ensure_shape("top altitudes", self.top.shape(), &[rays, max_layers])
    }

    pub fn max_layers(&self) -> usize {
        self.base.ncols()
    }

    /// Layers of `ray` as `(index, base, top)`, clipped to the array width.
    pub fn layers(&self, ray: usize) -> impl Iterator<Item = (usize, f32, f32)> + 'a {
        let set = *self;
        let active = usize::from(set.counts[ray]).min(set.max_layers());
        (0..active).map(move |layer| (layer, set.base[[ray, layer]], set.top[[ray, layer]]))
    }
}
