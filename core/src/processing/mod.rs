pub mod column;
pub mod layers;
pub mod scatter;
pub mod upsample;

pub use column::{resample_column, ColumnResampler};
pub use layers::{rasterize_layers, LayerRasterizer};
pub use scatter::{grid_scattered, ScatteredGridder};
pub use upsample::{normalize_cyclic, upsample, DimensionUpsampler};
