//! Regridding core for satellite swath and profile products.
//!
//! Four stateless operations turn coarse or scattered swath samples into
//! dense rectilinear grids: bilinear dimension upsampling, nearest-neighbour
//! column resampling, scattered-sample gridding and layer rasterization.
//! Each call validates its inputs up front and returns a freshly allocated
//! [`Field2D`].

pub mod grid;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{Field2D, RegridError, RegridResult};
pub use processing::{grid_scattered, rasterize_layers, resample_column, upsample};
