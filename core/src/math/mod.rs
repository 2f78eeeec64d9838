pub mod rounding;
pub mod stats;

pub use rounding::{anchor_index, signed_remainder, wrap_into};
pub use stats::FieldStats;
