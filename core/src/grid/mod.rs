pub mod coords;
pub mod extent;
pub mod layers;

pub use coords::{ColumnCoordinates, ScatterMode};
pub use extent::{AxisExtent, AxisStride};
pub use layers::LayerSet;
