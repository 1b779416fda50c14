pub mod base_map;
pub mod grid;
pub mod overlay;
pub mod raster;
pub mod symbology;

pub use base_map::*;
pub use grid::*;
pub use overlay::*;
pub use raster::*;
pub use symbology::*;
