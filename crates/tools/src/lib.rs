pub mod base_maps;
pub mod render;

pub use base_maps::*;
pub use render::*;
