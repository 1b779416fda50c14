pub mod error;
pub mod renderer;
pub mod texture;
pub mod uniforms;

pub use error::*;
pub use renderer::*;
pub use texture::*;
pub use uniforms::*;
