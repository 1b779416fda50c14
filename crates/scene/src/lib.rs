pub mod camera;
pub mod mesh;
pub mod picking;
pub mod view_fit;

pub use camera::*;
pub use mesh::*;
pub use picking::*;
pub use view_fit::*;
