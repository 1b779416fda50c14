//! Render-thread core of the data globe: configuration, gesture handling and
//! the [`WorldView`] that ties mesh, camera and overlays together.

pub mod config;
pub mod gesture;
pub mod view;

pub use config::*;
pub use gesture::*;
pub use view::*;
