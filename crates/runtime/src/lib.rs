pub mod frame;
pub mod render_queue;
pub mod work_queue;

pub use frame::*;
pub use render_queue::*;
pub use work_queue::*;
