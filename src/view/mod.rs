mod anchors;
mod container;
mod core;
mod element;
mod tree;
mod window;
mod window_stack;

pub use anchors::*;
pub use container::*;
pub use element::*;
pub use self::core::*;
pub use tree::*;
pub use window::*;
pub use window_stack::*;
