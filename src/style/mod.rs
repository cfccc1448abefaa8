mod color;
mod theming;

pub use color::*;
pub use theming::*;
