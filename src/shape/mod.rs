mod drawable;
mod surface;

pub use drawable::*;
pub use surface::*;
