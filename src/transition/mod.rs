mod state_transition;
mod time_function;

pub use state_transition::*;
pub use time_function::*;
