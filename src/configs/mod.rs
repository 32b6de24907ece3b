pub mod base;
pub mod catalog;
pub mod logging;
pub mod player;

pub use base::*;
pub use catalog::*;
pub use logging::*;
pub use player::*;
