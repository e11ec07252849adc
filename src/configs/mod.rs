pub mod base;
pub mod library;
pub mod logging;
pub mod youtube;

pub use base::*;
pub use library::*;
pub use logging::*;
pub use youtube::*;
