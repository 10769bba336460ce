pub mod melody;
pub mod pitch;

pub use melody::*;
pub use pitch::*;
