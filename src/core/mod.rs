//! Core types, window functions, and resampling utilities.

pub mod resample;
pub mod types;
pub mod window;

pub use types::*;
pub use window::hann_window;
