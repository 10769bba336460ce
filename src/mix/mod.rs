//! Melody-following mix pipeline.

pub mod mixer;
pub mod progress;

pub use mixer::{extract_looped, reference_melody_params, MelodyMixer};
pub use progress::{NullProgress, ProgressSink, ProgressUpdate};
