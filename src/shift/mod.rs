pub mod psola;

pub use psola::PitchShifter;
