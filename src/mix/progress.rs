//! Progress reporting for long-running transforms.

/// A single progress checkpoint emitted while a transform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Short label for the stage currently running.
    pub step: &'static str,
    /// Overall completion, 0 to 100. Never decreases across a run.
    pub percent: u8,
}

/// Receives progress checkpoints from the mixer.
///
/// Checkpoints are informational only. The mixer never inspects the sink's
/// state and keeps running regardless of what the sink does with an update.
pub trait ProgressSink {
    /// Called once per checkpoint.
    fn report(&mut self, update: ProgressUpdate);
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _update: ProgressUpdate) {}
}

impl<F: FnMut(ProgressUpdate)> ProgressSink for F {
    fn report(&mut self, update: ProgressUpdate) {
        self(update)
    }
}
