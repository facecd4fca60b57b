/// Receives status and progress from long-running operations.
///
/// Implementations must be cheap; they are called from inside download
/// loops. Front ends that need to hop threads should forward into a queue
/// (see [`crate::core::tasks::ChannelObserver`]).
pub trait InstallObserver: Send + Sync {
    /// A human-readable stage description ("Downloading 1.20.4.jar...").
    fn on_status(&self, message: &str);

    /// Fraction in `0.0..=1.0` for the file currently being transferred.
    fn on_progress(&self, fraction: f32);

    /// A line of output from the game process.
    fn on_log(&self, _line: &str) {}
}

/// Observer that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl InstallObserver for NoopObserver {
    fn on_status(&self, _message: &str) {}

    fn on_progress(&self, _fraction: f32) {}
}
