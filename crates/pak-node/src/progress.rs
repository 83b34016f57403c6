//! Progress reporting.
//!
//! The regrouper and the differ invoke an observer synchronously before
//! costly steps (entering a top-level group, beginning extraction) and after
//! completing a unit of work. Hooks must be cheap and non-blocking; within a
//! single comparison run they are never invoked concurrently. Observers are
//! injected per call -- there is no process-wide listener state.

/// Receives progress notifications during regrouping and comparison.
pub trait ProgressObserver: Send + Sync {
    /// A new phase of work began. The label is human-readable.
    fn phase_changed(&self, label: &str);

    /// A unit of work completed, `done` out of `total`.
    fn unit_completed(&self, done: usize, total: usize);
}

/// Observer that discards all notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn phase_changed(&self, _label: &str) {}

    fn unit_completed(&self, _done: usize, _total: usize) {}
}
