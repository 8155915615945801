//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag the batch checks after every emitted variant.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelDecision {
    /// Stop the current image and the batch
    Abort,
    /// Clear the request and carry on
    Resume,
}

/// Decides what a tripped token means.
pub trait CancelHandler {
    fn on_cancel(&mut self) -> CancelDecision;
}

impl<F> CancelHandler for F
where
    F: FnMut() -> CancelDecision,
{
    fn on_cancel(&mut self) -> CancelDecision {
        self()
    }
}

/// Handler that always aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnCancel;

impl CancelHandler for AbortOnCancel {
    fn on_cancel(&mut self) -> CancelDecision {
        CancelDecision::Abort
    }
}
