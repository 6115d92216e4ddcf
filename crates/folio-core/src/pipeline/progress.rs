//! Progress reporting for a pipeline run.

use tokio::sync::mpsc;

use crate::types::ProcessingStep;

/// Receives each [`ProcessingStep`] as the pipeline reaches it.
///
/// Called from the orchestrating task, never from a blocking worker, so
/// implementations should return quickly.
pub trait ProgressObserver: Send + Sync {
    fn on_step(&self, step: ProcessingStep);
}

/// Observer that ignores every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_step(&self, _step: ProcessingStep) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(ProcessingStep) + Send + Sync,
{
    fn on_step(&self, step: ProcessingStep) {
        self(step)
    }
}

/// Forwards steps into an unbounded channel.
///
/// Lets a transport task (an SSE stream, a websocket) relay progress without
/// the pipeline waiting on it. Steps sent after the receiver is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<ProcessingStep>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<ProcessingStep>) -> Self {
        Self { tx }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_step(&self, step: ProcessingStep) {
        if self.tx.send(step).is_err() {
            tracing::trace!("Progress receiver closed, dropping {}", step);
        }
    }
}

/// Create a [`ChannelObserver`] and the receiver it feeds.
pub fn progress_channel() -> (ChannelObserver, mpsc::UnboundedReceiver<ProcessingStep>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelObserver::new(tx), rx)
}
