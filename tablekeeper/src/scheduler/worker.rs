//! Serial worker lifecycle.
//!
//! Every mutation in the scheduler flows through exactly one consumer task;
//! this module owns that task's lifecycle: intake, bounded-wait drain on
//! shutdown, and forced teardown when the drain expires. Submission is
//! fire-and-forget and never blocks the caller.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Outcome of a shutdown drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStatus {
    /// All queued work finished before the deadline.
    Completed,
    /// The deadline expired with work still queued; teardown was forced.
    TimedOut,
    /// The worker ended abnormally (panic or external abort) during the wait.
    Interrupted,
}

impl DrainStatus {
    /// Whether every queued request was processed.
    pub fn is_complete(self) -> bool {
        matches!(self, DrainStatus::Completed)
    }
}

/// Error returned when submitting to a worker that stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerClosed;

impl fmt::Display for WorkerClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker is no longer accepting requests")
    }
}

impl std::error::Error for WorkerClosed {}

/// Handle to a single strictly-serial consumer task.
///
/// The channel is unbounded so `submit` never blocks; closing the channel
/// is the intake gate. Once `shutdown` has been called the queue keeps
/// draining until the deadline, then the worker is cancelled and aborted.
pub struct SerialWorker<M> {
    tx: Option<mpsc::UnboundedSender<M>>,
    handle: Option<JoinHandle<()>>,
    token: CancellationToken,
}

impl<M: Send + 'static> SerialWorker<M> {
    /// Spawn the consumer task.
    ///
    /// `run` receives the request stream and a cancellation token it must
    /// honor between requests; the task finishes when the stream closes or
    /// the token fires.
    pub fn spawn<F, Fut>(run: F) -> Self
    where
        F: FnOnce(mpsc::UnboundedReceiver<M>, CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(rx, token.child_token()));

        Self {
            tx: Some(tx),
            handle: Some(handle),
            token,
        }
    }

    /// Enqueue a request. Never blocks.
    ///
    /// Fails once shutdown has begun or the worker has stopped.
    pub fn submit(&self, msg: M) -> Result<(), WorkerClosed> {
        match &self.tx {
            Some(tx) => tx.send(msg).map_err(|_| WorkerClosed),
            None => Err(WorkerClosed),
        }
    }

    /// Whether the worker still accepts submissions.
    pub fn is_open(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Stop intake, drain queued work up to `timeout`, then tear down.
    ///
    /// Queued requests keep processing until the deadline. On expiry the
    /// worker is cancelled and aborted; a slow drain is reported, not
    /// fatal; resources are released either way.
    pub async fn shutdown(&mut self, timeout: Duration) -> DrainStatus {
        self.tx = None;

        let Some(mut handle) = self.handle.take() else {
            return DrainStatus::Completed;
        };

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => {
                debug!("Worker drained and stopped");
                DrainStatus::Completed
            }
            Ok(Err(join_error)) => {
                error!("Worker ended abnormally during drain: {}", join_error);
                DrainStatus::Interrupted
            }
            Err(_) => {
                warn!(
                    "Waited {:?} for worker to drain, still not drained; forcing teardown",
                    timeout
                );
                self.token.cancel();
                handle.abort();
                DrainStatus::TimedOut
            }
        }
    }
}

impl<M> Drop for SerialWorker<M> {
    fn drop(&mut self) {
        // The task must not outlive a worker dropped without shutdown().
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
