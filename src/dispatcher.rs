//! Marshaling work onto the UI thread.
//!
//! Native notifications arrive on threads owned by the audio subsystem.
//! Anything observers see is handed to a [`Dispatcher`], which runs it on the
//! thread that owns the matching [`DispatchQueue`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use tracing::trace;

/// A unit of work queued for the owning thread.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Single-threaded cooperative task queue.
///
/// `invoke` must never fail toward the caller: work submitted after the
/// owning context is gone is silently discarded.
pub trait Dispatcher: Send + Sync {
    fn invoke(&self, work: Work);
}

/// Creates a dispatcher and the queue that drains it.
pub fn channel() -> (ChannelDispatcher, DispatchQueue) {
    let (sender, receiver) = mpsc::channel();
    (ChannelDispatcher { sender }, DispatchQueue { receiver })
}

/// Sending half; cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct ChannelDispatcher {
    sender: Sender<Work>,
}

impl Dispatcher for ChannelDispatcher {
    fn invoke(&self, work: Work) {
        if self.sender.send(work).is_err() {
            trace!("Dispatch queue is gone; discarding work item");
        }
    }
}

/// Receiving half, owned by the UI thread.
pub struct DispatchQueue {
    receiver: Receiver<Work>,
}

impl DispatchQueue {
    /// Run everything queued so far. Returns the number of items run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(work) = self.receiver.try_recv() {
            work();
            ran += 1;
        }
        ran
    }

    /// Run work as it arrives until `timeout` elapses.
    pub fn run_for(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut ran = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(work) => {
                    work();
                    ran += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        ran
    }
}
