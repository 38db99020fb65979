//! Run-wide cancel signal that every blocking queue operation races against.
//!
//! Cancelling drops the only sender of an internal channel, so its receiver becomes ready
//! for every `select!` waiting on it at once.

use crossbeam_channel::{Receiver, Sender, bounded, select};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Why a queue operation returned without moving an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueStop {
    /// The other side of the queue is gone (all senders or all receivers dropped).
    Closed,
    /// The run was cancelled.
    Cancelled,
}

struct Inner {
    flag: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

/// Cloneable handle; all clones observe the same cancellation.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded::<()>(0);
        Self {
            inner: Arc::new(Inner {
                flag: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Cancel the run. Idempotent; safe from a signal-handler thread.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Blocking send that gives up when the run is cancelled.
    pub fn send<T>(&self, tx: &Sender<T>, item: T) -> Result<(), QueueStop> {
        if self.is_cancelled() {
            return Err(QueueStop::Cancelled);
        }
        select! {
            send(tx, item) -> res => res.map_err(|_| QueueStop::Closed),
            recv(self.inner.signal) -> _ => Err(QueueStop::Cancelled),
        }
    }

    /// Blocking receive that gives up when the run is cancelled.
    /// Returns `Closed` only once the queue is both closed and drained.
    pub fn recv<T>(&self, rx: &Receiver<T>) -> Result<T, QueueStop> {
        if self.is_cancelled() {
            return Err(QueueStop::Cancelled);
        }
        select! {
            recv(rx) -> res => res.map_err(|_| QueueStop::Closed),
            recv(self.inner.signal) -> _ => Err(QueueStop::Cancelled),
        }
    }
}
