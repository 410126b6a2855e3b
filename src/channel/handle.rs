//! # Shared, liveness-checkable reference to a context's mailbox.
//!
//! [`ThreadHandle`] wraps the sending half of a [`tokio::sync::mpsc`] unbounded channel.
//! The receiving half is owned by exactly one [`Context`](crate::Context) loop.
//!
//! ## Architecture
//! ```text
//! Publishers (any thread):                     Owner (one thread):
//!   ParentLink ──┐
//!   Session    ──┼──► Arc<ThreadHandle> ──► [unbounded queue] ──► Context::apply()
//!   post_task  ──┘       (cloneable)
//! ```
//!
//! ## Rules
//! - **Non-blocking post**: `post()` never blocks and never fails loudly.
//! - **Per-sender FIFO**: requests from one thread are applied in post order.
//! - **Silent drop**: posts to a closed mailbox are discarded.
//! - **Expiry**: once the owning loop closes or drops its mailbox, [`ThreadHandle::is_expired`]
//!   reports `true` forever.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use super::request::Request;
use crate::core::Context;
use crate::session::{Session, SessionDelegate, SessionId};

/// Sending endpoint of one context's mailbox.
///
/// Always shared as `Arc<ThreadHandle>`; it is `Send + Sync` and outlives
/// the loop it points to without dangling.
#[derive(Debug)]
pub struct ThreadHandle {
    tx: mpsc::UnboundedSender<Request>,
    next_session_id: AtomicU64,
}

impl ThreadHandle {
    /// Creates a handle together with the mailbox it feeds.
    pub(crate) fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Arc::new(Self {
            tx,
            next_session_id: AtomicU64::new(0),
        });
        (handle, rx)
    }

    /// Returns `true` once the target loop has shut down or been dropped.
    ///
    /// Non-blocking. A `false` answer is only a snapshot: the target may
    /// expire right after the call.
    pub fn is_expired(&self) -> bool {
        self.tx.is_closed()
    }

    /// Completes once the target loop has shut down or been dropped.
    pub async fn expired(&self) {
        self.tx.closed().await
    }

    /// Posts a request to the target loop.
    ///
    /// Returns whether the mailbox accepted it; a rejected request is dropped.
    pub(crate) fn post(&self, request: Request) -> bool {
        match self.tx.send(request) {
            Ok(()) => true,
            Err(mpsc::error::SendError(request)) => {
                trace!(request = request.as_label(), "mailbox closed; request dropped");
                false
            }
        }
    }

    /// Runs `task` on the loop that owns this handle.
    ///
    /// This is the only way for another thread to reach the
    /// [`WorkerRegistry`](crate::WorkerRegistry) of that loop.
    /// Returns `false` if the target has already shut down.
    pub fn post_task<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut Context) + Send + 'static,
    {
        self.post(Request::Task(Box::new(task)))
    }

    /// Opens an inspection session against the target loop.
    ///
    /// `prevent_shutdown` lets the open session keep the target loop serving
    /// after its shutdown was requested (bounded by [`Config::grace`](crate::Config::grace)).
    /// Connecting to an expired target yields an inert session.
    pub fn connect(
        self: &Arc<Self>,
        delegate: Box<dyn SessionDelegate>,
        prevent_shutdown: bool,
    ) -> Session {
        let id: SessionId = self.next_session_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.post(Request::Connect {
            id,
            delegate,
            prevent_shutdown,
        });
        Session::new(id, Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_when_mailbox_dropped() {
        let (handle, rx) = ThreadHandle::channel();
        assert!(!handle.is_expired());
        drop(rx);
        assert!(handle.is_expired());
        assert!(!handle.post(Request::WorkerFinished { id: 1 }));
    }

    #[test]
    fn expires_when_mailbox_closed() {
        let (handle, mut rx) = ThreadHandle::channel();
        rx.close();
        assert!(handle.is_expired());
        assert!(!handle.post_task(|_| {}));
    }

    #[test]
    fn posts_are_fifo_per_sender() {
        let (handle, mut rx) = ThreadHandle::channel();
        for id in 1..=3 {
            assert!(handle.post(Request::WorkerFinished { id }));
        }
        let mut seen = Vec::new();
        while let Ok(Request::WorkerFinished { id }) = rx.try_recv() {
            seen.push(id);
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn session_ids_are_unique_per_target() {
        struct Sink;
        impl SessionDelegate for Sink {
            fn send_message_to_frontend(&self, _message: &str) {}
        }

        let (handle, _rx) = ThreadHandle::channel();
        let a = handle.connect(Box::new(Sink), false);
        let b = handle.connect(Box::new(Sink), false);
        assert_ne!(a.id(), b.id());
    }
}
