//! # Requests delivered to a context's loop.
//!
//! Every cross-thread interaction with a [`Context`] is a [`Request`] posted through a
//! [`ThreadHandle`](crate::ThreadHandle). Requests are applied one at a time, in the order
//! a given sender posted them, by the loop that owns the mailbox.
//!
//! ## Kinds
//! ```text
//! WorkerStarted  ─► WorkerRegistry::worker_started(id, info, waiting)
//! WorkerFinished ─► WorkerRegistry::worker_finished(id)
//! Connect        ─► open session bookkeeping + SessionHost::on_connect
//! Dispatch       ─► SessionHost::on_message (open sessions only)
//! Disconnect     ─► close session bookkeeping + SessionHost::on_disconnect
//! Task           ─► arbitrary closure run with `&mut Context`
//! ```

use std::fmt;

use crate::core::Context;
use crate::registry::{WorkerId, WorkerInfo};
use crate::session::{SessionDelegate, SessionId};

/// Closure executed on the owning loop.
pub(crate) type LoopTask = Box<dyn FnOnce(&mut Context) + Send + 'static>;

/// Message posted to a context's mailbox.
pub(crate) enum Request {
    /// A worker finished startup and is ready to be observed.
    WorkerStarted {
        id: WorkerId,
        info: WorkerInfo,
        waiting: bool,
    },
    /// A worker's parent link was dropped.
    WorkerFinished { id: WorkerId },
    /// A frontend opened a session against this context.
    Connect {
        id: SessionId,
        delegate: Box<dyn SessionDelegate>,
        prevent_shutdown: bool,
    },
    /// A protocol message for an open session.
    Dispatch { id: SessionId, message: String },
    /// The session handle was dropped.
    Disconnect { id: SessionId },
    /// Closure to run on the loop.
    Task(LoopTask),
}

impl Request {
    /// Short label for traces.
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            Request::WorkerStarted { .. } => "worker_started",
            Request::WorkerFinished { .. } => "worker_finished",
            Request::Connect { .. } => "session_connect",
            Request::Dispatch { .. } => "session_dispatch",
            Request::Disconnect { .. } => "session_disconnect",
            Request::Task(_) => "task",
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::WorkerStarted { id, info, waiting } => f
                .debug_struct("WorkerStarted")
                .field("id", id)
                .field("url", &info.url())
                .field("waiting", waiting)
                .finish(),
            Request::WorkerFinished { id } => {
                f.debug_struct("WorkerFinished").field("id", id).finish()
            }
            Request::Connect {
                id,
                prevent_shutdown,
                ..
            } => f
                .debug_struct("Connect")
                .field("id", id)
                .field("prevent_shutdown", prevent_shutdown)
                .finish_non_exhaustive(),
            Request::Dispatch { id, message } => f
                .debug_struct("Dispatch")
                .field("id", id)
                .field("len", &message.len())
                .finish(),
            Request::Disconnect { id } => f.debug_struct("Disconnect").field("id", id).finish(),
            Request::Task(_) => f.write_str("Task(..)"),
        }
    }
}
