//! # Inspection session handle.
//!
//! A [`Session`] is what a frontend holds after connecting to a loop via
//! [`ThreadHandle::connect`](crate::ThreadHandle::connect). The protocol spoken over it
//! belongs to the [`SessionHost`](crate::SessionHost) of the target loop; this type only
//! carries messages and guarantees the disconnect.

use std::sync::Arc;

use crate::channel::{Request, ThreadHandle};

/// Identifier of a session, unique per target loop.
pub type SessionId = u64;

/// Receives protocol messages addressed to the frontend.
///
/// Implementations are moved to the target loop, so they must be `Send`.
/// Called on the target loop; must not block.
pub trait SessionDelegate: Send + 'static {
    /// Delivers one protocol message to the frontend.
    fn send_message_to_frontend(&self, message: &str);
}

/// Open session against a target loop.
///
/// Dropping the session posts a disconnect to the target, whatever
/// the reason for the drop. Sessions against an expired target are inert.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    target: Arc<ThreadHandle>,
}

impl Session {
    pub(crate) fn new(id: SessionId, target: Arc<ThreadHandle>) -> Self {
        Self { id, target }
    }

    /// Returns the session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns `true` if the target loop is gone.
    pub fn is_expired(&self) -> bool {
        self.target.is_expired()
    }

    /// Posts a protocol message to the target loop.
    pub fn dispatch(&self, message: impl Into<String>) {
        self.target.post(Request::Dispatch {
            id: self.id,
            message: message.into(),
        });
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.target.post(Request::Disconnect { id: self.id });
    }
}
