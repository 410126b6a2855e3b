//! # Protocol engine seam.
//!
//! [`SessionHost`] is implemented by whatever speaks the debug/inspection protocol on a
//! loop. The runtime calls it from the owning loop only, after its own session
//! bookkeeping is done:
//!
//! ```text
//! Request::Connect    ─► sessions.insert(id) ─► host.on_connect(id, delegate)
//! Request::Dispatch   ─► (open?)             ─► host.on_message(id, msg, registry)
//! Request::Disconnect ─► sessions.remove(id) ─► host.on_disconnect(id)
//! ```

use std::rc::Rc;
use std::sync::Arc;

use super::{SessionDelegate, SessionId};
use crate::registry::WorkerRegistry;

/// Protocol engine attached to one loop.
pub trait SessionHost: 'static {
    /// A session was opened; `delegate` carries replies to its frontend.
    fn on_connect(&mut self, id: SessionId, delegate: Box<dyn SessionDelegate>);

    /// A protocol message arrived for an open session.
    ///
    /// `registry` is the loop's worker registry, so protocol commands can
    /// subscribe to worker lifecycle (auto-attach).
    fn on_message(&mut self, id: SessionId, message: String, registry: &Rc<WorkerRegistry>);

    /// The session was closed by its frontend.
    fn on_disconnect(&mut self, id: SessionId);
}

/// Builds hosts for the loops of spawned workers.
pub type HostFactory = Arc<dyn Fn() -> Box<dyn SessionHost> + Send + Sync>;

/// Host that discards everything.
#[derive(Debug, Default)]
pub struct NullHost;

impl SessionHost for NullHost {
    fn on_connect(&mut self, _id: SessionId, _delegate: Box<dyn SessionDelegate>) {}

    fn on_message(&mut self, _id: SessionId, _message: String, _registry: &Rc<WorkerRegistry>) {}

    fn on_disconnect(&mut self, _id: SessionId) {}
}
