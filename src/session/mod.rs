//! Inspection sessions multiplexed on a loop.
//!
//! - [`Session`]: RAII handle held by a frontend; drop disconnects.
//! - [`SessionDelegate`]: frontend-side sink for protocol replies.
//! - [`SessionHost`]: the protocol engine on the target loop (external collaborator).

mod host;
#[allow(clippy::module_inception)]
mod session;

pub use host::{HostFactory, NullHost, SessionHost};
pub use session::{Session, SessionDelegate, SessionId};
