//! Cross-thread message channel: handles and requests.
//!
//! This module groups the **endpoint** other threads hold ([`ThreadHandle`]) and the
//! **message model** a [`Context`](crate::Context) loop consumes (`Request`).
//!
//! ## Quick reference
//! - **Publishers**: `ParentLink` (started/finished), `Session` (connect/dispatch/disconnect),
//!   `ThreadHandle::post_task` (closures).
//! - **Consumer**: exactly one `Context` per mailbox.

mod handle;
mod request;

pub use handle::ThreadHandle;
pub(crate) use request::Request;
