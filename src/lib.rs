//! # workervisor
//!
//! **Workervisor** tracks the lifecycle of worker threads on behalf of a supervising loop.
//!
//! Every worker runs its own thread and its own serial loop. Workers announce themselves to
//! their supervising loop by message, never by shared memory. The supervising loop reports
//! workers to subscribed delegates, and it can ask new workers to pause until a session
//! attaches.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker 1   │   │   Worker 2   │   │   Worker 3   │
//!     │ (own thread, │   │ (own thread, │   │ (own thread, │
//!     │  own Context)│   │  own Context)│   │  own Context)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ ParentLink       │ ParentLink       │ ParentLink
//!            │ announce / drop  │                  │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │          Arc<ThreadHandle> of the supervising loop                │
//! │          (unbounded mpsc, FIFO per sender, silent drop)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Context (supervising loop, single writer)                        │
//! │  - WorkerRegistry: live workers, delegates, pause-on-start set    │
//! │  - sessions + SessionHost (protocol engine, external)             │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   delegate 1         delegate 2         delegate N
//!   worker_created()   worker_created()   worker_created()
//!        │
//!        └─► ThreadHandle::connect(worker) ─► Session (releases a paused worker)
//! ```
//!
//! ### Lifecycle
//! ```text
//! supervising loop: link = registry.new_parent_handle(id, url)   (pause decision frozen)
//! worker thread:    link.announce(own_handle, waiting) ─► WorkerStarted
//!                      └─ expired by the time it is applied? dropped silently
//!                   ... worker runs ...
//!                   drop(link)                         ─► WorkerFinished (also on panic)
//! late delegate:    registry.set_auto_attach(d)        ─► replay of live workers (waiting = false)
//!                   drop(subscription)                 ─► unsubscribed, pause request cleared
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types                                     |
//! |-----------------|--------------------------------------------------------------|-----------------------------------------------|
//! | **Registry**    | Live workers, delegate fan-out, pause-on-start policy.       | [`WorkerRegistry`], [`WorkerInfo`]            |
//! | **RAII links**  | Start/finish and subscribe/unsubscribe pairing by drop.      | [`ParentLink`], [`SubscriptionHandle`]        |
//! | **Delegates**   | Observe workers as they start.                               | [`WorkerDelegate`]                            |
//! | **Loops**       | Serial per-thread mailbox, shutdown with grace, workers.     | [`Context`], [`ThreadHandle`], [`WorkerScope`]|
//! | **Sessions**    | Inspection sessions multiplexed on a loop.                   | [`Session`], [`SessionHost`]                  |
//! | **Errors**      | Typed errors for the runtime plumbing.                       | [`RuntimeError`]                              |
//! | **Configuration** | Grace, worker thread naming and stack size.                | [`Config`]                                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogDelegate`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use workervisor::{Config, Context, ThreadHandle, WorkerDelegate};
//!
//! struct Printer;
//!
//! impl WorkerDelegate for Printer {
//!     fn worker_created(&self, title: &str, url: &str, waiting: bool, _thread: Arc<ThreadHandle>) {
//!         println!("{title} at {url} (waiting={waiting})");
//!     }
//! }
//!
//! fn main() -> Result<(), workervisor::RuntimeError> {
//!     let mut ctx = Context::new(Config::default());
//!     let _sub = ctx.registry().set_auto_attach(Rc::new(Printer));
//!
//!     let worker = ctx.spawn_worker(1, "file:///job.js", |scope| async move {
//!         println!("hello from {}", scope.url);
//!     })?;
//!     let _ = worker.join();
//!
//!     // Apply the queued started/finished notifications.
//!     ctx.drain();
//!     assert!(ctx.registry().live_workers().is_empty());
//!     Ok(())
//! }
//! ```
mod channel;
mod core;
mod delegates;
mod error;
mod registry;
mod session;

#[cfg(test)]
mod test_support;

// ---- Public re-exports ----

pub use channel::ThreadHandle;
pub use crate::core::{Config, Context, WorkerScope};
pub use delegates::WorkerDelegate;
pub use error::RuntimeError;
pub use registry::{
    DelegateId, ParentLink, SubscriptionHandle, WorkerId, WorkerInfo, WorkerRegistry,
};
pub use session::{HostFactory, NullHost, Session, SessionDelegate, SessionHost, SessionId};

// Optional: expose a simple built-in logging delegate (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use delegates::LogDelegate;
