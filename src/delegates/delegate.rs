//! # Worker lifecycle delegate trait.
//!
//! Provides [`WorkerDelegate`], the extension point for observers that want to hear
//! about workers starting under a supervising loop.
//!
//! ## Architecture
//! ```text
//! WorkerRegistry::worker_started ──► for each delegate (registration order)
//!                                       └─► delegate.worker_created(title, url, waiting, handle)
//!                                             └─► panic caught → logged, next delegate runs
//! WorkerRegistry::set_auto_attach ──► replay of live workers (waiting = false)
//! ```
//!
//! ## Rules
//! - Called synchronously on the supervising loop; never block.
//! - `waiting = true` means the worker is paused until a session connects to `thread`.
//! - Re-entrant calls into the registry (subscribe, unsubscribe, toggle wait) are allowed.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use workervisor::{ThreadHandle, WorkerDelegate};
//!
//! struct Printer;
//!
//! impl WorkerDelegate for Printer {
//!     fn worker_created(&self, title: &str, url: &str, waiting: bool, _thread: Arc<ThreadHandle>) {
//!         println!("{title} at {url} (waiting={waiting})");
//!     }
//!
//!     fn name(&self) -> &'static str { "printer" }
//! }
//! ```

use std::sync::Arc;

use crate::channel::ThreadHandle;

/// Observer of workers started under a supervising loop.
pub trait WorkerDelegate: 'static {
    /// A worker became observable.
    ///
    /// `thread` is the worker's own loop; connect to it to inspect the worker.
    fn worker_created(&self, title: &str, url: &str, waiting: bool, thread: Arc<ThreadHandle>);

    /// Returns the delegate name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
