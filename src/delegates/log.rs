//! # LogDelegate: worker lifecycle printer
//!
//! A minimal delegate that logs every reported worker through `tracing`.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! INFO workervisor::delegates::log: [worker-created] title="Worker 1" url="file:///a.js" waiting=false
//! INFO workervisor::delegates::log: [worker-created] title="Worker 2" url="file:///b.js" waiting=true
//! ```

use std::sync::Arc;

use tracing::info;

use crate::channel::ThreadHandle;
use crate::delegates::WorkerDelegate;

/// Worker lifecycle logger.
#[derive(Default)]
pub struct LogDelegate;

impl LogDelegate {
    /// Construct a new [`LogDelegate`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WorkerDelegate for LogDelegate {
    fn worker_created(&self, title: &str, url: &str, waiting: bool, thread: Arc<ThreadHandle>) {
        info!(
            title,
            url,
            waiting,
            expired = thread.is_expired(),
            "[worker-created]"
        );
    }

    fn name(&self) -> &'static str {
        "LogDelegate"
    }
}
