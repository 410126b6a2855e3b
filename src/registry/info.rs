use std::sync::Arc;

use crate::channel::ThreadHandle;

/// Numeric worker identifier, chosen by whoever spawns the worker.
pub type WorkerId = u64;

/// Immutable description of a started worker.
#[derive(Debug, Clone)]
pub struct WorkerInfo {
    id: WorkerId,
    title: String,
    url: String,
    thread: Arc<ThreadHandle>,
}

impl WorkerInfo {
    /// Builds the info for worker `id`; the title is derived as `"Worker <id>"`.
    pub fn new(id: WorkerId, url: impl Into<String>, thread: Arc<ThreadHandle>) -> Self {
        Self {
            id,
            title: format!("Worker {id}"),
            url: url.into(),
            thread,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Handle to the worker's own loop.
    pub fn thread(&self) -> &Arc<ThreadHandle> {
        &self.thread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_derived_from_id() {
        let (thread, _rx) = ThreadHandle::channel();
        let info = WorkerInfo::new(42, "file:///w.js", thread);
        assert_eq!(info.title(), "Worker 42");
        assert_eq!(info.url(), "file:///w.js");
        assert_eq!(info.id(), 42);
    }
}
