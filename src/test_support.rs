//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::sync::Arc;

use crate::channel::ThreadHandle;
use crate::delegates::WorkerDelegate;
use crate::session::SessionDelegate;

/// `(title, url, waiting)` as reported to a delegate.
pub(crate) type Created = (String, String, bool);

pub(crate) fn created(title: &str, url: &str, waiting: bool) -> Created {
    (title.to_string(), url.to_string(), waiting)
}

/// Delegate that records every report and keeps the reported handles.
#[derive(Default)]
pub(crate) struct Recorder {
    seen: RefCell<Vec<Created>>,
    threads: RefCell<Vec<Arc<ThreadHandle>>>,
}

impl Recorder {
    pub(crate) fn seen(&self) -> Vec<Created> {
        self.seen.borrow().clone()
    }

    pub(crate) fn threads(&self) -> Vec<Arc<ThreadHandle>> {
        self.threads.borrow().clone()
    }
}

impl WorkerDelegate for Recorder {
    fn worker_created(&self, title: &str, url: &str, waiting: bool, thread: Arc<ThreadHandle>) {
        self.seen.borrow_mut().push(created(title, url, waiting));
        self.threads.borrow_mut().push(thread);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// Session delegate that drops every message.
pub(crate) struct Sink;

impl SessionDelegate for Sink {
    fn send_message_to_frontend(&self, _message: &str) {}
}
