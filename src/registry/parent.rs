//! # ParentLink: a worker's tie to its supervising loop.
//!
//! Created on the supervising loop by
//! [`WorkerRegistry::new_parent_handle`](crate::WorkerRegistry::new_parent_handle), then moved
//! into the worker's thread and owned there exclusively.
//!
//! ## Lifecycle
//! ```text
//! supervising loop                         worker thread
//! new_parent_handle(id, url) ──► link ──►  announce(own_handle, waiting) ─► WorkerStarted
//!                                          ...
//!                                          drop(link)                     ─► WorkerFinished
//! ```
//!
//! ## Rules
//! - `WorkerFinished` is posted from `Drop`, so it happens on clean exit, early return and
//!   panic unwinding alike; at most once per link.
//! - The wait decision is frozen at creation; `announce` still takes an explicit flag.

use std::sync::Arc;

use super::{WorkerId, WorkerInfo};
use crate::channel::{Request, ThreadHandle};
use crate::session::{Session, SessionDelegate};

/// Worker-side handle to the supervising loop.
#[derive(Debug)]
pub struct ParentLink {
    id: WorkerId,
    url: String,
    parent: Arc<ThreadHandle>,
    wait: bool,
}

impl ParentLink {
    pub(crate) fn new(id: WorkerId, url: String, parent: Arc<ThreadHandle>, wait: bool) -> Self {
        Self {
            id,
            url,
            parent,
            wait,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Handle to the supervising loop.
    pub fn parent(&self) -> &Arc<ThreadHandle> {
        &self.parent
    }

    /// Whether any delegate asked for pause-on-start when this link was created.
    pub fn wait_for_connect(&self) -> bool {
        self.wait
    }

    /// Tells the supervising loop that this worker is up.
    ///
    /// `waiting` is reported to delegates as-is; it need not equal
    /// [`wait_for_connect`](Self::wait_for_connect).
    pub fn announce(&self, worker_thread: Arc<ThreadHandle>, waiting: bool) {
        self.parent.post(Request::WorkerStarted {
            id: self.id,
            info: WorkerInfo::new(self.id, self.url.clone(), worker_thread),
            waiting,
        });
    }

    /// Opens a session against the supervising loop.
    pub fn connect(&self, delegate: Box<dyn SessionDelegate>, prevent_shutdown: bool) -> Session {
        self.parent.connect(delegate, prevent_shutdown)
    }
}

impl Drop for ParentLink {
    fn drop(&mut self) {
        self.parent.post(Request::WorkerFinished { id: self.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Request>) -> Vec<Request> {
        let mut out = Vec::new();
        while let Ok(req) = rx.try_recv() {
            out.push(req);
        }
        out
    }

    #[test]
    fn announce_then_drop_posts_started_then_finished() {
        let (parent, mut rx) = ThreadHandle::channel();
        let (worker, _worker_rx) = ThreadHandle::channel();

        let link = ParentLink::new(3, "u3".into(), parent, false);
        link.announce(worker, true);
        drop(link);

        let reqs = drain(&mut rx);
        assert_eq!(reqs.len(), 2);
        match &reqs[0] {
            Request::WorkerStarted { id, info, waiting } => {
                assert_eq!(*id, 3);
                assert_eq!(info.title(), "Worker 3");
                assert_eq!(info.url(), "u3");
                assert!(*waiting);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(reqs[1], Request::WorkerFinished { id: 3 }));
    }

    #[test]
    fn drop_without_announce_still_finishes() {
        let (parent, mut rx) = ThreadHandle::channel();
        drop(ParentLink::new(7, "u7".into(), parent, false));

        let reqs = drain(&mut rx);
        assert_eq!(reqs.len(), 1);
        assert!(matches!(reqs[0], Request::WorkerFinished { id: 7 }));
    }

    #[test]
    fn drop_during_unwind_finishes() {
        let (parent, mut rx) = ThreadHandle::channel();
        let link = ParentLink::new(9, "u9".into(), parent, false);

        let res = std::thread::spawn(move || {
            let _link = link;
            panic!("worker crashed");
        })
        .join();
        assert!(res.is_err());

        let reqs = drain(&mut rx);
        assert!(matches!(reqs.as_slice(), [Request::WorkerFinished { id: 9 }]));
    }

    #[test]
    fn drop_after_parent_gone_is_silent() {
        let (parent, rx) = ThreadHandle::channel();
        let link = ParentLink::new(1, "u1".into(), parent, true);
        drop(rx);
        assert!(link.wait_for_connect());
        drop(link);
    }
}
