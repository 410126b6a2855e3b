//! # Worker registry - single-writer lifecycle state of a supervising loop.
//!
//! The registry is fed by requests the owning [`Context`](crate::Context) drains from its
//! mailbox, and fans worker starts out to subscribed [`WorkerDelegate`]s:
//!
//! ## Architecture
//! ```text
//! mailbox → Context::apply()
//!             ├─► WorkerStarted(id, info, waiting) → worker_started() → delegates (in order)
//!             ├─► WorkerFinished(id)               → worker_finished()
//!             └─► Task(f)                          → f(ctx) → set_auto_attach() / new_parent_handle() / ...
//! ```
//!
//! ## Rules
//! - The registry is `!Send`: it lives and dies on its loop, and other threads reach it
//!   only through [`ThreadHandle::post_task`]. No locks are involved.
//! - Starts whose worker handle already expired are dropped silently.
//! - Finishing an unknown worker and removing an unknown delegate are no-ops.
//! - Removing a delegate also clears its pause-on-start request.
//! - Replays to a new delegate always report `waiting = false`.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{ParentLink, SubscriptionHandle, WorkerId, WorkerInfo};
use crate::channel::ThreadHandle;
use crate::delegates::WorkerDelegate;

/// Identifier of a subscribed delegate; never reused.
pub type DelegateId = u64;

/// Live workers and subscribed delegates of one supervising loop.
pub struct WorkerRegistry {
    /// Handle to the loop owning this registry; handed to parent links.
    thread: Arc<ThreadHandle>,
    children: RefCell<BTreeMap<WorkerId, WorkerInfo>>,
    /// Ordered by id, i.e. by registration order.
    delegates: RefCell<BTreeMap<DelegateId, Rc<dyn WorkerDelegate>>>,
    waiting_on_start: RefCell<HashSet<DelegateId>>,
    next_delegate_id: Cell<DelegateId>,
}

impl WorkerRegistry {
    /// Creates an empty registry for the loop behind `thread`.
    pub(crate) fn new(thread: Arc<ThreadHandle>) -> Rc<Self> {
        Rc::new(Self {
            thread,
            children: RefCell::new(BTreeMap::new()),
            delegates: RefCell::new(BTreeMap::new()),
            waiting_on_start: RefCell::new(HashSet::new()),
            next_delegate_id: Cell::new(0),
        })
    }

    /// Registers a started worker and reports it to every delegate.
    ///
    /// No-op if the worker's loop is already gone.
    pub fn worker_started(&self, id: WorkerId, info: WorkerInfo, waiting: bool) {
        if info.thread().is_expired() {
            debug!(worker_id = id, "worker gone before its start was applied; dropped");
            return;
        }
        self.children.borrow_mut().insert(id, info.clone());
        trace!(worker_id = id, waiting, "worker registered");

        let targets: Vec<(DelegateId, Rc<dyn WorkerDelegate>)> = self
            .delegates
            .borrow()
            .iter()
            .map(|(id, d)| (*id, Rc::clone(d)))
            .collect();

        for (delegate_id, delegate) in targets {
            // An earlier delegate may have unsubscribed this one.
            if !self.delegates.borrow().contains_key(&delegate_id) {
                continue;
            }
            report(delegate_id, delegate.as_ref(), &info, waiting);
        }
    }

    /// Forgets a worker. Unknown ids are ignored.
    pub fn worker_finished(&self, id: WorkerId) {
        if self.children.borrow_mut().remove(&id).is_some() {
            trace!(worker_id = id, "worker unregistered");
        }
    }

    /// Subscribes `delegate` and replays current workers to it.
    ///
    /// Replayed workers are reported with `waiting = false`: pause-on-start
    /// only concerns workers created after the request.
    pub fn set_auto_attach(self: &Rc<Self>, delegate: Rc<dyn WorkerDelegate>) -> SubscriptionHandle {
        let id = self.next_delegate_id.get() + 1;
        self.next_delegate_id.set(id);
        self.delegates.borrow_mut().insert(id, Rc::clone(&delegate));
        debug!(delegate_id = id, delegate = delegate.name(), "delegate subscribed");

        let live: Vec<WorkerInfo> = self.children.borrow().values().cloned().collect();
        for info in &live {
            // The delegate may unsubscribe itself while being replayed to.
            if !self.delegates.borrow().contains_key(&id) {
                break;
            }
            report(id, delegate.as_ref(), info, false);
        }
        SubscriptionHandle::new(Rc::clone(self), id)
    }

    /// Unsubscribes a delegate and clears its pause-on-start request. Idempotent.
    pub fn remove_attach_delegate(&self, id: DelegateId) {
        let removed = self.delegates.borrow_mut().remove(&id).is_some();
        self.waiting_on_start.borrow_mut().remove(&id);
        if removed {
            debug!(delegate_id = id, "delegate unsubscribed");
        }
    }

    /// Adds or removes a delegate's pause-on-start request.
    pub fn set_wait_on_start_for_delegate(&self, id: DelegateId, wait: bool) {
        let mut waiting = self.waiting_on_start.borrow_mut();
        if wait {
            waiting.insert(id);
        } else {
            waiting.remove(&id);
        }
    }

    /// Creates the parent link for a worker about to be spawned.
    ///
    /// The pause-on-start decision is taken now and frozen into the link.
    pub fn new_parent_handle(&self, worker_id: WorkerId, url: impl Into<String>) -> ParentLink {
        ParentLink::new(
            worker_id,
            url.into(),
            Arc::clone(&self.thread),
            self.waits_on_start(),
        )
    }

    /// Returns `true` if any delegate currently asks for pause-on-start.
    pub fn waits_on_start(&self) -> bool {
        !self.waiting_on_start.borrow().is_empty()
    }

    /// Returns `true` if worker `id` is registered.
    pub fn is_live(&self, id: WorkerId) -> bool {
        self.children.borrow().contains_key(&id)
    }

    /// Returns ids of registered workers, ascending.
    pub fn live_workers(&self) -> Vec<WorkerId> {
        self.children.borrow().keys().copied().collect()
    }

    /// Returns the number of subscribed delegates.
    pub fn delegate_count(&self) -> usize {
        self.delegates.borrow().len()
    }
}

/// Invokes one delegate, isolating panics.
fn report(delegate_id: DelegateId, delegate: &dyn WorkerDelegate, info: &WorkerInfo, waiting: bool) {
    let call = AssertUnwindSafe(|| {
        delegate.worker_created(info.title(), info.url(), waiting, Arc::clone(info.thread()))
    });
    if let Err(panic_err) = panic::catch_unwind(call) {
        warn!(
            delegate_id,
            delegate = delegate.name(),
            worker_id = info.id(),
            info = %panic_message(panic_err.as_ref()),
            "delegate panicked"
        );
    }
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
