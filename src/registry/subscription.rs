use std::rc::Rc;

use super::{DelegateId, WorkerRegistry};

/// RAII subscription returned by [`WorkerRegistry::set_auto_attach`].
///
/// Dropping the handle unsubscribes the delegate and clears its
/// pause-on-start request.
#[must_use = "dropping the handle unsubscribes the delegate"]
pub struct SubscriptionHandle {
    registry: Rc<WorkerRegistry>,
    id: DelegateId,
}

impl SubscriptionHandle {
    pub(crate) fn new(registry: Rc<WorkerRegistry>, id: DelegateId) -> Self {
        Self { registry, id }
    }

    pub fn id(&self) -> DelegateId {
        self.id
    }

    /// Asks that newly created workers pause until a session attaches.
    pub fn set_wait_on_start(&self, wait: bool) {
        self.registry.set_wait_on_start_for_delegate(self.id, wait);
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.registry.remove_attach_delegate(self.id);
    }
}
