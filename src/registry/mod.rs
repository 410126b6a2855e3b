//! Worker lifecycle bookkeeping on the supervising loop.
//!
//! - [`WorkerRegistry`]: live workers, delegates, pause-on-start requests;
//! - [`ParentLink`]: worker-side handle; announces start, guarantees finish on drop;
//! - [`SubscriptionHandle`]: delegate-side RAII token; drop unsubscribes;
//! - [`WorkerInfo`]: what delegates learn about a worker.

mod info;
mod parent;
#[allow(clippy::module_inception)]
mod registry;
mod subscription;

pub use info::{WorkerId, WorkerInfo};
pub use parent::ParentLink;
pub use registry::{DelegateId, WorkerRegistry};
pub use subscription::SubscriptionHandle;
