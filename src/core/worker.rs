//! # Worker threads supervised by a context.
//!
//! [`Context::spawn_worker`] starts a worker on its own OS thread with its own
//! current-thread runtime and its own [`Context`], tied back to the spawning loop by a
//! [`ParentLink`].
//!
//! ## Lifecycle
//! ```text
//! supervising loop                      worker thread
//! ────────────────                      ─────────────
//! new_parent_handle(id, url) ─► link ─► build runtime + child Context
//!                                       link.announce(child.handle(), link.wait_for_connect())
//!                                         └─► WorkerStarted ─► registry ─► delegates
//!                                       if waiting: serve child loop until a session connects
//!                                       join!(body(scope), child.run(shutdown))
//!                                         body done ─► shutdown.cancel()
//!                                       drop(child)  → worker handle expires
//!                                       drop(link)   → WorkerFinished
//! ```
//!
//! ## Rules
//! - The link is dropped last on every path, panics included, so a spawned worker always
//!   reports finished exactly once.
//! - A paused worker also resumes if the supervising loop goes away.

use std::future::Future;
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::Config;
use super::context::Context;
use crate::channel::ThreadHandle;
use crate::error::RuntimeError;
use crate::registry::{ParentLink, WorkerId};
use crate::session::HostFactory;

/// What a worker body gets to work with.
#[derive(Debug, Clone)]
pub struct WorkerScope {
    /// Worker id as registered with the supervising loop.
    pub id: WorkerId,
    /// Worker url as reported to delegates.
    pub url: String,
    /// Handle to the worker's own loop.
    pub thread: Arc<ThreadHandle>,
    /// Handle to the supervising loop.
    pub parent: Arc<ThreadHandle>,
    /// Cancelled once the body returns; the worker loop stops with it.
    pub shutdown: CancellationToken,
}

impl Context {
    /// Spawns a worker thread registered under `id`.
    ///
    /// `body` runs on the worker's own loop. If a delegate asked for pause-on-start when
    /// this call was made, `body` starts only after a session connects to the worker.
    ///
    /// # Errors
    /// [`RuntimeError::Spawn`] if the thread could not be created; the worker is then
    /// reported finished without ever starting.
    pub fn spawn_worker<F, Fut>(
        &self,
        id: WorkerId,
        url: impl Into<String>,
        body: F,
    ) -> Result<JoinHandle<Result<(), RuntimeError>>, RuntimeError>
    where
        F: FnOnce(WorkerScope) -> Fut + Send + 'static,
        Fut: Future<Output = ()>,
    {
        let link = self.registry().new_parent_handle(id, url);
        let cfg = self.cfg.clone();
        let factory = self.host_factory.clone();

        let mut builder = std::thread::Builder::new().name(cfg.thread_name(id));
        if let Some(size) = cfg.stack_size_opt() {
            builder = builder.stack_size(size);
        }
        info!(
            worker_id = id,
            url = link.url(),
            waiting = link.wait_for_connect(),
            "spawning worker"
        );
        builder
            .spawn(move || run_worker(link, cfg, factory, body))
            .map_err(RuntimeError::Spawn)
    }
}

fn run_worker<F, Fut>(
    link: ParentLink,
    cfg: Config,
    factory: Option<HostFactory>,
    body: F,
) -> Result<(), RuntimeError>
where
    F: FnOnce(WorkerScope) -> Fut,
    Fut: Future<Output = ()>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(RuntimeError::Runtime)?;

    let mut ctx = Context::for_worker(cfg, factory);
    let waiting = link.wait_for_connect();
    link.announce(Arc::clone(ctx.handle()), waiting);

    let shutdown = CancellationToken::new();
    let scope = WorkerScope {
        id: link.id(),
        url: link.url().to_string(),
        thread: Arc::clone(ctx.handle()),
        parent: Arc::clone(link.parent()),
        shutdown: shutdown.clone(),
    };
    let parent = Arc::clone(link.parent());

    let res = rt.block_on(async move {
        if waiting {
            tokio::select! {
                _ = ctx.wait_for_session(&shutdown) => {}
                _ = parent.expired() => {
                    warn!(worker_id = scope.id, "supervising loop gone while paused; resuming");
                }
            }
        }
        let done = shutdown.clone();
        let body = async move {
            body(scope).await;
            done.cancel();
        };
        let (_, res) = tokio::join!(body, ctx.run(shutdown));
        res
    });
    info!(worker_id = link.id(), ok = res.is_ok(), "worker exited");
    res
}
