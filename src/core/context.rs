//! # Context: the serial loop of one thread.
//!
//! A [`Context`] owns the receiving end of a mailbox, the [`WorkerRegistry`] fed by it,
//! and the bookkeeping of inspection sessions opened against it. The supervising thread
//! runs one, and so does every worker thread.
//!
//! ## Architecture
//! ```text
//! other threads ── Arc<ThreadHandle>::post ──► [mailbox] ──► Context::apply()
//!                                                             ├─► WorkerRegistry
//!                                                             ├─► sessions + SessionHost
//!                                                             └─► Task(f) → f(&mut Context)
//!
//! Driving:
//!   drain()                   apply what is queued now, not what it posts (sync)
//!   run(shutdown).await       apply until shutdown; apply what is queued; serve
//!                             shutdown-preventing sessions for up to Config::grace;
//!                             then close the mailbox
//!   wait_for_session().await  apply until any session is open (pause-on-start)
//! ```
//!
//! ## Rules
//! - Requests are applied one at a time, FIFO per posting thread.
//! - `Context` is `!Send`; so is everything reachable from it that mutates registry state.
//! - After `run` returns, the mailbox is closed and [`ThreadHandle::is_expired`] is `true`.
//! - Dispatch/disconnect for sessions that are not open are ignored.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::config::Config;
use crate::channel::{Request, ThreadHandle};
use crate::error::RuntimeError;
use crate::registry::WorkerRegistry;
use crate::session::{HostFactory, NullHost, SessionHost, SessionId};

/// Serial processing loop of one thread.
pub struct Context {
    pub(super) cfg: Config,
    rx: mpsc::UnboundedReceiver<Request>,
    handle: Arc<ThreadHandle>,
    registry: Rc<WorkerRegistry>,
    host: Box<dyn SessionHost>,
    pub(super) host_factory: Option<HostFactory>,
    /// Open sessions → `prevent_shutdown`.
    sessions: BTreeMap<SessionId, bool>,
}

impl Context {
    /// Creates a context whose sessions are discarded by a [`NullHost`].
    pub fn new(cfg: Config) -> Self {
        Self::build(cfg, Box::new(NullHost), None)
    }

    /// Creates a context served by `host`. Spawned workers get a [`NullHost`].
    pub fn with_host(cfg: Config, host: Box<dyn SessionHost>) -> Self {
        Self::build(cfg, host, None)
    }

    /// Creates a context whose host, and the hosts of every worker it spawns,
    /// come from `factory`.
    pub fn with_host_factory(cfg: Config, factory: HostFactory) -> Self {
        let host = factory();
        Self::build(cfg, host, Some(factory))
    }

    pub(super) fn for_worker(cfg: Config, factory: Option<HostFactory>) -> Self {
        match factory {
            Some(factory) => Self::with_host_factory(cfg, factory),
            None => Self::new(cfg),
        }
    }

    fn build(cfg: Config, host: Box<dyn SessionHost>, host_factory: Option<HostFactory>) -> Self {
        let (handle, rx) = ThreadHandle::channel();
        let registry = WorkerRegistry::new(Arc::clone(&handle));
        Self {
            cfg,
            rx,
            handle,
            registry,
            host,
            host_factory,
            sessions: BTreeMap::new(),
        }
    }

    /// Handle other threads use to reach this loop.
    pub fn handle(&self) -> &Arc<ThreadHandle> {
        &self.handle
    }

    /// Worker registry of this loop.
    pub fn registry(&self) -> &Rc<WorkerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns ids of open sessions, ascending.
    pub fn open_sessions(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    /// Returns `true` if an open session keeps this loop alive past shutdown.
    pub fn prevents_shutdown(&self) -> bool {
        self.sessions.values().any(|prevent| *prevent)
    }

    fn blocking_sessions(&self) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|(_, prevent)| **prevent)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Applies every request queued right now; returns how many were applied.
    ///
    /// Requests posted while draining, including by the applied requests themselves,
    /// wait for the next call.
    pub fn drain(&mut self) -> usize {
        let queued = self.rx.len();
        let mut applied = 0;
        while applied < queued {
            let Ok(request) = self.rx.try_recv() else {
                break;
            };
            self.apply(request);
            applied += 1;
        }
        applied
    }

    /// Serves the mailbox until `shutdown` is cancelled.
    ///
    /// Shutdown is checked before every request, so a busy mailbox cannot hold the loop.
    /// Once it is observed:
    /// 1. requests queued at that moment are applied;
    /// 2. the loop keeps serving while a shutdown-preventing session is open, up to
    ///    [`Config::grace`];
    /// 3. the mailbox is closed and leftovers are applied. Requests posted after the
    ///    close are dropped.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] if preventing sessions outlived the grace period.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<(), RuntimeError> {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                request = self.rx.recv() => match request {
                    Some(request) => self.apply(request),
                    None => break,
                },
            }
        }
        let applied = self.drain();
        debug!(applied, sessions = self.sessions.len(), "context shutting down");

        let res = self.serve_preventing_sessions().await;
        self.rx.close();
        self.drain();
        res
    }

    /// Serves the mailbox until any session is open.
    ///
    /// Returns `false` if `shutdown` fired first.
    pub async fn wait_for_session(&mut self, shutdown: &CancellationToken) -> bool {
        loop {
            if !self.sessions.is_empty() {
                return true;
            }
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return false,
                request = self.rx.recv() => match request {
                    Some(request) => self.apply(request),
                    None => return false,
                },
            }
        }
    }

    async fn serve_preventing_sessions(&mut self) -> Result<(), RuntimeError> {
        if !self.prevents_shutdown() {
            return Ok(());
        }
        let grace = self.cfg.grace_limit();
        let serve = async {
            while self.prevents_shutdown() {
                match self.rx.recv().await {
                    Some(request) => self.apply(request),
                    None => break,
                }
            }
        };

        let Some(grace) = grace else {
            serve.await;
            return Ok(());
        };
        let outcome = tokio::time::timeout(grace, serve).await;
        match outcome {
            Ok(()) => Ok(()),
            Err(_) => Err(RuntimeError::GraceExceeded {
                grace,
                sessions: self.blocking_sessions(),
            }),
        }
    }

    fn apply(&mut self, request: Request) {
        trace!(request = request.as_label(), "applying request");
        match request {
            Request::WorkerStarted { id, info, waiting } => {
                self.registry.worker_started(id, info, waiting);
            }
            Request::WorkerFinished { id } => self.registry.worker_finished(id),
            Request::Connect {
                id,
                delegate,
                prevent_shutdown,
            } => {
                self.sessions.insert(id, prevent_shutdown);
                debug!(session_id = id, prevent_shutdown, "session connected");
                self.host.on_connect(id, delegate);
            }
            Request::Dispatch { id, message } => {
                if self.sessions.contains_key(&id) {
                    self.host.on_message(id, message, &self.registry);
                }
            }
            Request::Disconnect { id } => {
                if self.sessions.remove(&id).is_some() {
                    debug!(session_id = id, "session disconnected");
                    self.host.on_disconnect(id);
                }
            }
            Request::Task(task) => task(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::session::SessionDelegate;
    use crate::test_support::{created, Recorder, Sink};

    #[derive(Clone, Default)]
    struct HostLog(Rc<RefCell<Vec<String>>>);

    impl HostLog {
        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    impl SessionHost for HostLog {
        fn on_connect(&mut self, id: SessionId, _delegate: Box<dyn SessionDelegate>) {
            self.0.borrow_mut().push(format!("connect {id}"));
        }

        fn on_message(&mut self, id: SessionId, message: String, _registry: &Rc<WorkerRegistry>) {
            self.0.borrow_mut().push(format!("message {id} {message}"));
        }

        fn on_disconnect(&mut self, id: SessionId) {
            self.0.borrow_mut().push(format!("disconnect {id}"));
        }
    }

    #[test]
    fn end_to_end_lifecycle_with_late_delegates() {
        let mut ctx = Context::new(Config::default());
        let reg = Rc::clone(ctx.registry());

        let link = reg.new_parent_handle(1, "u1");
        assert!(!link.wait_for_connect());

        let d = Rc::new(Recorder::default());
        let _sd = reg.set_auto_attach(d.clone());
        assert!(d.seen().is_empty());

        let (worker, _worker_rx) = ThreadHandle::channel();
        link.announce(worker, false);
        assert_eq!(ctx.drain(), 1);
        assert_eq!(d.seen(), vec![created("Worker 1", "u1", false)]);

        drop(link);
        assert_eq!(ctx.drain(), 1);
        assert!(reg.live_workers().is_empty());

        let e = Rc::new(Recorder::default());
        let _se = reg.set_auto_attach(e.clone());
        assert!(e.seen().is_empty());
    }

    #[test]
    fn unannounced_link_finish_is_ignored() {
        let mut ctx = Context::new(Config::default());
        let (worker, _worker_rx) = ThreadHandle::channel();
        let other = ctx.registry().new_parent_handle(8, "u8");
        other.announce(worker, false);
        ctx.drain();

        drop(ctx.registry().new_parent_handle(7, "u7"));
        assert_eq!(ctx.drain(), 1);
        assert_eq!(ctx.registry().live_workers(), vec![8]);
    }

    #[test]
    fn sessions_route_to_host_while_open() {
        let log = HostLog::default();
        let mut ctx = Context::with_host(Config::default(), Box::new(log.clone()));

        let session = ctx.handle().connect(Box::new(Sink), false);
        session.dispatch("hello");
        ctx.drain();
        assert_eq!(ctx.open_sessions(), vec![session.id()]);

        let id = session.id();
        drop(session);
        ctx.handle().post(Request::Dispatch {
            id,
            message: "late".into(),
        });
        ctx.drain();

        assert!(ctx.open_sessions().is_empty());
        assert_eq!(
            log.entries(),
            vec![
                format!("connect {id}"),
                format!("message {id} hello"),
                format!("disconnect {id}"),
            ]
        );
    }

    #[test]
    fn parent_link_connects_to_supervising_loop() {
        let mut ctx = Context::new(Config::default());
        let link = ctx.registry().new_parent_handle(1, "u1");
        let session = link.connect(Box::new(Sink), true);
        ctx.drain();
        assert_eq!(ctx.open_sessions(), vec![session.id()]);
        assert!(ctx.prevents_shutdown());
    }

    #[test]
    fn post_task_runs_on_owning_loop() {
        let mut ctx = Context::new(Config::default());
        let _sub = ctx.registry().set_auto_attach(Rc::new(Recorder::default()));

        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handle = Arc::clone(ctx.handle());
        std::thread::spawn(move || {
            handle.post_task(move |ctx| {
                seen.store(ctx.registry().delegate_count(), Ordering::SeqCst);
            });
        })
        .join()
        .unwrap();

        assert_eq!(ctx.drain(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_returns_on_shutdown_and_expires_handle() {
        let mut ctx = Context::new(Config::default());
        let handle = Arc::clone(ctx.handle());
        let token = CancellationToken::new();
        token.cancel();

        ctx.run(token).await.unwrap();
        assert!(handle.is_expired());
    }

    #[tokio::test]
    async fn run_applies_queued_requests_before_shutdown() {
        let mut ctx = Context::new(Config::default());
        let (worker, _worker_rx) = ThreadHandle::channel();
        ctx.registry().new_parent_handle(1, "u1").announce(worker, false);
        let token = CancellationToken::new();
        token.cancel();

        ctx.run(token).await.unwrap();
        // The announcing link was dropped right after announcing.
        assert!(ctx.registry().live_workers().is_empty());
    }

    fn respin(ctx: &mut Context) {
        ctx.handle().post_task(respin);
    }

    #[test]
    fn drain_leaves_requests_posted_while_draining() {
        let mut ctx = Context::new(Config::default());
        ctx.handle().post_task(respin);
        assert_eq!(ctx.drain(), 1);
        assert_eq!(ctx.drain(), 1);
    }

    #[tokio::test]
    async fn run_stops_on_cancelled_token_despite_busy_mailbox() {
        let mut ctx = Context::new(Config::default());
        ctx.handle().post_task(respin);
        let token = CancellationToken::new();
        token.cancel();

        let res = tokio::time::timeout(Duration::from_millis(500), ctx.run(token)).await;
        assert!(matches!(res, Ok(Ok(()))));
        assert!(ctx.handle().is_expired());
    }

    #[tokio::test]
    async fn run_stops_when_cancelled_while_requests_keep_arriving() {
        let mut ctx = Context::new(Config::default());
        ctx.handle().post_task(respin);
        let token = CancellationToken::new();
        let stop = token.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            stop.cancel();
        });

        let res = tokio::time::timeout(Duration::from_secs(5), ctx.run(token)).await;
        canceller.join().unwrap();
        assert!(matches!(res, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn non_preventing_session_does_not_delay_shutdown() {
        let mut ctx = Context::new(Config::default());
        let _session = ctx.handle().connect(Box::new(Sink), false);
        let token = CancellationToken::new();
        token.cancel();

        ctx.run(token).await.unwrap();
    }

    #[tokio::test]
    async fn preventing_session_past_grace_is_reported() {
        let cfg = Config {
            grace: Duration::from_millis(20),
            ..Config::default()
        };
        let mut ctx = Context::new(cfg);
        let session = ctx.handle().connect(Box::new(Sink), true);
        let token = CancellationToken::new();
        token.cancel();

        match ctx.run(token).await {
            Err(RuntimeError::GraceExceeded { grace, sessions }) => {
                assert_eq!(grace, Duration::from_millis(20));
                assert_eq!(sessions, vec![session.id()]);
            }
            other => panic!("expected grace exceeded, got {other:?}"),
        }
        assert!(ctx.handle().is_expired());
    }

    #[tokio::test]
    async fn preventing_session_closed_within_grace() {
        let mut ctx = Context::new(Config::default());
        let session = ctx.handle().connect(Box::new(Sink), true);
        let token = CancellationToken::new();
        token.cancel();

        let closer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            drop(session);
        });
        ctx.run(token).await.unwrap();
        closer.join().unwrap();
        assert!(ctx.open_sessions().is_empty());
    }

    #[tokio::test]
    async fn wait_for_session_returns_on_connect() {
        let mut ctx = Context::new(Config::default());
        let handle = Arc::clone(ctx.handle());
        let connector = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            handle.connect(Box::new(Sink), false)
        });

        let token = CancellationToken::new();
        assert!(ctx.wait_for_session(&token).await);
        let session = connector.join().unwrap();
        assert_eq!(ctx.open_sessions(), vec![session.id()]);
    }

    #[tokio::test]
    async fn wait_for_session_gives_up_on_shutdown() {
        let mut ctx = Context::new(Config::default());
        let token = CancellationToken::new();
        token.cancel();
        assert!(!ctx.wait_for_session(&token).await);
    }
}
