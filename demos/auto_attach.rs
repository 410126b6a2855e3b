//! # Auto-attach Example
//!
//! Shows a supervising loop that:
//! - logs every worker through the built-in `LogDelegate`;
//! - asks new workers to pause on start;
//! - releases each paused worker by connecting a session to it.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example auto_attach --features logging
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use workervisor::{
    Config, Context, LogDelegate, Session, SessionDelegate, ThreadHandle, WorkerDelegate,
};

struct Frontend {
    worker: String,
}

impl SessionDelegate for Frontend {
    fn send_message_to_frontend(&self, message: &str) {
        println!("[{}] <- {message}", self.worker);
    }
}

/// Connects to every worker that is waiting for a debugger.
#[derive(Default)]
struct Attacher {
    sessions: RefCell<Vec<Session>>,
}

impl WorkerDelegate for Attacher {
    fn worker_created(&self, title: &str, _url: &str, waiting: bool, thread: Arc<ThreadHandle>) {
        if !waiting {
            return;
        }
        let frontend = Box::new(Frontend {
            worker: title.to_string(),
        });
        self.sessions.borrow_mut().push(thread.connect(frontend, false));
    }

    fn name(&self) -> &'static str {
        "attacher"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut ctx = Context::new(Config::default());
    let _log = ctx.registry().set_auto_attach(Rc::new(LogDelegate::new()));
    let attacher = Rc::new(Attacher::default());
    let auto = ctx.registry().set_auto_attach(attacher.clone());
    auto.set_wait_on_start(true);

    let mut workers = Vec::new();
    for (id, url) in [(1, "file:///fetch.js"), (2, "file:///resize.js")] {
        workers.push(ctx.spawn_worker(id, url, |scope| async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            println!("{} done", scope.url);
        })?);
    }

    let shutdown = CancellationToken::new();
    let stop = shutdown.clone();
    let waiter = async move {
        let _ = tokio::task::spawn_blocking(move || {
            for w in workers {
                let _ = w.join();
            }
        })
        .await;
        stop.cancel();
    };

    let (res, ()) = tokio::join!(ctx.run(shutdown), waiter);
    res?;

    println!(
        "attached sessions: {}, live workers: {:?}",
        attacher.sessions.borrow().len(),
        ctx.registry().live_workers()
    );
    Ok(())
}

