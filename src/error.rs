//! Error types used by the workervisor runtime.
//!
//! Registry operations are total and never fail; lifecycle notifications are advisory.
//! [`RuntimeError`] covers the surrounding runtime only: running a [`Context`](crate::Context)
//! loop and spawning worker threads.
//!
//! The type provides helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::session::SessionId;

/// # Errors produced by the workervisor runtime.
///
/// These represent failures of the loop and thread plumbing around the registry,
/// never of the registry itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded while sessions still kept the context alive.
    #[error("shutdown grace {grace:?} exceeded; sessions still open: {sessions:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Sessions that were still preventing shutdown.
        sessions: Vec<SessionId>,
    },

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker's event loop runtime could not be built.
    #[error("failed to build worker runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use workervisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), sessions: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Spawn(_) => "runtime_spawn_failed",
            RuntimeError::Runtime(_) => "runtime_build_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, sessions } => {
                format!("grace exceeded after {grace:?}; open sessions={sessions:?}")
            }
            RuntimeError::Spawn(e) => format!("spawn: {e}"),
            RuntimeError::Runtime(e) => format!("runtime: {e}"),
        }
    }
}
