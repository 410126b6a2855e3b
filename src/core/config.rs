//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for a [`Context`](crate::Context) loop and the
//! worker threads it spawns. Spawned workers inherit their parent's config.
//!
//! ## Sentinel values
//! - `grace = 0s` → no limit (serve shutdown-preventing sessions until they close)
//! - `stack_size = 0` → platform default stack for worker threads

use std::time::Duration;

use crate::registry::WorkerId;

/// Configuration for a context loop and its workers.
///
/// ## Field semantics
/// - `grace`: How long `run` keeps serving after shutdown while sessions prevent it (`0s` = unbounded)
/// - `thread_name_prefix`: Worker thread names are `"{prefix}-{id}"`
/// - `stack_size`: Worker thread stack size in bytes (`0` = platform default)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to keep serving shutdown-preventing sessions after shutdown.
    ///
    /// When shutdown is requested:
    /// - The loop stops at once if no open session prevents shutdown
    /// - Otherwise it keeps serving until those sessions close
    /// - If `grace` elapses first, `run` returns `RuntimeError::GraceExceeded`
    pub grace: Duration,

    /// Prefix of worker thread names.
    pub thread_name_prefix: String,

    /// Worker thread stack size in bytes.
    ///
    /// - `0` = platform default
    /// - `n > 0` = passed to `std::thread::Builder::stack_size`
    pub stack_size: usize,
}

impl Config {
    /// Returns the shutdown grace as an `Option`.
    ///
    /// - `None` → no limit
    /// - `Some(d)` → give up after `d`
    #[inline]
    pub fn grace_limit(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns the worker stack size as an `Option`.
    #[inline]
    pub fn stack_size_opt(&self) -> Option<usize> {
        if self.stack_size == 0 {
            None
        } else {
            Some(self.stack_size)
        }
    }

    /// Returns the thread name for worker `id`.
    pub fn thread_name(&self, id: WorkerId) -> String {
        format!("{}-{id}", self.thread_name_prefix)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `thread_name_prefix = "worker"`
    /// - `stack_size = 0` (platform default)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            thread_name_prefix: "worker".to_string(),
            stack_size: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_to_none() {
        let cfg = Config {
            grace: Duration::ZERO,
            stack_size: 0,
            ..Config::default()
        };
        assert_eq!(cfg.grace_limit(), None);
        assert_eq!(cfg.stack_size_opt(), None);
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.grace_limit(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.thread_name(3), "worker-3");
    }
}
