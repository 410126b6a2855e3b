//! Runtime core: loops, workers and configuration.
//!
//! The public API from this module is [`Context`] (one serial loop per thread),
//! [`WorkerScope`] (what a spawned worker body receives) and [`Config`].
//!
//! Internal modules:
//! - [`context`]: mailbox draining, session bookkeeping, shutdown with grace;
//! - [`worker`]: worker threads tied to their supervising loop by a parent link;
//! - [`config`]: runtime settings inherited by spawned workers.

mod config;
mod context;
mod worker;

pub use config::Config;
pub use context::Context;
pub use worker::WorkerScope;
