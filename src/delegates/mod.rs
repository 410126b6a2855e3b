//! # Worker lifecycle delegates.
//!
//! This module provides the [`WorkerDelegate`] trait and, behind the `logging` feature,
//! a built-in [`LogDelegate`].
//!
//! ## Delegate types
//! - **Passive delegates** - observe and react (logging, dashboards)
//! - **Attaching delegates** - connect a session to the reported worker handle,
//!   which also releases a worker paused on start

mod delegate;
#[cfg(feature = "logging")]
mod log;

pub use delegate::WorkerDelegate;
#[cfg(feature = "logging")]
pub use log::LogDelegate;
