//! Shared types for settle: the host capability traits the poller and the
//! test helpers are written against, the waiter registry, configuration and
//! the error type every crate in the workspace returns.

pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod waiter;

pub use app::{ElementInfo, Rect, TestApp};
pub use config::PollConfig;
pub use error::{ErrorCategory, SettleError};
pub use event::{DomEvent, EventKind, EventOptions};
pub use host::{FlushTask, SettleHost};
pub use waiter::{Bound, Fallible, Waiter, WaiterRegistry};
