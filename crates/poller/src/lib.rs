//! Quiescence detection by polling.
//!
//! A [`Poller`] samples a host's busy probes (route transition, pending
//! requests, scheduled work, then registered waiters) on a fixed interval
//! and resolves the first tick on which all of them are idle.

mod cycle;
mod poller;
mod settled;

pub use cycle::{Busy, Tick, sample};
pub use poller::Poller;
pub use settled::Settled;

pub use settle_core::{PollConfig, SettleError, SettleHost, Waiter, WaiterRegistry};
