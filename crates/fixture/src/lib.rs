//! An in-memory application for exercising settle without a browser.
//!
//! Markup is parsed with `scraper`; routing, requests, timers and the run
//! loop are simulated with counters and spawned tokio tasks.

mod app;
mod dom;

pub use app::{EventHandler, FixtureApp, RecordedEvent};
pub use dom::FixtureElement;
