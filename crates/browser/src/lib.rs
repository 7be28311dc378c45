//! Chromium-backed [`TestApp`](settle_core::TestApp) for running the settle
//! helpers against a real browser.

pub mod chromium;
pub mod shared;

pub use chromium::{BrowserElement, ChromiumApp};
pub use shared::BrowserOptions;
