mod app;
mod launch;

pub use app::{BrowserElement, ChromiumApp};
