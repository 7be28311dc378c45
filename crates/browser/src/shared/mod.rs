pub mod js;
pub mod errors;
pub mod config;

pub use config::BrowserOptions;
pub use errors::{is_context_lost, to_settle_error};
