//! Test helpers for driving an application and waiting for it to settle.
//!
//! ```ignore
//! let helpers = Helpers::new(app);
//! helpers.visit("/posts").await?;
//! helpers.fill_in("#title", "Hello").await?;
//! helpers.click(Target::new("button.save").within("form")).await?;
//! assert_eq!(helpers.current_route_name().await?.as_deref(), Some("posts.show"));
//! ```

pub mod events;
mod helpers;
mod target;

pub use helpers::Helpers;
pub use target::Target;

pub use settle_core::{EventOptions, SettleError, TestApp};
