use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories for programmatic handling of helper and wait failures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Selector matched nothing
    ElementNotFound,
    /// A wait ran past its deadline
    Timeout,
    /// A probe or waiter kept failing while polling
    Probe,
    /// The host broke its side of the contract (dropped a flush task, etc.)
    Host,
    /// Visiting a URL or reading router state failed
    Navigation,
    /// JavaScript evaluation errors
    ScriptExecution,
    /// Browser/driver errors
    Browser,
    /// Selector or markup could not be parsed
    Parsing,
    /// Invalid configuration value
    Config,
}

/// Structured error with context for debugging
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("[{category:?}] {message}")]
pub struct SettleError {
    pub category: ErrorCategory,
    pub message: String,
    /// Optional context (selector, elapsed time, env var, etc.)
    pub context: serde_json::Value,
}

impl SettleError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn is(&self, category: ErrorCategory) -> bool {
        self.category == category
    }

    pub fn element_not_found(selector: impl Into<String>) -> Self {
        let selector = selector.into();
        Self::new(ErrorCategory::ElementNotFound, format!("Element {} not found.", selector))
            .with_context(serde_json::json!({ "selector": selector }))
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message)
    }

    pub fn probe(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Probe, message)
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Host, message)
    }

    pub fn navigation(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn script(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ScriptExecution, message)
    }

    pub fn browser(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Parsing, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Config, message)
    }
}
