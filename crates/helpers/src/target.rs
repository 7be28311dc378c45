use std::fmt;

/// Where a helper looks for its element: a selector, optionally scoped to
/// the descendants of a context selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    selector: String,
    context: Option<String>,
}

impl Target {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            context: None,
        }
    }

    pub fn within(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::new(selector)
    }
}

impl From<&String> for Target {
    fn from(selector: &String) -> Self {
        Self::new(selector.as_str())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} (within {})", self.selector, context),
            None => f.write_str(&self.selector),
        }
    }
}
