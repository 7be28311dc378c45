use serde_json::json;
use settle_core::SettleError;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "SETTLE_BASE_URL";
pub const ENV_HEADLESS: &str = "SETTLE_HEADLESS";
pub const ENV_CHROME: &str = "SETTLE_CHROME";
pub const ENV_NAVIGATION_MS: &str = "SETTLE_NAVIGATION_MS";

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
    pub chrome_executable: Option<PathBuf>,
    /// Relative URLs handed to `visit` are resolved against this.
    pub base_url: String,
    /// Selector lookups are scoped to when no context is given.
    pub root_selector: String,
    /// JavaScript expression yielding the app's current route name, if the
    /// app exposes one.
    pub route_name_expression: Option<String>,
    pub navigation: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: None,
            viewport_height: None,
            chrome_executable: None,
            base_url: "about:blank".to_string(),
            root_selector: "body".to_string(),
            route_name_expression: None,
            navigation: Duration::from_millis(30000),
        }
    }
}

impl BrowserOptions {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_root(mut self, selector: impl Into<String>) -> Self {
        self.root_selector = selector.into();
        self
    }

    pub fn with_route_name_expression(mut self, expression: impl Into<String>) -> Self {
        self.route_name_expression = Some(expression.into());
        self
    }

    pub fn with_navigation(mut self, ms: u64) -> Self {
        self.navigation = Duration::from_millis(ms);
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = Some(width);
        self.viewport_height = Some(height);
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    pub fn headed(mut self) -> Self {
        self.headless = false;
        self
    }

    pub fn from_env() -> Result<Self, SettleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut options = Self::default();

        if let Some(url) = var(ENV_BASE_URL) {
            options.base_url = url;
        }
        if let Some(path) = var(ENV_CHROME) {
            options.chrome_executable = Some(PathBuf::from(path));
        }
        if let Some(raw) = var(ENV_HEADLESS) {
            options.headless = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(SettleError::config(format!("invalid value for {}: {}", ENV_HEADLESS, raw))
                        .with_context(json!({ "variable": ENV_HEADLESS, "value": raw })));
                }
            };
        }
        if let Some(raw) = var(ENV_NAVIGATION_MS) {
            let ms = raw.parse::<u64>().map_err(|e| {
                SettleError::config(format!("invalid value for {}: {}", ENV_NAVIGATION_MS, e))
                    .with_context(json!({ "variable": ENV_NAVIGATION_MS, "value": raw }))
            })?;
            options.navigation = Duration::from_millis(ms);
        }
        Ok(options)
    }

    /// Absolute URLs pass through; anything else is joined onto `base_url`.
    pub fn resolve(&self, url: &str) -> String {
        if url.contains("://") || url.starts_with("about:") || url.starts_with("data:") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}
