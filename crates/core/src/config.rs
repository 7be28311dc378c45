use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::SettleError;

pub const ENV_INTERVAL_MS: &str = "SETTLE_POLL_INTERVAL_MS";
pub const ENV_DEADLINE_MS: &str = "SETTLE_DEADLINE_MS";
pub const ENV_MAX_PROBE_ERRORS: &str = "SETTLE_MAX_PROBE_ERRORS";

/// Tunables for a poll cycle.
///
/// The defaults reproduce the classic behaviour: a 10ms cadence and no
/// deadline, so an app that never settles makes the wait hang.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub deadline_ms: Option<u64>,
    /// Consecutive faulted ticks tolerated before the wait fails.
    /// `None` or `Some(0)` keeps polling through faults forever.
    pub max_probe_errors: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10,
            deadline_ms: None,
            max_probe_errors: Some(100),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// The effective fault limit; zero means no limit.
    pub fn probe_error_limit(&self) -> Option<u32> {
        self.max_probe_errors.filter(|&n| n > 0)
    }

    pub fn with_interval(mut self, ms: u64) -> Self {
        self.interval_ms = ms;
        self
    }

    pub fn with_deadline(mut self, ms: u64) -> Self {
        self.deadline_ms = Some(ms);
        self
    }

    /// 0 disables the limit, same as [`PollConfig::without_probe_error_limit`].
    pub fn with_max_probe_errors(mut self, n: u32) -> Self {
        self.max_probe_errors = (n > 0).then_some(n);
        self
    }

    pub fn without_probe_error_limit(mut self) -> Self {
        self.max_probe_errors = None;
        self
    }

    /// Defaults overridden by `SETTLE_*` environment variables.
    pub fn from_env() -> Result<Self, SettleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PollConfig::from_env`] with an injectable lookup, so callers
    /// can layer their own sources.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_INTERVAL_MS)? {
            config.interval_ms = ms;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_DEADLINE_MS)? {
            config.deadline_ms = Some(ms);
        }
        if let Some(n) = parse_var::<u32>(&lookup, ENV_MAX_PROBE_ERRORS)? {
            // 0 disables the limit
            config.max_probe_errors = (n > 0).then_some(n);
        }
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, SettleError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>().map(Some).map_err(|e| {
        SettleError::config(format!("invalid value for {}: {}", key, e))
            .with_context(serde_json::json!({ "variable": key, "value": raw }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_poll_every_ten_millis_without_deadline() {
        let config = PollConfig::default();
        assert_eq!(config.interval(), Duration::from_millis(10));
        assert_eq!(config.deadline(), None);
        assert_eq!(config.max_probe_errors, Some(100));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = PollConfig::from_lookup(lookup(&[
            (ENV_INTERVAL_MS, "25"),
            (ENV_DEADLINE_MS, "5000"),
            (ENV_MAX_PROBE_ERRORS, "0"),
        ]))
        .unwrap();
        assert_eq!(config.interval_ms, 25);
        assert_eq!(config.deadline(), Some(Duration::from_secs(5)));
        assert_eq!(config.max_probe_errors, None);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = PollConfig::from_lookup(lookup(&[(ENV_DEADLINE_MS, "  ")])).unwrap();
        assert_eq!(config, PollConfig::default());
    }

    #[test]
    fn unparsable_env_value_is_a_config_error() {
        let err = PollConfig::from_lookup(lookup(&[(ENV_INTERVAL_MS, "fast")])).unwrap_err();
        assert_eq!(err.category, ErrorCategory::Config);
        assert_eq!(err.context["variable"], ENV_INTERVAL_MS);
    }

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(PollConfig::default().with_interval(0).interval(), Duration::from_millis(1));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: PollConfig = serde_json::from_str(r#"{ "deadline_ms": 250 }"#).unwrap();
        assert_eq!(config.interval_ms, 10);
        assert_eq!(config.deadline_ms, Some(250));
    }

    #[test]
    fn zero_fault_limit_means_unlimited() {
        assert_eq!(PollConfig::default().with_max_probe_errors(0).probe_error_limit(), None);
        assert_eq!(PollConfig::default().with_max_probe_errors(3).probe_error_limit(), Some(3));

        let config: PollConfig = serde_json::from_str(r#"{ "max_probe_errors": 0 }"#).unwrap();
        assert_eq!(config.probe_error_limit(), None);
        assert_eq!(PollConfig::default().probe_error_limit(), Some(100));
    }
}
