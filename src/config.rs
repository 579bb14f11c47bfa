use crate::models::{MetricSpec, ScraperError};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.onvista.de/aktien";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

pub const ENV_BASE_URL: &str = "VALUE_INVESTOR_BASE_URL";
pub const ENV_USER_AGENT: &str = "VALUE_INVESTOR_USER_AGENT";
pub const ENV_ACCEPT_LANGUAGE: &str = "VALUE_INVESTOR_ACCEPT_LANGUAGE";
pub const ENV_TIMEOUT_MS: &str = "VALUE_INVESTOR_TIMEOUT_MS";

/// Where and how pages are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_ms = match lookup(ENV_TIMEOUT_MS) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("ignoring {}={:?}, using {}ms", ENV_TIMEOUT_MS, raw, DEFAULT_TIMEOUT_MS);
                DEFAULT_TIMEOUT_MS
            }),
            None => DEFAULT_TIMEOUT_MS,
        };
        Self {
            base_url: lookup(ENV_BASE_URL).unwrap_or(defaults.base_url),
            user_agent: lookup(ENV_USER_AGENT).unwrap_or(defaults.user_agent),
            accept_language: lookup(ENV_ACCEPT_LANGUAGE).unwrap_or(defaults.accept_language),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

/// Reads a JSON array of `{"key": .., "label": ..}` objects.
pub fn load_metric_spec(path: &Path) -> Result<MetricSpec, ScraperError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ScraperError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let spec: MetricSpec = serde_json::from_str(&raw).map_err(|e| {
        ScraperError::Config(format!("cannot parse {}: {}", path.display(), e))
    })?;
    info!("loaded {} metrics from {}", spec.len(), path.display());
    Ok(spec)
}

/// The spec from `path` if given, otherwise the built-in one.
pub fn resolve_metric_spec(path: Option<&Path>) -> Result<MetricSpec, ScraperError> {
    match path {
        Some(path) => load_metric_spec(path),
        None => Ok(MetricSpec::value_investor()),
    }
}
