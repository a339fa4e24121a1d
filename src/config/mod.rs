pub mod tokens;

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BACKGROUND_URL: &str = "http://127.0.0.1:8545/background";
const DEFAULT_BACKGROUND_TIMEOUT_SECS: u64 = 30;

/// Deployment environment, used to hide non-production custodians
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
    Testing,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }
}

/// Runtime configuration for the UI layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show the aggregate balance summary above the asset list
    pub multichain: bool,
    pub environment: Environment,
    /// Endpoint of the background service request channel
    pub background_url: String,
    /// Upper bound for a single background request
    pub background_timeout_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            multichain: cfg!(feature = "multichain"),
            environment: Environment::Development,
            background_url: DEFAULT_BACKGROUND_URL.to_string(),
            background_timeout_secs: DEFAULT_BACKGROUND_TIMEOUT_SECS,
        }
    }
}

impl UiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_multichain = lookup("MULTICHAIN")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        Self {
            multichain: cfg!(feature = "multichain") || env_multichain,
            environment: lookup("METAMASK_ENVIRONMENT")
                .map(|v| Environment::parse(&v))
                .unwrap_or(Environment::Development),
            background_url: lookup("BACKGROUND_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BACKGROUND_URL.to_string()),
            background_timeout_secs: lookup("BACKGROUND_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_BACKGROUND_TIMEOUT_SECS),
        }
    }

    pub fn background_timeout(&self) -> Duration {
        Duration::from_secs(self.background_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = UiConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.multichain, cfg!(feature = "multichain"));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.background_url, DEFAULT_BACKGROUND_URL);
        assert_eq!(config.background_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let config = UiConfig::from_lookup(lookup_from(&[
            ("MULTICHAIN", "1"),
            ("METAMASK_ENVIRONMENT", "Production"),
            ("BACKGROUND_URL", "http://localhost:9000/rpc"),
            ("BACKGROUND_TIMEOUT_SECS", "5"),
        ]));
        assert!(config.multichain);
        assert!(config.is_production());
        assert_eq!(config.background_url, "http://localhost:9000/rpc");
        assert_eq!(config.background_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let config = UiConfig::from_lookup(lookup_from(&[("BACKGROUND_TIMEOUT_SECS", "0")]));
        assert_eq!(config.background_timeout_secs, DEFAULT_BACKGROUND_TIMEOUT_SECS);

        let config = UiConfig::from_lookup(lookup_from(&[("BACKGROUND_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.background_timeout_secs, DEFAULT_BACKGROUND_TIMEOUT_SECS);
    }
}
