//! Runtime configuration: built-in defaults, overlaid by environment
//! variables, overlaid by command line flags.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.coincap.io/v2";
pub const DEFAULT_DASHBOARD_LIMIT: u32 = 8;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_API_URL: &str = "CRYPTO_WATCHLIST_API_URL";
pub const ENV_API_KEY: &str = "COINCAP_API_KEY";
pub const ENV_DATA_DIR: &str = "CRYPTO_WATCHLIST_DATA_DIR";
pub const ENV_DASHBOARD_LIMIT: &str = "CRYPTO_WATCHLIST_DASHBOARD_LIMIT";
pub const ENV_TIMEOUT_MS: &str = "CRYPTO_WATCHLIST_TIMEOUT_MS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// CoinCap REST base, without the trailing `/assets`.
    pub api_base_url: String,
    /// Optional bearer token for keyed CoinCap endpoints.
    pub api_key: Option<String>,
    /// Directory holding the key-value store files.
    pub data_dir: PathBuf,
    /// Number of assets shown on the dashboard.
    pub dashboard_limit: u32,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            data_dir: PathBuf::from("."),
            dashboard_limit: DEFAULT_DASHBOARD_LIMIT,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unset, blank or
    /// unparseable values keep the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            cfg.api_base_url = url;
        }
        cfg.api_key = get(ENV_API_KEY);
        if let Some(dir) = get(ENV_DATA_DIR) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(limit) = get(ENV_DASHBOARD_LIMIT).and_then(|v| v.parse::<u32>().ok()) {
            cfg.dashboard_limit = limit.max(1);
        }
        if let Some(ms) = get(ENV_TIMEOUT_MS).and_then(|v| v.parse::<u64>().ok()) {
            cfg.request_timeout = Duration::from_millis(ms.max(1));
        }
        cfg
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg.api_base_url, DEFAULT_API_URL);
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.dashboard_limit, 8);
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_and_bad_values() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (ENV_API_URL, "http://localhost:9000/v2"),
            (ENV_API_KEY, "  "),
            (ENV_DATA_DIR, "/tmp/watch"),
            (ENV_DASHBOARD_LIMIT, "twelve"),
            (ENV_TIMEOUT_MS, "2500"),
        ]));
        assert_eq!(cfg.api_base_url, "http://localhost:9000/v2");
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/watch"));
        assert_eq!(cfg.dashboard_limit, DEFAULT_DASHBOARD_LIMIT);
        assert_eq!(cfg.request_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn builders_override() {
        let cfg = AppConfig::default()
            .with_base_url("http://mock")
            .with_data_dir("state");
        assert_eq!(cfg.api_base_url, "http://mock");
        assert_eq!(cfg.data_dir, PathBuf::from("state"));
    }
}
