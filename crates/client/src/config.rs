use std::path::PathBuf;
use std::time::Duration;

/// Default reconciliation interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Settings for one client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin without the `/api/v1` prefix, e.g. `http://localhost:3000`.
    pub base_url: String,
    pub poll_interval: Duration,
    pub cache_path: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            cache_path: cache_path.into(),
        }
    }

    /// Load from environment variables.
    ///
    /// | Env var                      | Default                  |
    /// |------------------------------|--------------------------|
    /// | `COMPANION_API_URL`          | `http://localhost:3000`  |
    /// | `COMPANION_POLL_INTERVAL_MS` | `3000`                   |
    /// | `COMPANION_CACHE_PATH`       | `companion-cache.json`   |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("COMPANION_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let cache_path = std::env::var("COMPANION_CACHE_PATH")
            .unwrap_or_else(|_| "companion-cache.json".into());
        let poll_interval = std::env::var("COMPANION_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Self {
            poll_interval,
            ..Self::new(base_url, cache_path)
        }
    }
}
