use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "WellnessEngine";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/analyze";
pub const DEFAULT_MODEL: &str = "wellness-analyst";
/// Hard bound on one generation call. No retry follows a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

pub const ENV_ENDPOINT: &str = "WELLNESS_ENDPOINT";
pub const ENV_MODEL: &str = "WELLNESS_MODEL";
pub const ENV_TIMEOUT_MS: &str = "WELLNESS_TIMEOUT_MS";
pub const ENV_CONFIDENCE_SEED: &str = "WELLNESS_CONFIDENCE_SEED";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,wellness_engine=debug"
}

/// Get the application data directory (`~/WellnessEngine/`).
///
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the history database.
pub fn history_db_path() -> PathBuf {
    app_data_dir().join("history.db")
}

/// Settings for the remote analysis path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Generation webhook URL.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
    /// Fixes the local fallback's confidence jitter. `None` draws from entropy.
    pub confidence_seed: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            confidence_seed: None,
        }
    }
}

impl AnalyzerConfig {
    /// Defaults overridden by `WELLNESS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout = Duration::from_millis(ms),
                _ => tracing::warn!(value = %raw, "Ignoring invalid {ENV_TIMEOUT_MS}"),
            }
        }
        if let Some(raw) = lookup(ENV_CONFIDENCE_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.confidence_seed = Some(seed),
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid {ENV_CONFIDENCE_SEED}"),
            }
        }

        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.confidence_seed = Some(seed);
        self
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
