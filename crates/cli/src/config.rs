use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clipstudio_core::api_key::mask_api_key;
use clipstudio_veo::api::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT};
use clipstudio_veo::poller::DEFAULT_POLL_INTERVAL;

/// Database used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://clipstudio.db";

/// A malformed configuration value.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {var} ({value:?}): {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
///
/// Every field has a default suitable for local use, so an empty
/// environment is valid.
#[derive(Clone)]
pub struct AppConfig {
    /// SQLite URL of the library database.
    pub database_url: String,
    /// Fallback API key; a key saved with `key set` takes precedence.
    pub env_api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    /// Delay between operation status checks.
    pub poll_interval: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Explicit ffmpeg binary; `None` resolves `ffmpeg` through `PATH`.
    pub ffmpeg_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                            |
    /// |------------------------|----------------------------------------------------|
    /// | `DATABASE_URL`         | `sqlite://clipstudio.db`                           |
    /// | `GEMINI_API_KEY`       | unset                                              |
    /// | `VEO_API_BASE`         | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `VEO_MODEL`            | `veo-3.0-generate-001`                             |
    /// | `POLL_INTERVAL_SECS`   | `5`                                                |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                                              |
    /// | `FFMPEG_PATH`          | unset                                              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url =
            non_blank("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let env_api_key = non_blank("GEMINI_API_KEY");
        let api_base = non_blank("VEO_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = non_blank("VEO_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let poll_interval = match non_blank("POLL_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(parse_positive_secs("POLL_INTERVAL_SECS", &raw)?),
            None => DEFAULT_POLL_INTERVAL,
        };
        let request_timeout = match non_blank("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive_secs("REQUEST_TIMEOUT_SECS", &raw)?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let ffmpeg_path = non_blank("FFMPEG_PATH").map(PathBuf::from);

        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError {
                var: "DATABASE_URL",
                value: database_url,
                reason: "must be a sqlite: URL".to_string(),
            });
        }

        Ok(Self {
            database_url,
            env_api_key,
            api_base,
            model,
            poll_interval,
            request_timeout,
            ffmpeg_path,
        })
    }
}

// Keep the fallback key out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("env_api_key", &self.env_api_key.as_deref().map(mask_api_key))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("ffmpeg_path", &self.ffmpeg_path)
            .finish()
    }
}

fn parse_positive_secs(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError {
            var,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError {
            var,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.env_api_key.is_none());
        assert!(config.ffmpeg_path.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("GEMINI_API_KEY", " AIzaExampleKey1234 "),
            ("VEO_MODEL", "veo-2.0-generate-001"),
            ("POLL_INTERVAL_SECS", "2"),
            ("FFMPEG_PATH", "/opt/ffmpeg/bin/ffmpeg"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.env_api_key.as_deref(), Some("AIzaExampleKey1234"));
        assert_eq!(config.model, "veo-2.0-generate-001");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(
            config.ffmpeg_path.as_deref(),
            Some(std::path::Path::new("/opt/ffmpeg/bin/ffmpeg"))
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("GEMINI_API_KEY", "   "), ("VEO_MODEL", "")]).unwrap();
        assert!(config.env_api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_matches!(
            config(&[("POLL_INTERVAL_SECS", "soon")]),
            Err(ConfigError { var: "POLL_INTERVAL_SECS", .. })
        );
        assert_matches!(
            config(&[("REQUEST_TIMEOUT_SECS", "0")]),
            Err(ConfigError { var: "REQUEST_TIMEOUT_SECS", .. })
        );
    }

    #[test]
    fn non_sqlite_database_is_rejected() {
        let err = config(&[("DATABASE_URL", "postgres://localhost/clips")]).unwrap_err();
        assert_eq!(err.var, "DATABASE_URL");
    }

    #[test]
    fn debug_masks_api_key() {
        let config = config(&[("GEMINI_API_KEY", "AIzaSecretValue9876")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("AIzaSecretValue9876"));
        assert!(rendered.contains("****9876"));
    }
}
