//! Client configuration, read from the environment.
//!
//! | Variable                 | Default                         |
//! |--------------------------|---------------------------------|
//! | `SARA_API_URL`           | `http://localhost:8000/api`     |
//! | `SARA_DOWNLOAD_DIR`      | OS download dir, else `.`       |
//! | `SARA_SESSION_FILE`      | unset (in-memory session)       |
//! | `SARA_LOG_FORMAT`        | `json`                          |
//! | `SARA_HTTP_TIMEOUT_SECS` | `30`                            |

use std::path::PathBuf;
use std::time::Duration;

use sara_observability::{LogFormat, UnknownLogFormat};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must use http or https, got '{scheme}'")]
    UnsupportedScheme { var: &'static str, scheme: String },

    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },

    #[error(transparent)]
    LogFormat(#[from] UnknownLogFormat),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base, without trailing slash. Endpoint paths are appended verbatim.
    pub api_base_url: String,
    pub download_dir: PathBuf,
    /// When set, the session is persisted to this JSON file.
    pub session_file: Option<PathBuf>,
    pub log_format: LogFormat,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API base.
    pub fn new(api_base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", api_base_url.as_ref())?,
            download_dir: default_download_dir(),
            session_file: None,
            log_format: LogFormat::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api = lookup("SARA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base_url = parse_base_url("SARA_API_URL", &api)?;

        let download_dir = lookup("SARA_DOWNLOAD_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_download_dir);

        let session_file = lookup("SARA_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let log_format = match lookup("SARA_LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        let timeout = match lookup("SARA_HTTP_TIMEOUT_SECS") {
            Some(v) => {
                let secs = v
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::InvalidTimeout {
                        var: "SARA_HTTP_TIMEOUT_SECS",
                        value: v.clone(),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url,
            download_dir,
            session_file,
            log_format,
            timeout,
        })
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }
}

fn parse_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { var, source })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            var,
            scheme: url.scheme().to_string(),
        });
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.session_file, None);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SARA_API_URL", "https://erp.example.com/api/v1/"),
            ("SARA_DOWNLOAD_DIR", "/tmp/exports"),
            ("SARA_SESSION_FILE", "/tmp/sara/session.json"),
            ("SARA_LOG_FORMAT", "pretty"),
            ("SARA_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://erp.example.com/api/v1");
        assert_eq!(config.download_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/sara/session.json")));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("SARA_API_URL", "not a url")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("SARA_API_URL", "ftp://example.com")])),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("SARA_HTTP_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("SARA_LOG_FORMAT", "xml")])),
            Err(ConfigError::LogFormat(_))
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("SARA_HTTP_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidTimeout { value, .. }) if value == "0"
        ));
    }
}
