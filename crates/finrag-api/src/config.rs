use finrag_core::config::LayeredConfig;
use finrag_core::error::{FinragError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,

    /// Sessions untouched for this long are discarded
    pub session_idle_timeout: Duration,

    /// Optional TOML file layered under the environment
    pub config_file: Option<PathBuf>,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    ///
    /// Malformed values are errors rather than silent fallbacks to the defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("FINRAG_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| FinragError::config_invalid("FINRAG_PORT", format!("'{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let session_idle_secs = match lookup("FINRAG_SESSION_IDLE_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(FinragError::config_invalid(
                        "FINRAG_SESSION_IDLE_SECS",
                        "must be at least 1",
                    ))
                }
                Err(e) => {
                    return Err(FinragError::config_invalid(
                        "FINRAG_SESSION_IDLE_SECS",
                        format!("'{}': {}", raw, e),
                    ))
                }
            },
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        let cors_origin =
            lookup("FINRAG_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let config_file = lookup("FINRAG_CONFIG").map(PathBuf::from);

        Ok(Self {
            port,
            cors_origin,
            session_idle_timeout: Duration::from_secs(session_idle_secs),
            config_file,
        })
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Resolve the layered pipeline configuration (file, then environment)
    pub fn layered(&self) -> Result<LayeredConfig> {
        let config = LayeredConfig::with_defaults();
        let config = match &self.config_file {
            Some(path) => config.load_from_file(path)?,
            None => config,
        };
        config.load_from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
        assert!(config.config_file.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
    }

    #[test]
    fn test_explicit_values() {
        let config = ApiConfig::from_vars(vars(&[
            ("FINRAG_PORT", "8080"),
            ("FINRAG_SESSION_IDLE_SECS", "60"),
            ("FINRAG_CONFIG", "/etc/finrag.toml"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(60));
        assert_eq!(config.config_file, Some(PathBuf::from("/etc/finrag.toml")));
    }

    #[test]
    fn test_malformed_port_is_configuration_error() {
        for raw in ["not-a-port", "70000", ""] {
            match ApiConfig::from_vars(vars(&[("FINRAG_PORT", raw)])) {
                Err(FinragError::ConfigInvalid { key, .. }) => assert_eq!(key, "FINRAG_PORT"),
                other => panic!("expected invalid FINRAG_PORT for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_malformed_idle_timeout_is_configuration_error() {
        for raw in ["soon", "0"] {
            let err = ApiConfig::from_vars(vars(&[("FINRAG_SESSION_IDLE_SECS", raw)])).unwrap_err();
            assert!(err.is_configuration());
        }
    }
}
