use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ")]
    SharedSecret,
}

/// Process configuration. Signing secrets and the store URL are only ever
/// read from the environment.
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub access_secret: String,
    pub refresh_secret: String,
    pub store_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, so parsing can be tested without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                None => Err(ConfigError::Missing(name)),
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(name)),
                Some(v) => Ok(v),
            }
        };

        let database_url = required("DATABASE_URL")?;
        let access_secret = required("JWT_ACCESS_SECRET")?;
        let refresh_secret = required("JWT_REFRESH_SECRET")?;
        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let server_port = match lookup("SERVER_PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "SERVER_PORT",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        let store_timeout_secs = match lookup("STORE_TIMEOUT_SECS") {
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "STORE_TIMEOUT_SECS",
                        value: v,
                    })
                }
            },
            None => DEFAULT_STORE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            access_secret,
            refresh_secret,
            store_timeout: Duration::from_secs(store_timeout_secs),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
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

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://test"),
        ("JWT_ACCESS_SECRET", "access-secret"),
        ("JWT_REFRESH_SECRET", "refresh-secret"),
    ];

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&BASE)).unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("STORE_TIMEOUT_SECS", "2"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.store_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_missing_and_empty_secrets() {
        let err = Config::from_lookup(lookup_from(&BASE[..2])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_REFRESH_SECRET"));

        let mut pairs = BASE.to_vec();
        pairs[1] = ("JWT_ACCESS_SECRET", "  ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Empty("JWT_ACCESS_SECRET"));
    }

    #[test]
    fn test_shared_secret_rejected() {
        let pairs = [
            ("DATABASE_URL", "postgres://test"),
            ("JWT_ACCESS_SECRET", "same"),
            ("JWT_REFRESH_SECRET", "same"),
        ];
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::SharedSecret);
    }

    #[test]
    fn test_invalid_numbers() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SERVER_PORT", "eighty"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { name: "SERVER_PORT", .. })
        ));

        let mut pairs = BASE.to_vec();
        pairs.push(("STORE_TIMEOUT_SECS", "0"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { name: "STORE_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::from_lookup(lookup_from(&BASE)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("postgres://test"));
    }
}
