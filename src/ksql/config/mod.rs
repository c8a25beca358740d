//! ksqlDB client configuration
//!
//! Settings come from a YAML file, then `KSQLDB_*` environment variables override
//! individual fields:
//!
//! ```yaml
//! host: ksqldb.internal
//! port: 8088
//! protocol: https
//! auth:
//!   username: app
//!   password: secret
//! default_stream_properties:
//!   auto.offset.reset: latest
//! max_retries: 5
//! ```

use crate::ksql::client::{KsqlDbError, KsqlDbResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const ENV_HOST: &str = "KSQLDB_HOST";
pub const ENV_PORT: &str = "KSQLDB_PORT";
pub const ENV_PROTOCOL: &str = "KSQLDB_PROTOCOL";
pub const ENV_USERNAME: &str = "KSQLDB_USERNAME";
pub const ENV_PASSWORD: &str = "KSQLDB_PASSWORD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

impl FromStr for Protocol {
    type Err = KsqlDbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(KsqlDbError::Config {
                message: format!("Unknown protocol '{}', expected http or https", other),
            }),
        }
    }
}

/// Basic authentication credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Connection and retry settings for [`crate::KsqlDbClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KsqlDbConfig {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub auth: Option<BasicAuth>,
    /// Sent as `streamsProperties` with every statement unless overridden per request
    pub default_stream_properties: HashMap<String, String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum retry attempts after the first request
    pub max_retries: u32,
    /// Base retry delay in milliseconds, doubled on each attempt
    pub retry_delay_ms: u64,
}

impl Default for KsqlDbConfig {
    fn default() -> Self {
        let mut default_stream_properties = HashMap::new();
        default_stream_properties.insert("auto.offset.reset".to_string(), "earliest".to_string());
        Self {
            host: "localhost".to_string(),
            port: 8088,
            protocol: Protocol::Http,
            auth: None,
            default_stream_properties,
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl KsqlDbConfig {
    pub fn from_yaml_str(content: &str) -> KsqlDbResult<Self> {
        serde_yaml::from_str(content).map_err(|e| KsqlDbError::Config {
            message: format!("YAML parsing error: {}", e),
        })
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> KsqlDbResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| KsqlDbError::Config {
            message: format!("IO error reading {}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build a config pointing at `url`, e.g. `https://ksqldb:8088`.
    pub fn from_url(url: &str) -> KsqlDbResult<Self> {
        let invalid = || KsqlDbError::Config {
            message: format!("Invalid server URL: '{}'", url),
        };
        let (protocol, rest) = url.split_once("://").ok_or_else(invalid)?;
        let rest = rest.trim_end_matches('/');
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
            None => (rest, 8088),
        };
        let config = Self {
            host: host.to_string(),
            port,
            protocol: protocol.parse()?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `KSQLDB_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> KsqlDbResult<()> {
        if let Ok(host) = std::env::var(ENV_HOST) {
            self.host = host;
        }
        if let Ok(port) = std::env::var(ENV_PORT) {
            self.port = port.parse().map_err(|_| KsqlDbError::Config {
                message: format!("{} must be a port number, got '{}'", ENV_PORT, port),
            })?;
        }
        if let Ok(protocol) = std::env::var(ENV_PROTOCOL) {
            self.protocol = protocol.parse()?;
        }
        match (std::env::var(ENV_USERNAME), std::env::var(ENV_PASSWORD)) {
            (Ok(username), Ok(password)) => self.auth = Some(BasicAuth { username, password }),
            (Ok(username), Err(_)) => {
                let password = self.auth.take().map(|auth| auth.password).unwrap_or_default();
                self.auth = Some(BasicAuth { username, password });
            }
            (Err(_), Ok(password)) => {
                if let Some(auth) = self.auth.as_mut() {
                    auth.password = password;
                }
            }
            (Err(_), Err(_)) => {}
        }
        Ok(())
    }

    pub fn validate(&self) -> KsqlDbResult<()> {
        if self.host.trim().is_empty() {
            return Err(KsqlDbError::Config {
                message: "Host is required".to_string(),
            });
        }
        if self.port == 0 {
            return Err(KsqlDbError::Config {
                message: "Port must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}
