//! Server settings loaded via OrthoConfig.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error("invalid bind address '{value}': {message}")]
    InvalidBindAddr { value: String, message: String },
    #[error("store timeout must be greater than zero")]
    ZeroStoreTimeout,
}

/// Process-wide server settings.
///
/// Values come from `GROCER_*` environment variables, configuration files,
/// or CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GROCER")]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// PostgreSQL URL. Without it the server keeps lists in memory.
    pub database_url: Option<String>,
    /// Upper bound on a single store call, in milliseconds.
    #[ortho_config(default = 10_000)]
    pub store_timeout_ms: u64,
    /// Browser origins allowed to call the API with credentials. The
    /// environment form is comma separated.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerConfigError> {
        let raw = self.bind_addr.trim();
        raw.parse()
            .map_err(|err: std::net::AddrParseError| ServerConfigError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            })
    }

    /// Store call timeout; zero is rejected.
    pub fn store_timeout(&self) -> Result<Duration, ServerConfigError> {
        match self.store_timeout_ms {
            0 => Err(ServerConfigError::ZeroStoreTimeout),
            ms => Ok(Duration::from_millis(ms)),
        }
    }

    /// Allowed CORS origins with surrounding whitespace and empty entries
    /// removed.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Database URL with blank values treated as absent.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
