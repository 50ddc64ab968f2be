//! Host settings read from the environment.

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BASE_PATH: &str = "/api";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerSettings {
    /// `API_BIND_ADDR`, default `0.0.0.0:3000`.
    pub bind_addr: SocketAddr,
    /// `API_BASE_PATH`, default `/api`.
    pub base_path: String,
    /// `API_CONFIG_PATH`: JSON model configuration, optional.
    pub config_path: Option<PathBuf>,
    /// `API_BODY_LIMIT` in bytes, default 1 MiB.
    pub body_limit: usize,
}

impl ServerSettings {
    /// Load `.env` (if any), then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("API_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
            .parse()
            .map_err(|e| ConfigError::Load(format!("API_BIND_ADDR: {}", e)))?;
        let base_path = normalize_base_path(&lookup("API_BASE_PATH").unwrap_or_else(|| DEFAULT_BASE_PATH.into()));
        let config_path = lookup("API_CONFIG_PATH").filter(|s| !s.trim().is_empty()).map(PathBuf::from);
        let body_limit = match lookup("API_BODY_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::Load(format!("API_BODY_LIMIT: {}", e)))?,
            None => DEFAULT_BODY_LIMIT,
        };
        Ok(Self {
            bind_addr,
            base_path,
            config_path,
            body_limit,
        })
    }
}

/// Leading slash, no trailing slash; `/` for the root.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".into()
    } else {
        format!("/{}", trimmed)
    }
}
