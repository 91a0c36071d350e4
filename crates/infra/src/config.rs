//! Process configuration, read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DEBUG_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid socket address '{value}'")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var}: invalid url '{value}': {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var}: expected true/false, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var}: expected a whole number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Settings for the token introspection endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct HydraConfig {
    pub cluster_url: Url,
    pub client_id: String,
    pub client_secret: String,
    pub tls_verify: bool,
}

impl core::fmt::Debug for HydraConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HydraConfig")
            .field("cluster_url", &self.cluster_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tls_verify", &self.tls_verify)
            .finish()
    }
}

/// Collaborators left unset fall back to in-memory stand-ins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub debug_addr: SocketAddr,
    pub database_url: Option<String>,
    pub classsvc_url: Option<Url>,
    pub hydra: Option<HydraConfig>,
    pub redis_url: Option<String>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_addr("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR)?;
        let debug_addr = parse_addr("DEBUG_ADDR", get("DEBUG_ADDR"), DEFAULT_DEBUG_ADDR)?;
        let classsvc_url = get("CLASSSVC_URL")
            .map(|v| parse_url("CLASSSVC_URL", v))
            .transpose()?;

        let hydra = match get("HYDRA_CLUSTER_URL") {
            Some(raw) => Some(HydraConfig {
                cluster_url: parse_url("HYDRA_CLUSTER_URL", raw)?,
                client_id: get("HYDRA_CLIENT_ID").unwrap_or_default(),
                client_secret: get("HYDRA_CLIENT_SECRET").unwrap_or_default(),
                tls_verify: parse_bool("HYDRA_TLS_VERIFY", get("HYDRA_TLS_VERIFY"), true)?,
            }),
            None => None,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "HTTP_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            bind_addr,
            debug_addr,
            database_url: get("DATABASE_URL"),
            classsvc_url,
            hydra,
            redis_url: get("REDIS_URL"),
            http_timeout,
        })
    }
}

fn parse_addr(var: &'static str, raw: Option<String>, default: &str) -> Result<SocketAddr, ConfigError> {
    let value = raw.unwrap_or_else(|| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::InvalidAddr { var, value })
}

fn parse_url(var: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(var: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidBool { var, value }),
        },
    }
}
