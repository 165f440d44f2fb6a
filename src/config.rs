use std::env;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8001";
pub const TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const BIND_ADDR_VAR: &str = "OCR_RELAY_ADDR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Bearer token for the model gateway. `None` keeps the server up but
    /// answers every model-backed request with 503.
    pub bedrock_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let bedrock_token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Config {
            bind_addr,
            bedrock_token,
        })
    }
}
