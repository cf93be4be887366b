//! Relay configuration parsed from environment variables.
//!
//! Variables (all optional):
//! - `APP_ENV` (or `NODE_ENV`): `production` selects production mode;
//!   anything else is development
//! - `HOST`: bind address, `127.0.0.1` in development, `0.0.0.0` in production
//! - `PORT`: listen port, default 3000
//! - `STATIC_DIR`: directory served as the page fallback
//! - `REQUIRE_SIGN_IN`: gate `message` on a prior `sign-in`, default false
//! - `CLIENT_BUFFER`: per-connection outbound channel capacity, default 256

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLIENT_BUFFER: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} ({reason})")]
    Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_filter(self) -> &'static str {
        match self {
            RunMode::Development => "namecheer=debug,tower_http=debug,info",
            RunMode::Production => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub mode: RunMode,
    pub host: IpAddr,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub require_sign_in: bool,
    pub client_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Development,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            static_dir: None,
            require_sign_in: false,
            client_buffer: DEFAULT_CLIENT_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Build typed config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = parse_mode(lookup("APP_ENV").or_else(|| lookup("NODE_ENV")).as_deref());

        let host = match non_empty(lookup("HOST")) {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|e| invalid("HOST", &raw, e))?,
            None => default_host(mode),
        };
        let port = match non_empty(lookup("PORT")) {
            Some(raw) => raw.parse::<u16>().map_err(|e| invalid("PORT", &raw, e))?,
            None => DEFAULT_PORT,
        };
        let static_dir = non_empty(lookup("STATIC_DIR")).map(PathBuf::from);
        let require_sign_in = match non_empty(lookup("REQUIRE_SIGN_IN")) {
            Some(raw) => parse_bool("REQUIRE_SIGN_IN", &raw)?,
            None => false,
        };
        let client_buffer = match non_empty(lookup("CLIENT_BUFFER")) {
            Some(raw) => {
                let n = raw
                    .parse::<usize>()
                    .map_err(|e| invalid("CLIENT_BUFFER", &raw, e))?;
                if n == 0 {
                    return Err(invalid("CLIENT_BUFFER", &raw, "must be greater than zero"));
                }
                n
            }
            None => DEFAULT_CLIENT_BUFFER,
        };

        Ok(Self { mode, host, port, static_dir, require_sign_in, client_buffer })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_mode(raw: Option<&str>) -> RunMode {
    match raw.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("production") => RunMode::Production,
        _ => RunMode::Development,
    }
}

fn default_host(mode: RunMode) -> IpAddr {
    match mode {
        RunMode::Development => IpAddr::V4(Ipv4Addr::LOCALHOST),
        RunMode::Production => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, raw, "expected true or false")),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn invalid(var: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid { var, value: value.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
