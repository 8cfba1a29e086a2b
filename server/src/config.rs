//! Proxy configuration parsed from environment variables.

use std::time::Duration;

use messages::{Origin, OriginError, OriginPolicy};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORE_URL: &str = "https://flavorinthejar.com";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "https://smakosz.flavorinthejar.com";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_EMPTY_CART_TOTAL: &str = "0.00 zł";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; FlavoAI/1.0)";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
    #[error("invalid origin in {var}: {source}")]
    Origin {
        var: &'static str,
        #[source]
        source: OriginError,
    },
}

impl messages::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
            Self::Origin { .. } => "E_CONFIG_ORIGIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub port: u16,
    /// Commerce platform origin. `?wc-ajax=<action>` is appended to it.
    pub store_url: Origin,
    /// Browser origins allowed to call the proxy with credentials.
    pub allowed_origins: OriginPolicy,
    pub timeouts: UpstreamTimeouts,
    /// Rewrite relayed cookies to `SameSite=None; Secure`.
    pub cookie_cross_site: bool,
    pub empty_cart_total: String,
    pub user_agent: String,
}

impl ProxyConfig {
    /// Build typed proxy config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `STORE_URL`: commerce platform origin
    /// - `ALLOWED_ORIGINS`: comma-separated browser origins
    /// - `UPSTREAM_TIMEOUT_SECS`: default 10
    /// - `UPSTREAM_CONNECT_TIMEOUT_SECS`: default 5
    /// - `COOKIE_CROSS_SITE`: inferred from the origins when unset
    /// - `EMPTY_CART_TOTAL`: total shown for the zero-cart fallback
    /// - `PROXY_USER_AGENT`: `User-Agent` sent upstream
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable numbers, booleans or origins.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ProxyConfig::from_env`] over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ProxyConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;

        let store_url = lookup("STORE_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_owned());
        let store_url = Origin::parse(&store_url).map_err(|source| ConfigError::Origin { var: "STORE_URL", source })?;

        let allowed = lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_owned());
        let allowed_origins =
            OriginPolicy::parse_list(&allowed).map_err(|source| ConfigError::Origin { var: "ALLOWED_ORIGINS", source })?;

        let timeouts = UpstreamTimeouts {
            request: parse_timeout(
                "UPSTREAM_TIMEOUT_SECS",
                lookup("UPSTREAM_TIMEOUT_SECS"),
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?,
            connect: parse_timeout(
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
                lookup("UPSTREAM_CONNECT_TIMEOUT_SECS"),
                DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
            )?,
        };

        let cookie_cross_site = match lookup("COOKIE_CROSS_SITE") {
            Some(raw) => parse_bool("COOKIE_CROSS_SITE", &raw)?,
            None => allowed_origins.origins().iter().any(|origin| *origin != store_url),
        };

        Ok(Self {
            port,
            store_url,
            allowed_origins,
            timeouts,
            cookie_cross_site,
            empty_cart_total: lookup("EMPTY_CART_TOTAL").unwrap_or_else(|| DEFAULT_EMPTY_CART_TOTAL.to_owned()),
            user_agent: lookup("PROXY_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, message: format!("expected a number, got {raw:?}") }),
    }
}

/// Whole seconds, at least one.
fn parse_timeout(var: &'static str, raw: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match parse_or(var, raw, default)? {
        0 => Err(ConfigError::Invalid { var, message: "timeout must be at least 1 second".to_owned() }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { var, message: format!("expected a boolean, got {raw:?}") }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
