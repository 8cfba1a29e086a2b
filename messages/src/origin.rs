//! Typed web origins and the trusted-origin allow-list.
//!
//! An [`Origin`] can never hold the wildcard `*`, so every send site is
//! forced to name a concrete counterpart. The same [`OriginPolicy`] gates
//! inbound events before their payload is looked at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    #[error("wildcard origin `*` is not allowed")]
    Wildcard,
    #[error("origin must look like scheme://host[:port], got {0:?}")]
    Malformed(String),
    #[error("unsupported origin scheme in {0:?}")]
    UnsupportedScheme(String),
}

/// A normalized `scheme://host[:port]` origin.
///
/// Scheme and host are lowercased and default ports (`:80` for http,
/// `:443` for https) are dropped, so two spellings of the same origin
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Origin(String);

impl Origin {
    /// Parse and normalize an origin string.
    ///
    /// # Errors
    ///
    /// Rejects `*`, anything carrying a path/query/fragment or userinfo,
    /// and schemes other than `http`/`https`.
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let raw = raw.trim();
        if raw == "*" {
            return Err(OriginError::Wildcard);
        }
        let Some((scheme, rest)) = raw.split_once("://") else {
            return Err(OriginError::Malformed(raw.to_owned()));
        };
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(OriginError::UnsupportedScheme(raw.to_owned()));
        }

        let authority = rest.strip_suffix('/').unwrap_or(rest);
        if authority.is_empty()
            || authority.contains(['/', '?', '#', '@', '*'])
            || authority.chars().any(char::is_whitespace)
        {
            return Err(OriginError::Malformed(raw.to_owned()));
        }

        let authority = authority.to_ascii_lowercase();
        let host = match (scheme.as_str(), authority.rsplit_once(':')) {
            ("https", Some((host, "443"))) | ("http", Some((host, "80"))) => host.to_owned(),
            _ => authority,
        };
        Ok(Self(format!("{scheme}://{host}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Origin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Origin {
    type Error = OriginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.0
    }
}

// =============================================================================
// POLICY
// =============================================================================

/// Explicit allow-list of trusted origins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: Vec<Origin>,
}

impl OriginPolicy {
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = Origin>) -> Self {
        let mut policy = Self::default();
        for origin in allowed {
            if !policy.allowed.contains(&origin) {
                policy.allowed.push(origin);
            }
        }
        policy
    }

    /// Parse a comma-separated list. Empty entries are skipped.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that is not a valid origin (including `*`).
    pub fn parse_list(raw: &str) -> Result<Self, OriginError> {
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Origin::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(origins))
    }

    /// Whether an inbound event origin is trusted. Unparseable origins
    /// (including the opaque `"null"` origin) are never trusted.
    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        Origin::parse(origin).is_ok_and(|origin| self.allowed.contains(&origin))
    }

    #[must_use]
    pub fn contains(&self, origin: &Origin) -> bool {
        self.allowed.contains(origin)
    }

    #[must_use]
    pub fn origins(&self) -> &[Origin] {
        &self.allowed
    }

    /// First configured origin, used as the default send target.
    #[must_use]
    pub fn primary(&self) -> Option<&Origin> {
        self.allowed.first()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

#[cfg(test)]
#[path = "origin_test.rs"]
mod tests;
