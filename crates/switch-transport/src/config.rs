//! Connection configuration, read once at startup.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Supported signaling platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Xmpp,
    Asterisk,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xmpp => "xmpp",
            Self::Asterisk => "asterisk",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xmpp" => Ok(Self::Xmpp),
            "asterisk" => Ok(Self::Asterisk),
            other => Err(TransportError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Configuration surface for the signaling connection.
///
/// Consumed read-only at startup; the core never revalidates or mutates it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Which transport implementation to connect with.
    pub platform: Platform,
    /// Account name (a JID for the xmpp platform).
    pub username: Option<String>,
    pub password: Option<String>,
    /// Whether the wire layer should reconnect after connection loss.
    pub auto_reconnect: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Domain-scoping strings used by the transport.
    pub root_domain: Option<String>,
    pub calls_domain: Option<String>,
    pub mixers_domain: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Xmpp,
            username: None,
            password: None,
            auto_reconnect: true,
            host: None,
            port: None,
            root_domain: None,
            calls_domain: None,
            mixers_domain: None,
        }
    }
}

/// Errors raised while establishing the signaling connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("unknown signaling platform: {0}")]
    UnknownPlatform(String),

    #[error("{platform} connection requires {field}")]
    MissingField {
        platform: &'static str,
        field: &'static str,
    },
}
