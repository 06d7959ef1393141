//! Authentication modes understood by the `op` CLI.
//!
//! The client never passes credentials on the command line. It only checks
//! that the process environment holds a complete set for one of the two
//! modes below, since `op` reads the same variables on its own.

use crate::{OnePasswordError, Result};
use std::env;
use std::fmt;

/// Service account token variable.
pub const SERVICE_ACCOUNT_TOKEN: &str = "OP_SERVICE_ACCOUNT_TOKEN";
/// Connect server URL variable.
pub const CONNECT_HOST: &str = "OP_CONNECT_HOST";
/// Connect server token variable.
pub const CONNECT_TOKEN: &str = "OP_CONNECT_TOKEN";

/// The resolved authentication mode.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// Non-interactive auth with a service account token.
    ServiceAccount { token: String },
    /// Auth against a self-hosted Connect server.
    ConnectCredentials { host: String, token: String },
}

impl AuthConfig {
    /// Resolves the auth mode from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok())
    }

    /// Resolves the auth mode using `lookup` to read variables.
    ///
    /// A service account token takes precedence. Otherwise `OP_CONNECT_HOST`
    /// selects Connect mode, which then requires `OP_CONNECT_TOKEN`. Empty
    /// values count as unset.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(token) = get(SERVICE_ACCOUNT_TOKEN) {
            return Ok(Self::ServiceAccount { token });
        }

        if let Some(host) = get(CONNECT_HOST) {
            let token = get(CONNECT_TOKEN).ok_or(OnePasswordError::IncompleteConnectAuth {
                missing: CONNECT_TOKEN,
            })?;
            return Ok(Self::ConnectCredentials { host, token });
        }

        Err(OnePasswordError::AuthNotConfigured)
    }

    /// Short name of the mode, safe to print.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::ServiceAccount { .. } => "service-account",
            Self::ConnectCredentials { .. } => "connect",
        }
    }
}

// Tokens must never end up in logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount { .. } => f
                .debug_struct("ServiceAccount")
                .field("token", &"<redacted>")
                .finish(),
            Self::ConnectCredentials { host, .. } => f
                .debug_struct("ConnectCredentials")
                .field("host", host)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}
