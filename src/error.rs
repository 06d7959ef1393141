//! Error types for op-client operations

use std::time::Duration;
use thiserror::Error;

/// The single error type returned by every op-client operation.
///
/// Each variant maps to one failure category. Callers that only care about
/// the human-readable message can rely on `Display`.
#[derive(Error, Debug)]
pub enum OnePasswordError {
    #[error(
        "1Password CLI not found.\n\nTo install it:\n  - macOS: brew install 1password-cli\n  - Linux: Download from https://1password.com/downloads/command-line/\n  - Windows: Download from https://1password.com/downloads/command-line/\n  - NixOS: nix-env -iA nixpkgs._1password-cli\n\nOr set OP_CLI_PATH to the location of the op binary."
    )]
    CliNotFound,
    #[error("1Password CLI version {found} is not supported (minimum is {min})")]
    UnsupportedVersion {
        found: semver::Version,
        min: semver::Version,
    },
    #[error(
        "Authentication not configured.\n\nSet one of:\n  - OP_SERVICE_ACCOUNT_TOKEN for a service account\n  - OP_CONNECT_HOST and OP_CONNECT_TOKEN for a Connect server"
    )]
    AuthNotConfigured,
    #[error("Connect authentication incomplete: {missing} must be set when OP_CONNECT_HOST is set")]
    IncompleteConnectAuth { missing: &'static str },
    #[error("1Password CLI command failed: {0}")]
    Execution(String),
    #[error("1Password CLI command timed out after {0:?}")]
    Timeout(Duration),
    #[error("Failed to parse 1Password CLI output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// A type alias for `Result<T, OnePasswordError>`
pub type Result<T> = std::result::Result<T, OnePasswordError>;
