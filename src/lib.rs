//! op-client - read 1Password secrets through the `op` CLI
//!
//! This library wraps the 1Password command-line tool. It does not talk to
//! 1Password directly: every operation runs `op` as a subprocess and parses
//! what it prints.
//!
//! # Features
//!
//! - **Auth resolution**: service account token or Connect server credentials,
//!   read from the environment
//! - **Optional dotenv**: merge a `.env` file into the environment before resolving auth
//! - **Version check**: refuse to run against an `op` older than 2.0.0
//! - **Pluggable runner**: swap the subprocess layer for a test double
//!
//! # Example
//!
//! ```ignore
//! use op_client::{ClientOptions, OpClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load OP_SERVICE_ACCOUNT_TOKEN from .env if it is not already set
//!     let client = OpClient::new(ClientOptions::default().with_dotenv(None))?;
//!
//!     let token = client.get_secret("op://Private/GitHub/token")?;
//!     println!("token has {} characters", token.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod dotenv;
mod error;
mod models;
mod runner;
mod version;

pub use auth::{AuthConfig, CONNECT_HOST, CONNECT_TOKEN, SERVICE_ACCOUNT_TOKEN};
pub use client::{ClientOptions, OpClient};
pub use dotenv::{DEFAULT_DOTENV_FILE, DotenvOptions};
pub use error::{OnePasswordError, Result};
pub use models::{ItemSummary, Vault};
pub use runner::{CommandOutput, CommandRunner, DEFAULT_PROGRAM, OP_CLI_PATH_ENV, OpCli};
pub use version::MIN_SUPPORTED_VERSION;

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
