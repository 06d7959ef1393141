use crate::auth::AuthConfig;
use crate::dotenv::{self, DotenvOptions};
use crate::models::{ItemSummary, Vault};
use crate::runner::{CommandOutput, CommandRunner, OpCli};
use crate::version::{self, MIN_SUPPORTED_VERSION};
use crate::{OnePasswordError, Result};
use semver::Version;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Options used once, while an [`OpClient`] is being constructed.
///
/// # Example
///
/// ```ignore
/// use op_client::ClientOptions;
///
/// let options = ClientOptions::default()
///     .with_dotenv(Some("production.env".into()))
///     .with_dotenv_override(true);
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Merge a `.env` file into the process environment before resolving auth.
    pub use_dotenv: bool,
    /// The dotenv file. Defaults to `.env` in the current directory.
    pub dotenv_path: Option<PathBuf>,
    /// Let dotenv values replace variables that are already set.
    pub dotenv_override: bool,
    /// Upper bound on each `op` invocation. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Oldest accepted `op` version.
    pub min_version: Version,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            use_dotenv: false,
            dotenv_path: None,
            dotenv_override: false,
            timeout: None,
            min_version: MIN_SUPPORTED_VERSION,
        }
    }
}

impl ClientOptions {
    /// Enables dotenv loading, optionally from a specific file.
    pub fn with_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.use_dotenv = true;
        self.dotenv_path = path;
        self
    }

    pub fn with_dotenv_override(mut self, override_existing: bool) -> Self {
        self.dotenv_override = override_existing;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_version(mut self, min_version: Version) -> Self {
        self.min_version = min_version;
        self
    }

    fn dotenv(&self) -> Option<DotenvOptions> {
        self.use_dotenv.then(|| DotenvOptions {
            path: self.dotenv_path.clone(),
            override_existing: self.dotenv_override,
        })
    }
}

/// Client for reading secrets through the 1Password CLI.
///
/// Construction merges the optional dotenv file, checks the installed `op`
/// version and resolves the authentication mode. A client is only returned
/// when all three steps succeed. After that the client is immutable.
///
/// # Example
///
/// ```ignore
/// use op_client::{ClientOptions, OpClient};
///
/// let client = OpClient::new(ClientOptions::default())?;
/// let password = client.get_secret("op://Private/Database/password")?;
/// for vault in client.list_vaults()? {
///     println!("{} {}", vault.id, vault.name);
/// }
/// ```
#[derive(Debug)]
pub struct OpClient<R = OpCli> {
    runner: R,
    auth: AuthConfig,
    cli_version: Option<Version>,
    timeout: Option<Duration>,
}

impl OpClient<OpCli> {
    /// Builds a client backed by the real `op` binary.
    ///
    /// `OP_CLI_PATH` is read after the dotenv step, so it may come from the
    /// dotenv file.
    pub fn new(options: ClientOptions) -> Result<Self> {
        prepare_environment(&options)?;
        let runner = OpCli::from_env().with_timeout(options.timeout);
        Self::initialize(&options, runner)
    }
}

impl<R: CommandRunner> OpClient<R> {
    /// Builds a client that runs commands through `runner`.
    pub fn with_runner(options: ClientOptions, runner: R) -> Result<Self> {
        prepare_environment(&options)?;
        Self::initialize(&options, runner)
    }

    fn initialize(options: &ClientOptions, runner: R) -> Result<Self> {
        let output = execute(&runner, &["--version"], options.timeout)?;
        let cli_version = check_version(&output, &options.min_version)?;

        let auth = AuthConfig::from_env()?;
        tracing::debug!(mode = auth.mode(), "resolved 1Password authentication");

        Ok(Self {
            runner,
            auth,
            cli_version,
            timeout: options.timeout,
        })
    }

    /// Reads a single secret by reference, e.g. `op://vault/item/field`.
    ///
    /// The reference is passed to `op read` untouched. Surrounding
    /// whitespace, including the trailing newline, is removed from the value.
    pub fn get_secret(&self, reference: &str) -> Result<String> {
        let output = self.execute(&["read", reference])?;
        Ok(output.trim().to_string())
    }

    /// Lists the vaults visible to the configured credentials.
    pub fn list_vaults(&self) -> Result<Vec<Vault>> {
        let output = self.execute(&["vault", "list", "--format", "json"])?;
        Ok(serde_json::from_str(&output)?)
    }

    /// Lists the items in a vault, identified by name or id.
    pub fn list_items(&self, vault: &str) -> Result<Vec<ItemSummary>> {
        let output = self.execute(&["item", "list", "--vault", vault, "--format", "json"])?;
        Ok(serde_json::from_str(&output)?)
    }

    /// The authentication mode resolved at construction.
    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// The `op` version detected at construction, if its output could be parsed.
    pub fn cli_version(&self) -> Option<&Version> {
        self.cli_version.as_ref()
    }

    fn execute(&self, args: &[&str]) -> Result<String> {
        execute(&self.runner, args, self.timeout)
    }
}

fn prepare_environment(options: &ClientOptions) -> Result<()> {
    if let Some(dotenv) = options.dotenv() {
        dotenv::load(&dotenv)?;
    }
    Ok(())
}

fn check_version(output: &str, min: &Version) -> Result<Option<Version>> {
    let Some(found) = version::parse(output) else {
        tracing::warn!(output = output.trim(), "could not parse 1Password CLI version");
        return Ok(None);
    };

    if !version::is_supported(&found, min) {
        return Err(OnePasswordError::UnsupportedVersion {
            found,
            min: min.clone(),
        });
    }

    tracing::debug!(version = %found, "found 1Password CLI");
    Ok(Some(found))
}

/// Runs one `op` command and returns its stdout.
fn execute<R: CommandRunner>(
    runner: &R,
    args: &[&str],
    timeout: Option<Duration>,
) -> Result<String> {
    tracing::debug!(?args, "running op");

    let output = runner
        .run(args)
        .map_err(|e| launch_error(e, timeout))?;

    if !output.success() {
        return Err(command_failed(&output));
    }
    Ok(output.stdout)
}

fn launch_error(err: io::Error, timeout: Option<Duration>) -> OnePasswordError {
    match err.kind() {
        io::ErrorKind::NotFound => OnePasswordError::CliNotFound,
        io::ErrorKind::TimedOut => match timeout {
            Some(timeout) => OnePasswordError::Timeout(timeout),
            None => OnePasswordError::Execution(err.to_string()),
        },
        _ => OnePasswordError::Execution(err.to_string()),
    }
}

fn command_failed(output: &CommandOutput) -> OnePasswordError {
    let message = output
        .stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty());

    match message {
        Some(msg) if msg.contains("not currently signed in") => OnePasswordError::Execution(
            format!("1Password authentication required ({msg})"),
        ),
        Some(msg) => OnePasswordError::Execution(msg.to_string()),
        None => match output.status {
            Some(code) => OnePasswordError::Execution(format!("op exited with status {code}")),
            None => OnePasswordError::Execution("op was terminated by a signal".to_string()),
        },
    }
}
