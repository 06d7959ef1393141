use crate::{ClientOptions, OpClient};
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Main CLI structure for the op-client application.
#[derive(Parser)]
#[command(name = "op-client")]
#[command(about = "Read 1Password secrets through the op CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Load a .env file before resolving authentication (defaults to ./.env)
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    dotenv: Option<Option<PathBuf>>,
    /// Let values from the .env file replace variables that are already set
    #[arg(long, global = true, requires = "dotenv")]
    dotenv_override: bool,
    /// Abort any op invocation that runs longer than this many seconds
    #[arg(
        long,
        global = true,
        env = "OP_CLIENT_TIMEOUT",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: Option<u64>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a secret by reference (e.g. op://vault/item/field)
    Read {
        /// Secret reference
        reference: String,
    },
    /// List vaults
    Vaults {
        /// Print JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
    /// List items in a vault
    Items {
        /// Vault name or id
        vault: String,
        /// Print JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
    /// Show the detected op version and authentication mode
    Status,
}

impl Cli {
    fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default()
            .with_timeout(self.timeout.map(Duration::from_secs))
            .with_dotenv_override(self.dotenv_override);
        if let Some(path) = &self.dotenv {
            options = options.with_dotenv(path.clone());
        }
        options
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the op-client CLI.
///
/// Parses command-line arguments, builds an [`OpClient`] and runs the
/// requested subcommand.
pub fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let client = OpClient::new(cli.client_options())
        .wrap_err("Failed to initialize 1Password client")?;

    match cli.command {
        Commands::Read { reference } => {
            let secret = client
                .get_secret(&reference)
                .wrap_err_with(|| format!("Failed to read '{reference}'"))?;
            println!("{secret}");
        }
        Commands::Vaults { json } => {
            let vaults = client.list_vaults().wrap_err("Failed to list vaults")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&vaults)?);
            } else {
                for vault in vaults {
                    println!("{}\t{}", vault.id, vault.name);
                }
            }
        }
        Commands::Items { vault, json } => {
            let items = client
                .list_items(&vault)
                .wrap_err_with(|| format!("Failed to list items in vault '{vault}'"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in items {
                    println!("{}\t{}\t{}", item.id, item.category, item.title);
                }
            }
        }
        Commands::Status => {
            match client.cli_version() {
                Some(version) => println!("op version: {version}"),
                None => println!("op version: (unknown)"),
            }
            println!("auth mode:  {}", client.auth().mode());
        }
    }

    Ok(())
}
