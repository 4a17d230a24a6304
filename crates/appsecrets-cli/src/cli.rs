use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "appsecrets",
    about = "Read file-mounted application secrets",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Secrets root directory (overrides environment and config).
    #[arg(long, global = true, conflicts_with = "mounted")]
    pub root: Option<PathBuf>,

    /// Read from the standard Kubernetes mount at /etc/secrets.
    #[arg(long, global = true)]
    pub mounted: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a secret's raw contents to stdout.
    Get {
        /// Secret key, e.g. database-secrets/username.
        key: String,
        /// Value to print when the secret file does not exist.
        #[arg(long)]
        default: Option<String>,
    },
    /// Verify that every secret the application requires is present.
    Check {
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
