use crate::config::Overrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "notelink")]
#[command(about = "Read-only note vault server with wikilink resolution and linked mentions")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run (defaults to serve)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a TOML config file
    #[arg(short = 'C', long, global = true, env = "NOTELINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory of the note vault
    #[arg(long, global = true, env = "VAULT_DIR")]
    pub vault_dir: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, global = true, env = "NOTELINK_BIND")]
    pub bind: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Serve the HTTP API
    Serve,
    /// Print the filename index as JSON
    Index,
    /// Print the notes linking to a filename as JSON
    Backlinks {
        /// Bare filename, e.g. "Note Name"
        filename: String,
    },
    /// Resolve a link target against the vault
    Resolve {
        /// Link target as written inside [[...]]
        target: String,
    },
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            vault_dir: self.vault_dir.clone(),
            bind: self.bind.clone(),
        }
    }
}
