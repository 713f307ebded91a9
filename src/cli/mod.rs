pub mod config;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A3S Bridge - Agent session orchestration and streaming bridge
#[derive(Debug, Parser)]
#[command(name = "a3s-bridge", version, about)]
pub struct Cli {
    /// Config file (default: ~/.a3s/bridge/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host address to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration as TOML
    Config,
}
