// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `dfxdeploy`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dfxdeploy",
    version,
    about = "Start a local replica and deploy canisters locally or to mainnet.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Dfxdeploy.toml` in the workspace; a missing default file
    /// means built-in defaults.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root containing `dfx.json`. Default: current directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DFXDEPLOY_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print notifications as JSON lines instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the local network and keep it running until Ctrl-C.
    StartServer,
    /// Stop a running local network.
    StopServer,
    /// Deploy all canisters to the local network.
    DeployLocal,
    /// Provision a funded wallet if needed, then deploy to mainnet.
    DeployMainnet,
    /// Read commands from stdin, one per line, in a single session.
    Console,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
