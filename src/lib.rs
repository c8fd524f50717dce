// src/lib.rs

pub mod cli;
pub mod config;
pub mod deploy;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod notify;
pub mod server;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::BufReader;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::{default_config_path, load_and_validate, load_or_default, ConfigFile};
use crate::engine::{run_console, Orchestrator, Session};
use crate::exec::RealCommandRunner;
use crate::fs::RealFileSystem;
use crate::notify::{spawn_printer, ChannelSink, OutputFormat};
use crate::types::{Action, ServerStatus};

/// How long to wait for queued notifications to reach stdout on exit.
const PRINTER_DRAIN: Duration = Duration::from_secs(2);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the notification printer
/// - the session and orchestrator
/// - the selected subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    let workspace = match &args.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolving current directory")?,
    };
    let cfg = load_config(&args, &workspace)?;
    debug!(?cfg, "configuration loaded");

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let (sink, rx) = ChannelSink::new();
    let printer = spawn_printer(rx, format);

    let session = Session::new(&workspace, Arc::new(sink));
    let orchestrator = Orchestrator::new(
        session,
        cfg,
        Arc::new(RealCommandRunner::new()),
        Arc::new(RealFileSystem),
    );

    let outcome = execute(&orchestrator, args.command).await;

    // Dropping the orchestrator drops the last sink clones held outside
    // background tasks, letting the printer drain and finish.
    drop(orchestrator);
    if tokio::time::timeout(PRINTER_DRAIN, printer).await.is_err() {
        debug!("notification printer still busy at exit");
    }

    outcome
}

fn load_config(args: &CliArgs, workspace: &std::path::Path) -> Result<ConfigFile> {
    let cfg = match &args.config {
        Some(path) => {
            let path: PathBuf = if path.is_absolute() {
                path.clone()
            } else {
                workspace.join(path)
            };
            load_and_validate(&path)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => load_or_default(default_config_path(workspace))?,
    };
    Ok(cfg)
}

async fn execute(orchestrator: &Orchestrator, command: Command) -> Result<()> {
    match command {
        Command::StartServer => serve(orchestrator).await,
        Command::StopServer => Ok(orchestrator.stop_unmanaged().await?),
        Command::DeployLocal => {
            orchestrator.dispatch(Action::DeployLocal).await?;
            Ok(())
        }
        Command::DeployMainnet => {
            orchestrator.dispatch(Action::DeployMainnet).await?;
            Ok(())
        }
        Command::Console => {
            run_console(orchestrator, BufReader::new(tokio::io::stdin())).await?;
            Ok(())
        }
    }
}

/// One-shot `start-server`: keep the process supervised until Ctrl-C or
/// until it exits on its own.
async fn serve(orchestrator: &Orchestrator) -> Result<()> {
    orchestrator.dispatch(Action::StartServer).await?;
    let mut status = orchestrator.supervisor().subscribe();
    info!("local network running; press Ctrl-C to stop");

    let crashed = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            false
        }
        _ = status.wait_for(|s| *s == ServerStatus::Stopped) => true,
    };

    orchestrator.shutdown().await;
    if crashed {
        bail!("local network exited unexpectedly");
    }
    Ok(())
}
