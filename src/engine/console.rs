// src/engine/console.rs

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::engine::Orchestrator;
use crate::errors::{DeployError, Result};
use crate::types::Action;

/// Read operator commands line by line and dispatch them in one session.
///
/// Blank lines and `#` comments are skipped; `quit`/`exit` or end of input
/// ends the session. Ctrl-C while an action runs abandons that action (its
/// future is dropped, killing any in-flight command); Ctrl-C while idle ends
/// the session. The supervised network process is stopped on the way out.
pub async fn run_console<R>(orchestrator: &Orchestrator, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    info!("console ready; commands: start-server, stop-server, deploy-local, deploy-mainnet, quit");
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|e| DeployError::io("<stdin>", e))?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; leaving console");
                break;
            }
        };

        let Some(line) = line else {
            debug!("console input closed");
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let action = match line.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };

        tokio::select! {
            result = orchestrator.dispatch(action) => {
                if let Ok(outcome) = result {
                    debug!(?outcome, "action finished");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!(%action, "action abandoned");
            }
        }
    }

    orchestrator.shutdown().await;
    Ok(())
}
