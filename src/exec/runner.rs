// src/exec/runner.rs

//! Subprocess runner: awaited and detached modes.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::errors::{DeployError, Result};
use crate::exec::command::{CommandResult, CommandSpec, ExitReport, ProcessEvent};
use crate::exec::task::TaskHandle;

/// Trait abstracting how external commands are executed.
///
/// Production code uses [`RealCommandRunner`]; tests provide a scripted
/// implementation that doesn't spawn real processes.
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output.
    ///
    /// A non-zero exit is a normal `Ok(CommandResult)` with `exit_code != 0`.
    /// `Err` is reserved for spawn failures, timeouts and cancellation.
    fn run(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult>> + Send + '_>>;

    /// Spawn a long-running command without waiting for it.
    ///
    /// Output lines and the final exit are delivered on `events`. The
    /// returned handle terminates the process when cancelled.
    fn spawn_detached(
        &self,
        spec: CommandSpec,
        events: mpsc::UnboundedSender<ProcessEvent>,
    ) -> Result<TaskHandle<ExitReport>>;
}

/// Runner backed by `tokio::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommandRunner {
    fn run(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult>> + Send + '_>> {
        Box::pin(async move {
            let task = TaskHandle::spawn(move |cancel_rx| run_to_completion(spec, cancel_rx));
            // Dropping this future drops the handle, which closes the cancel
            // channel and kills the child.
            task.join().await?
        })
    }

    fn spawn_detached(
        &self,
        spec: CommandSpec,
        events: mpsc::UnboundedSender<ProcessEvent>,
    ) -> Result<TaskHandle<ExitReport>> {
        let line = spec.command_line();
        info!(command = %line, "spawning detached process");

        let mut child = build_command(&spec)
            .spawn()
            .map_err(|e| DeployError::io(&spec.program, format!("spawning `{line}`: {e}")))?;

        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, events.clone(), ProcessEvent::Stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, events.clone(), ProcessEvent::Stderr);
        }

        Ok(TaskHandle::spawn(move |cancel_rx| {
            supervise_child(child, line, events, cancel_rx)
        }))
    }
}

fn build_command(spec: &CommandSpec) -> Command {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }
    cmd
}

async fn run_to_completion(
    spec: CommandSpec,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<CommandResult> {
    let line = spec.command_line();
    info!(command = %line, "running command");

    let child = build_command(&spec)
        .spawn()
        .map_err(|e| DeployError::io(&spec.program, format!("spawning `{line}`: {e}")))?;

    let timeout = spec.timeout;
    let wait = async move {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| limit),
            None => Ok(child.wait_with_output().await),
        }
    };

    // Either the process exits on its own (normal case), times out, or the
    // caller abandons the flow.
    tokio::select! {
        waited = wait => {
            let output = match waited {
                Ok(res) => res.map_err(|e| {
                    DeployError::io(&spec.program, format!("waiting for `{line}`: {e}"))
                })?,
                Err(limit) => {
                    warn!(command = %line, ?limit, "command timed out; killed");
                    return Err(DeployError::Process {
                        command: line,
                        code: -1,
                        stderr: format!("timed out after {limit:?}"),
                    });
                }
            };

            let result = CommandResult {
                command: spec.program,
                args: spec.args,
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };

            info!(
                command = %line,
                exit_code = result.exit_code,
                success = result.success(),
                "command exited"
            );
            if !result.stderr.is_empty() {
                debug!(command = %line, "stderr: {}", result.stderr.trim_end());
            }

            Ok(result)
        }

        _ = &mut cancel_rx => {
            // Explicit cancel or dropped handle: the child is killed on drop.
            info!(command = %line, "command abandoned; killing process");
            Err(DeployError::Process {
                command: line,
                code: -1,
                stderr: "cancelled".to_string(),
            })
        }
    }
}

async fn supervise_child(
    mut child: Child,
    line: String,
    events: mpsc::UnboundedSender<ProcessEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> ExitReport {
    let report = tokio::select! {
        status_res = child.wait() => {
            let code = match status_res {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(command = %line, error = %e, "failed to wait for detached process");
                    None
                }
            };
            info!(command = %line, exit_code = ?code, "detached process exited");
            ExitReport { code, terminated: false }
        }

        cancel = &mut cancel_rx => {
            if cancel.is_err() {
                debug!(command = %line, "handle dropped without explicit termination");
            }
            info!(command = %line, "termination requested; killing process");
            if let Err(e) = child.kill().await {
                warn!(command = %line, error = %e, "failed to kill detached process");
            }
            let code = child.try_wait().ok().flatten().and_then(|s| s.code());
            ExitReport { code, terminated: true }
        }
    };

    let _ = events.send(ProcessEvent::Exited(report));
    report
}

/// Consume a pipe line by line so OS buffers never fill up.
fn forward_lines<R>(
    reader: R,
    events: mpsc::UnboundedSender<ProcessEvent>,
    wrap: fn(String) -> ProcessEvent,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if events.send(wrap(line)).is_err() {
                break;
            }
        }
    });
}

/// Run a command and turn a non-zero exit into `DeployError::Process`.
pub async fn run_checked(runner: &dyn CommandRunner, spec: CommandSpec) -> Result<CommandResult> {
    runner.run(spec).await?.into_success()
}
