// src/server/supervisor.rs

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::ServerSection;
use crate::engine::Session;
use crate::errors::Result;
use crate::exec::{CommandRunner, DfxCli, ExitReport, ProcessEvent, TaskHandle};
use crate::notify::Notification;
use crate::types::ServerStatus;

/// The single tracked process, tagged with the generation that spawned it.
#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    handle: Option<TaskHandle<ExitReport>>,
}

/// Owns the lifecycle of the long-running local network process.
///
/// At most one handle is tracked. `start` terminates any predecessor before
/// spawning, and exit events carry the generation of the process that sent
/// them, so a late exit from a predecessor never touches its successor.
#[derive(Clone)]
pub struct ProcessSupervisor {
    session: Session,
    runner: Arc<dyn CommandRunner>,
    dfx: DfxCli,
    server: ServerSection,
    slot: Arc<Mutex<Slot>>,
    status: Arc<watch::Sender<ServerStatus>>,
}

impl ProcessSupervisor {
    pub fn new(
        session: Session,
        runner: Arc<dyn CommandRunner>,
        dfx: DfxCli,
        server: ServerSection,
    ) -> Self {
        let (status, _) = watch::channel(ServerStatus::Stopped);
        Self {
            session,
            runner,
            dfx,
            server,
            slot: Arc::new(Mutex::new(Slot::default())),
            status: Arc::new(status),
        }
    }

    pub fn status(&self) -> ServerStatus {
        *self.status.borrow()
    }

    /// Receiver observing every status transition.
    pub fn subscribe(&self) -> watch::Receiver<ServerStatus> {
        self.status.subscribe()
    }

    /// Number of tracked, still-running handles (0 or 1).
    pub async fn live_handles(&self) -> usize {
        let slot = self.slot.lock().await;
        usize::from(slot.handle.as_ref().is_some_and(|h| !h.is_finished()))
    }

    /// Start the network process, restarting it if one is already tracked.
    pub async fn start(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;

        if let Some(previous) = slot.handle.take() {
            info!(
                generation = slot.generation,
                "terminating running network process before restart"
            );
            self.set_status(ServerStatus::Stopping);
            if let Err(e) = previous.terminate().await {
                warn!(error = %e, "previous network process did not shut down cleanly");
            }
        }

        slot.generation += 1;
        let generation = slot.generation;
        self.set_status(ServerStatus::Starting);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let spec = self
            .dfx
            .command(self.server.args.iter().cloned())
            .timeout(None);

        match self.runner.spawn_detached(spec, events_tx) {
            Ok(handle) => {
                slot.handle = Some(handle);
                self.set_status(ServerStatus::Running);
                self.spawn_monitor(generation, events_rx);
                info!(generation, "network process started");
                self.session.notify(Notification::ServerStarted);
                Ok(())
            }
            Err(e) => {
                self.set_status(ServerStatus::Stopped);
                warn!(error = %e, "failed to spawn network process");
                Err(e)
            }
        }
    }

    /// Stop the tracked network process. No-op when nothing is tracked.
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        let Some(handle) = slot.handle.take() else {
            debug!("stop requested but no network process is tracked");
            return Ok(());
        };

        info!(generation = slot.generation, "stopping network process");
        self.set_status(ServerStatus::Stopping);
        self.run_stop_command().await;

        match handle.terminate().await {
            Ok(report) => debug!(code = ?report.code, "network process terminated"),
            Err(e) => warn!(error = %e, "network process did not shut down cleanly"),
        }

        self.set_status(ServerStatus::Stopped);
        self.session.notify(Notification::ServerStopped);
        self.session.notify(Notification::Reset);
        Ok(())
    }

    /// Stop a network process this supervisor did not start.
    ///
    /// Used by the one-shot `stop-server` command, where the process belongs
    /// to an earlier invocation. Unlike [`stop`](Self::stop), a failing stop
    /// command is an error here.
    pub async fn stop_external(&self) -> Result<()> {
        let _slot = self.slot.lock().await;
        let spec = self.dfx.command(self.server.stop_args.iter().cloned());
        self.runner.run(spec).await?.into_success()?;

        info!("network process stopped");
        self.set_status(ServerStatus::Stopped);
        self.session.notify(Notification::ServerStopped);
        self.session.notify(Notification::Reset);
        Ok(())
    }

    async fn run_stop_command(&self) {
        let spec = self.dfx.command(self.server.stop_args.iter().cloned());
        match self.runner.run(spec).await {
            Ok(result) if result.success() => debug!("stop command succeeded"),
            Ok(result) => warn!(
                exit_code = result.exit_code,
                stderr = %result.stderr.trim(),
                "stop command failed; terminating the process anyway"
            ),
            Err(e) => warn!(error = %e, "stop command failed; terminating the process anyway"),
        }
    }

    fn set_status(&self, status: ServerStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            debug!(from = ?previous, to = ?status, "server status changed");
        }
    }

    fn spawn_monitor(&self, generation: u64, mut events: mpsc::UnboundedReceiver<ProcessEvent>) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut last_stdout: Option<String> = None;
            let mut last_stderr: Option<String> = None;

            while let Some(event) = events.recv().await {
                match event {
                    ProcessEvent::Stdout(line) => {
                        debug!(generation, "network stdout: {}", line);
                        last_stdout = Some(line);
                    }
                    ProcessEvent::Stderr(line) => {
                        debug!(generation, "network stderr: {}", line);
                        if !line.trim().is_empty() {
                            last_stderr = Some(line);
                        }
                    }
                    ProcessEvent::Exited(report) => {
                        info!(
                            generation,
                            code = ?report.code,
                            terminated = report.terminated,
                            last_output = last_stdout.as_deref().unwrap_or(""),
                            "network process exited"
                        );
                        this.on_exit(generation, report, last_stderr.take()).await;
                        break;
                    }
                }
            }
        });
    }

    async fn on_exit(&self, generation: u64, report: ExitReport, last_stderr: Option<String>) {
        if report.terminated {
            return;
        }

        let mut slot = self.slot.lock().await;
        if slot.generation != generation || slot.handle.is_none() {
            debug!(generation, current = slot.generation, "ignoring exit of a stale process");
            return;
        }
        if self.status() != ServerStatus::Running {
            return;
        }

        slot.handle = None;
        self.set_status(ServerStatus::Stopped);

        let code = report
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        let mut message = format!("network process exited unexpectedly (exit code {code})");
        if let Some(line) = last_stderr {
            message.push_str(": ");
            message.push_str(line.trim());
        }
        warn!(generation, "{message}");

        self.session.notify(Notification::ServerFailed(message));
        self.session.notify(Notification::Reset);
    }
}
