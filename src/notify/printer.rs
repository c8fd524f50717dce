// src/notify/printer.rs

use std::io::Write;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::Notification;

/// How notifications are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    /// One JSON message per line, for a UI process reading our stdout.
    Json,
}

/// Render one notification in the given format.
pub fn render(event: &Notification, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => event.to_string(),
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialise notification; falling back to text");
                event.to_string()
            }
        },
    }
}

/// Spawn the task that drains the notification channel onto stdout.
///
/// The task ends once every sender has been dropped.
pub fn spawn_printer(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    format: OutputFormat,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let line = render(&event, format);
            let written = {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{line}").and_then(|_| stdout.flush())
            };
            if written.is_err() {
                warn!("stdout closed; stopping notification printer");
                break;
            }
        }
    })
}
