// src/notify/mod.rs

//! Notification boundary towards the UI collaborator.
//!
//! Every component reports progress through a [`NotificationSink`]. The
//! production sink forwards events over an mpsc channel to a printer task
//! (see [`printer`]), which renders them as human-readable lines or as JSON
//! messages of the form `{"type": ..., "value": ...}`.

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::deploy::manifest::{CanisterLinks, CanisterManifest};
use crate::types::BalanceKind;

pub mod printer;

pub use printer::{render, spawn_printer, OutputFormat};

/// Event vocabulary understood by the UI.
///
/// `CanisterListUpdated` always carries a complete manifest; the UI replaces
/// its view rather than merging.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Notification {
    ServerStarted,
    ServerStopped,
    /// Clear any displayed canister list.
    Reset,
    /// The network process failed to start or exited on its own.
    ServerFailed(String),
    CanisterListUpdated {
        manifest: CanisterManifest,
        links: CanisterLinks,
    },
    AccountIdReady(String),
    BalanceUpdated {
        kind: BalanceKind,
        value: String,
    },
    FundingRequired {
        amount: f64,
        address: String,
    },
    DeploymentFailed(String),
    DeploymentSucceeded,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::ServerStarted => f.write_str("Server started."),
            Notification::ServerStopped => f.write_str("Server stopped."),
            Notification::Reset => f.write_str("Canister list cleared."),
            Notification::ServerFailed(msg) => write!(f, "Server error: {}", msg.trim_end()),
            Notification::CanisterListUpdated { links, .. } => {
                f.write_str("Deployed canisters:")?;
                for link in links.frontends.iter().chain(links.backends.iter()) {
                    write!(f, "\n  {} ({}): ", link.name, link.kind)?;
                    match &link.url {
                        Some(url) => f.write_str(url)?,
                        None => f.write_str(&link.id)?,
                    }
                }
                Ok(())
            }
            Notification::AccountIdReady(address) => write!(f, "Account ID: {address}"),
            Notification::BalanceUpdated { kind, value } => write!(f, "{kind} balance: {value}"),
            Notification::FundingRequired { amount, address } => {
                write!(f, "Please transfer {amount:.2} ICP to {address}")
            }
            Notification::DeploymentFailed(msg) => {
                write!(f, "Deployment failed: {}", msg.trim_end())
            }
            Notification::DeploymentSucceeded => f.write_str("Deployed canisters!"),
        }
    }
}

/// Sink for notifications. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: Notification);
}

/// Sink forwarding every event over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, event: Notification) {
        if let Err(e) = self.tx.send(event) {
            debug!(event = ?e.0, "notification receiver closed; dropping event");
        }
    }
}
