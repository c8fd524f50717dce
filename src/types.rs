use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which network a deploy or query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// The locally supervised replica.
    Local,
    /// The remote network configured as `mainnet_network` (usually `ic`).
    Mainnet,
}

/// Lifecycle of the supervised local network process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl Default for ServerStatus {
    fn default() -> Self {
        ServerStatus::Stopped
    }
}

/// Kind of balance reported through `balanceUpdated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceKind {
    /// Ledger token balance of the deployment identity.
    Icp,
    /// Cycles held by the wallet canister.
    Cycles,
}

impl fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceKind::Icp => f.write_str("ICP"),
            BalanceKind::Cycles => f.write_str("cycles"),
        }
    }
}

/// Operator action dispatched to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartServer,
    StopServer,
    DeployLocal,
    DeployMainnet,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start-server" | "start" => Ok(Action::StartServer),
            "stop-server" | "stop" => Ok(Action::StopServer),
            "deploy-local" => Ok(Action::DeployLocal),
            "deploy-mainnet" | "publish" => Ok(Action::DeployMainnet),
            other => Err(format!(
                "unknown action: {other} (expected start-server, stop-server, \
                 deploy-local or deploy-mainnet)"
            )),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::StartServer => "start-server",
            Action::StopServer => "stop-server",
            Action::DeployLocal => "deploy-local",
            Action::DeployMainnet => "deploy-mainnet",
        };
        f.write_str(s)
    }
}

/// Parse a timeout string like `"250ms"`, `"30s"`, `"2m"`, `"1h"`.
///
/// `"0"`, any zero duration and `"none"` mean "no timeout" and yield `Ok(None)`.
pub fn parse_timeout(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }
    if s == "0" || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let dur = match unit.as_str() {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" | "h" => {
            let factor = if unit == "m" { 60 } else { 60 * 60 };
            let secs = value
                .checked_mul(factor)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    Ok((!dur.is_zero()).then_some(dur))
}
