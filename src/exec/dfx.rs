// src/exec/dfx.rs

//! Argument builder for the external `dfx` CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ConfigFile;
use crate::exec::command::CommandSpec;
use crate::types::Network;

/// Fills in the program name, workspace root and default timeout for every
/// command issued against the CLI.
#[derive(Debug, Clone)]
pub struct DfxCli {
    program: String,
    workspace_root: PathBuf,
    mainnet_network: String,
    timeout: Option<Duration>,
}

impl DfxCli {
    pub fn new(program: impl Into<String>, workspace_root: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            workspace_root: workspace_root.as_ref().to_path_buf(),
            mainnet_network: "ic".to_string(),
            timeout: None,
        }
    }

    pub fn from_config(cfg: &ConfigFile, workspace_root: impl AsRef<Path>) -> Self {
        Self {
            program: cfg.config.dfx.clone(),
            workspace_root: workspace_root.as_ref().to_path_buf(),
            mainnet_network: cfg.config.mainnet_network.clone(),
            timeout: cfg.command_timeout(),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn mainnet_network(&self) -> &str {
        &self.mainnet_network
    }

    /// A command run in the workspace root with the default timeout.
    pub fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(&self.program)
            .args(args)
            .cwd(&self.workspace_root)
            .timeout(self.timeout)
    }

    /// Like [`DfxCli::command`], plus `--network <name>` for mainnet.
    pub fn on_network<I, S>(&self, args: I, network: Network) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args);
        match network {
            Network::Local => spec,
            Network::Mainnet => spec.arg("--network").arg(&self.mainnet_network),
        }
    }
}
