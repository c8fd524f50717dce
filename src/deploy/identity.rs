// src/deploy/identity.rs

use std::sync::Arc;

use tracing::{debug, info};

use crate::deploy::parse::parse_single_token;
use crate::errors::{DeployError, Result};
use crate::exec::{run_checked, CommandRunner, DfxCli};
use crate::types::Network;

/// Marker the CLI prints when `identity new` hits an existing identity.
const ALREADY_EXISTS: &str = "already exists";

/// Keeps the dedicated deployment identity present and active.
#[derive(Clone)]
pub struct IdentityManager {
    runner: Arc<dyn CommandRunner>,
    dfx: DfxCli,
}

impl IdentityManager {
    pub fn new(runner: Arc<dyn CommandRunner>, dfx: DfxCli) -> Self {
        Self { runner, dfx }
    }

    /// Create the identity unless it already exists.
    pub async fn ensure(&self, name: &str) -> Result<()> {
        let spec = self
            .dfx
            .command(["identity", "new", name, "--storage-mode", "plaintext"]);
        let result = self.runner.run(spec).await?;

        if result.success() {
            info!(identity = %name, "identity created");
            return Ok(());
        }
        if result.stderr.contains(ALREADY_EXISTS) {
            debug!(identity = %name, "identity already exists");
            return Ok(());
        }
        result.into_success().map(|_| ())
    }

    /// Make `name` the active identity. Safe to repeat.
    pub async fn select(&self, name: &str) -> Result<()> {
        run_checked(self.runner.as_ref(), self.dfx.command(["identity", "use", name])).await?;
        debug!(identity = %name, "identity selected");
        Ok(())
    }

    /// Principal of the active identity.
    pub async fn principal(&self) -> Result<String> {
        let result = run_checked(
            self.runner.as_ref(),
            self.dfx.command(["identity", "get-principal"]),
        )
        .await?;
        parse_single_token("principal", &result.stdout)
    }

    /// Wallet canister of the active identity on `network`, if one is set.
    ///
    /// The CLI exits non-zero when no wallet is configured; that is answered
    /// as `None` rather than an error.
    pub async fn wallet(&self, network: Network) -> Result<Option<String>> {
        let result = self
            .runner
            .run(self.dfx.on_network(["identity", "get-wallet"], network))
            .await?;

        if !result.success() {
            debug!(stderr = %result.stderr.trim(), "no wallet configured for identity");
            return Ok(None);
        }
        match parse_single_token("wallet canister id", &result.stdout) {
            Ok(id) => Ok(Some(id)),
            Err(DeployError::Parse(_)) if result.stdout.trim().is_empty() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Record `canister_id` as the active identity's wallet on `network`.
    pub async fn deploy_wallet(&self, canister_id: &str, network: Network) -> Result<()> {
        run_checked(
            self.runner.as_ref(),
            self.dfx
                .on_network(["identity", "deploy-wallet", canister_id], network),
        )
        .await?;
        info!(wallet = %canister_id, "wallet associated with identity");
        Ok(())
    }
}
