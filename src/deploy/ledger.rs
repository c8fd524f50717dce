// src/deploy/ledger.rs

use std::sync::Arc;

use tracing::info;

use crate::deploy::funding::format_e8s;
use crate::deploy::parse::{parse_created_canister_id, parse_icp_amount, parse_single_token};
use crate::errors::Result;
use crate::exec::{run_checked, CommandRunner, DfxCli};
use crate::types::Network;

/// Ledger and wallet queries of the active identity.
#[derive(Clone)]
pub struct Ledger {
    runner: Arc<dyn CommandRunner>,
    dfx: DfxCli,
}

impl Ledger {
    pub fn new(runner: Arc<dyn CommandRunner>, dfx: DfxCli) -> Self {
        Self { runner, dfx }
    }

    /// Deposit address of the active identity.
    pub async fn account_id(&self) -> Result<String> {
        let spec = self.dfx.command(["ledger", "account-id"]);
        let result = run_checked(self.runner.as_ref(), spec).await?;
        parse_single_token("account id", &result.stdout)
    }

    /// ICP balance of the active identity.
    pub async fn balance(&self, network: Network) -> Result<f64> {
        let result = run_checked(
            self.runner.as_ref(),
            self.dfx.on_network(["ledger", "balance"], network),
        )
        .await?;
        parse_icp_amount(&result.stdout)
    }

    /// Create a canister owned by `owner`, funded with `amount_e8s`, and
    /// return its id.
    pub async fn create_canister(
        &self,
        owner: &str,
        amount_e8s: u64,
        network: Network,
    ) -> Result<String> {
        let amount = format_e8s(amount_e8s);
        info!(%owner, %amount, "creating wallet canister");
        let result = run_checked(
            self.runner.as_ref(),
            self.dfx.on_network(
                ["ledger", "create-canister", owner, "--amount", amount.as_str()],
                network,
            ),
        )
        .await?;
        parse_created_canister_id(&result.stdout)
    }

    /// Cycles held by the active identity's wallet, as printed by the CLI.
    pub async fn wallet_balance(&self, network: Network) -> Result<String> {
        let result = run_checked(
            self.runner.as_ref(),
            self.dfx.on_network(["wallet", "balance"], network),
        )
        .await?;
        Ok(result.stdout_trimmed().to_string())
    }
}
