// src/deploy/executor.rs

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::{LinksSection, PathsSection};
use crate::deploy::ledger::Ledger;
use crate::deploy::manifest::{CanisterManifest, LinkBuilder};
use crate::deploy::wallet::ProvisionedWallet;
use crate::engine::Session;
use crate::errors::Result;
use crate::exec::{run_checked, CommandRunner, DfxCli};
use crate::fs::FileSystem;
use crate::notify::Notification;
use crate::types::{BalanceKind, Network};

/// Runs `deploy` and publishes the resulting manifest.
///
/// The manifest is only read after a successful deploy and is emitted whole,
/// so the UI never sees a stale or partial list.
pub struct DeploymentExecutor {
    session: Session,
    runner: Arc<dyn CommandRunner>,
    dfx: DfxCli,
    ledger: Ledger,
    fs: Arc<dyn FileSystem>,
    paths: PathsSection,
    links: LinksSection,
    deploy_timeout: Option<Duration>,
}

impl DeploymentExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: Session,
        runner: Arc<dyn CommandRunner>,
        dfx: DfxCli,
        ledger: Ledger,
        fs: Arc<dyn FileSystem>,
        paths: PathsSection,
        links: LinksSection,
        deploy_timeout: Option<Duration>,
    ) -> Self {
        Self {
            session,
            runner,
            dfx,
            ledger,
            fs,
            paths,
            links,
            deploy_timeout,
        }
    }

    /// Deploy every canister to the local replica.
    pub async fn deploy_local(&self) -> Result<CanisterManifest> {
        info!("deploying canisters locally");
        let spec = self.dfx.command(["deploy"]).timeout(self.deploy_timeout);
        run_checked(self.runner.as_ref(), spec).await?;
        self.publish_manifest(Network::Local)
    }

    /// Deploy every canister to mainnet, paid for by `wallet`.
    ///
    /// The wallet's cycles balance is reported before and after the attempt.
    pub async fn deploy_mainnet(
        &self,
        wallet: &ProvisionedWallet,
        cycles_per_canister: u64,
    ) -> Result<CanisterManifest> {
        info!(
            wallet = %wallet.canister_id(),
            cycles_per_canister,
            "deploying canisters to mainnet"
        );
        self.report_cycles().await?;

        let cycles = cycles_per_canister.to_string();
        let spec = self
            .dfx
            .on_network(["deploy", "--with-cycles", cycles.as_str()], Network::Mainnet)
            .timeout(self.deploy_timeout);
        let deployed = run_checked(self.runner.as_ref(), spec).await;

        // The after-balance is informational; it must not mask the deploy result.
        if let Err(e) = self.report_cycles().await {
            warn!(error = %e, "could not read wallet balance after deploy");
        }

        deployed?;
        self.publish_manifest(Network::Mainnet)
    }

    async fn report_cycles(&self) -> Result<()> {
        let value = self.ledger.wallet_balance(Network::Mainnet).await?;
        self.session.notify(Notification::BalanceUpdated {
            kind: BalanceKind::Cycles,
            value,
        });
        Ok(())
    }

    fn publish_manifest(&self, network: Network) -> Result<CanisterManifest> {
        let relative = match network {
            Network::Local => &self.paths.local_manifest,
            Network::Mainnet => &self.paths.mainnet_manifest,
        };
        let path = self.session.resolve(relative);
        let manifest = CanisterManifest::read(self.fs.as_ref(), &path)?;

        let builder = LinkBuilder::for_network(&self.links, network, self.dfx.mainnet_network());
        let links = manifest.classify(&builder);
        info!(
            canisters = manifest.len(),
            network = %builder.network_key(),
            "canister manifest updated"
        );

        self.session.notify(Notification::CanisterListUpdated {
            manifest: manifest.clone(),
            links,
        });
        self.session.notify(Notification::DeploymentSucceeded);
        Ok(manifest)
    }
}
