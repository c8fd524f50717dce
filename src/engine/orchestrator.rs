// src/engine/orchestrator.rs

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::deploy::{
    CanisterManifest, DeploymentExecutor, ExchangeRateOracle, FundingPlan, IdentityManager, Ledger,
    ProvisionOutcome, WalletProvisioner,
};
use crate::engine::Session;
use crate::errors::{DeployError, Result};
use crate::exec::{CommandRunner, DfxCli};
use crate::fs::FileSystem;
use crate::notify::Notification;
use crate::server::ProcessSupervisor;
use crate::types::Action;

/// What a successfully dispatched action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    ServerStarted,
    ServerStopped,
    Deployed(CanisterManifest),
    /// Mainnet deploy halted until `address` receives funds.
    AwaitingFunds { plan: FundingPlan, address: String },
}

/// Top-level controller for one workspace.
///
/// Owns the supervisor and the deploy pipeline, and is the only place that
/// turns failures into `deploymentFailed` / `serverFailed` notifications.
pub struct Orchestrator {
    session: Session,
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    supervisor: ProcessSupervisor,
    identities: IdentityManager,
    provisioner: WalletProvisioner,
    executor: DeploymentExecutor,
    /// Serialises identity mutation, provisioning and deploys.
    pipeline: Mutex<()>,
}

impl Orchestrator {
    pub fn new(
        session: Session,
        config: ConfigFile,
        runner: Arc<dyn CommandRunner>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let dfx = DfxCli::from_config(&config, session.workspace_root());

        let supervisor = ProcessSupervisor::new(
            session.clone(),
            runner.clone(),
            dfx.clone(),
            config.server.clone(),
        );
        let identities = IdentityManager::new(runner.clone(), dfx.clone());
        let ledger = Ledger::new(runner.clone(), dfx.clone());
        let oracle = ExchangeRateOracle::new(
            runner.clone(),
            dfx.clone(),
            config.config.rate_canister.clone(),
        );
        let provisioner = WalletProvisioner::new(
            session.clone(),
            identities.clone(),
            ledger.clone(),
            oracle,
            fs.clone(),
            session.resolve(&config.paths.project_file),
            config.funding,
        );
        let executor = DeploymentExecutor::new(
            session.clone(),
            runner,
            dfx,
            ledger,
            fs.clone(),
            config.paths.clone(),
            config.links.clone(),
            config.deploy_timeout(),
        );

        Self {
            session,
            config,
            fs,
            supervisor,
            identities,
            provisioner,
            executor,
            pipeline: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Run one operator action, reporting any failure on the notification
    /// channel before returning it.
    pub async fn dispatch(&self, action: Action) -> Result<ActionOutcome> {
        info!(%action, "dispatching action");

        let result = match action {
            Action::StartServer => self
                .supervisor
                .start()
                .await
                .map(|()| ActionOutcome::ServerStarted),
            Action::StopServer => self
                .supervisor
                .stop()
                .await
                .map(|()| ActionOutcome::ServerStopped),
            Action::DeployLocal => self.deploy_local().await.map(ActionOutcome::Deployed),
            Action::DeployMainnet => self.deploy_mainnet().await,
        };

        if let Err(e) = &result {
            self.report_failure(action, e);
        }
        result
    }

    /// Stop a network process started by an earlier invocation.
    pub async fn stop_unmanaged(&self) -> Result<()> {
        let result = self.supervisor.stop_external().await;
        if let Err(e) = &result {
            self.report_failure(Action::StopServer, e);
        }
        result
    }

    /// Stop the supervised process, if any. Called once when the session ends.
    pub async fn shutdown(&self) {
        if let Err(e) = self.supervisor.stop().await {
            warn!(error = %e, "failed to stop network process during shutdown");
        }
    }

    async fn deploy_local(&self) -> Result<CanisterManifest> {
        let _pipeline = self.pipeline.lock().await;
        self.require_project_file()?;
        self.executor.deploy_local().await
    }

    async fn deploy_mainnet(&self) -> Result<ActionOutcome> {
        let _pipeline = self.pipeline.lock().await;
        self.require_project_file()?;

        let identity = &self.config.config.identity;
        self.identities.ensure(identity).await?;
        self.identities.select(identity).await?;

        let report = self.provisioner.provision().await?;
        info!(path = ?report.path, "wallet provisioning finished");

        match report.outcome {
            ProvisionOutcome::Ready(wallet) => {
                let manifest = self
                    .executor
                    .deploy_mainnet(&wallet, self.config.funding.cycles_per_canister)
                    .await?;
                Ok(ActionOutcome::Deployed(manifest))
            }
            ProvisionOutcome::AwaitingFunds { plan, address } => {
                Ok(ActionOutcome::AwaitingFunds { plan, address })
            }
        }
    }

    fn require_project_file(&self) -> Result<()> {
        let path = self.session.resolve(&self.config.paths.project_file);
        if self.fs.exists(&path) {
            Ok(())
        } else {
            Err(DeployError::Precondition(format!(
                "no {} found in {}",
                self.config.paths.project_file,
                self.session.workspace_root().display()
            )))
        }
    }

    fn report_failure(&self, action: Action, error: &DeployError) {
        warn!(%action, error = %error, "action failed");
        let message = error.user_message();
        let event = match action {
            Action::StartServer | Action::StopServer => Notification::ServerFailed(message),
            Action::DeployLocal | Action::DeployMainnet => Notification::DeploymentFailed(message),
        };
        self.session.notify(event);
    }
}
