// src/deploy/wallet.rs

//! Wallet provisioning state machine.
//!
//! ```text
//! CheckWallet ─┬─> Done
//!              └─> ResolveOwner -> FetchRate -> ComputeRequired -> CheckBalance
//!
//! CheckBalance ─┬─> CreateWallet -> Done
//!               └─> AwaitFunds
//! ```
//!
//! `Done` and `AwaitFunds` end a single invocation. Any failing step aborts
//! the whole chain; calling [`WalletProvisioner::provision`] again restarts
//! from `CheckWallet`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::FundingSection;
use crate::deploy::funding::{format_e8s, required_icp, to_e8s, FundingPlan};
use crate::deploy::identity::IdentityManager;
use crate::deploy::ledger::Ledger;
use crate::deploy::project::count_declared_canisters;
use crate::deploy::rate::{ExchangeRate, ExchangeRateOracle};
use crate::engine::Session;
use crate::errors::{DeployError, Result};
use crate::fs::FileSystem;
use crate::notify::Notification;
use crate::types::{BalanceKind, Network};

/// Public label of each provisioning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionState {
    CheckWallet,
    ResolveOwner,
    FetchRate,
    ComputeRequired,
    CheckBalance,
    CreateWallet,
    AwaitFunds,
    Done,
}

/// Internal state, carrying whatever the next step needs.
#[derive(Debug)]
enum Step {
    CheckWallet,
    ResolveOwner,
    FetchRate { owner: String },
    ComputeRequired { owner: String, rate: ExchangeRate },
    CheckBalance { owner: String, required_icp: f64 },
    CreateWallet { owner: String, plan: FundingPlan },
    AwaitFunds { plan: FundingPlan },
    Done { owner: Option<String>, canister_id: String },
}

impl Step {
    fn state(&self) -> ProvisionState {
        match self {
            Step::CheckWallet => ProvisionState::CheckWallet,
            Step::ResolveOwner => ProvisionState::ResolveOwner,
            Step::FetchRate { .. } => ProvisionState::FetchRate,
            Step::ComputeRequired { .. } => ProvisionState::ComputeRequired,
            Step::CheckBalance { .. } => ProvisionState::CheckBalance,
            Step::CreateWallet { .. } => ProvisionState::CreateWallet,
            Step::AwaitFunds { .. } => ProvisionState::AwaitFunds,
            Step::Done { .. } => ProvisionState::Done,
        }
    }
}

/// A wallet canister known to exist for the active identity.
///
/// Only the provisioner constructs this, so holding one proves the wallet
/// step reached `Done` in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedWallet {
    owner: Option<String>,
    canister_id: String,
}

impl ProvisionedWallet {
    /// Owner principal; `None` when the wallet already existed and the
    /// principal was never queried.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn canister_id(&self) -> &str {
        &self.canister_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    Ready(ProvisionedWallet),
    /// Balance too low; the user has to transfer funds to `address`.
    AwaitingFunds { plan: FundingPlan, address: String },
}

/// Outcome plus the states visited on the way, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionReport {
    pub outcome: ProvisionOutcome,
    pub path: Vec<ProvisionState>,
}

pub struct WalletProvisioner {
    session: Session,
    identities: IdentityManager,
    ledger: Ledger,
    oracle: ExchangeRateOracle,
    fs: Arc<dyn FileSystem>,
    project_file: PathBuf,
    funding: FundingSection,
}

impl WalletProvisioner {
    pub fn new(
        session: Session,
        identities: IdentityManager,
        ledger: Ledger,
        oracle: ExchangeRateOracle,
        fs: Arc<dyn FileSystem>,
        project_file: PathBuf,
        funding: FundingSection,
    ) -> Self {
        Self {
            session,
            identities,
            ledger,
            oracle,
            fs,
            project_file,
            funding,
        }
    }

    /// Run the state machine from `CheckWallet` to a terminal state.
    pub async fn provision(&self) -> Result<ProvisionReport> {
        let mut path = Vec::new();
        let mut step = Step::CheckWallet;

        loop {
            path.push(step.state());
            debug!(state = ?step.state(), "wallet provisioning step");

            step = match step {
                Step::CheckWallet => match self.identities.wallet(Network::Mainnet).await? {
                    Some(canister_id) => {
                        info!(wallet = %canister_id, "wallet already provisioned");
                        Step::Done {
                            owner: None,
                            canister_id,
                        }
                    }
                    None => Step::ResolveOwner,
                },

                Step::ResolveOwner => {
                    let owner = self.identities.principal().await.map_err(|e| {
                        DeployError::Precondition(format!(
                            "cannot resolve the identity's principal: {}",
                            e.user_message().trim()
                        ))
                    })?;
                    Step::FetchRate { owner }
                }

                Step::FetchRate { owner } => {
                    let rate = self.oracle.fetch().await?;
                    Step::ComputeRequired { owner, rate }
                }

                Step::ComputeRequired { owner, rate } => {
                    let canisters = count_declared_canisters(self.fs.as_ref(), &self.project_file)?;
                    let required_icp = required_icp(&self.funding, canisters, rate.xdr_per_icp());
                    info!(
                        canisters,
                        xdr_per_icp = rate.xdr_per_icp(),
                        required_icp,
                        "computed funding requirement"
                    );
                    Step::CheckBalance {
                        owner,
                        required_icp,
                    }
                }

                Step::CheckBalance {
                    owner,
                    required_icp,
                } => {
                    let balance = self.ledger.balance(Network::Mainnet).await?;
                    self.session.notify(Notification::BalanceUpdated {
                        kind: BalanceKind::Icp,
                        value: format_e8s(to_e8s(balance)),
                    });

                    let plan = FundingPlan::new(required_icp, balance);
                    if plan.sufficient {
                        Step::CreateWallet { owner, plan }
                    } else {
                        Step::AwaitFunds { plan }
                    }
                }

                Step::CreateWallet { owner, plan } => {
                    let amount = plan.wallet_funding_e8s(self.funding.ledger_fee_reserve)?;
                    let canister_id = self
                        .ledger
                        .create_canister(&owner, amount, Network::Mainnet)
                        .await?;
                    self.identities
                        .deploy_wallet(&canister_id, Network::Mainnet)
                        .await?;
                    Step::Done {
                        owner: Some(owner),
                        canister_id,
                    }
                }

                Step::AwaitFunds { plan } => {
                    let address = self.ledger.account_id().await?;
                    info!(
                        required_icp = plan.required_icp,
                        balance = plan.current_icp_balance,
                        %address,
                        "insufficient balance; waiting for funds"
                    );
                    self.session
                        .notify(Notification::AccountIdReady(address.clone()));
                    self.session.notify(Notification::FundingRequired {
                        amount: plan.required_icp,
                        address: address.clone(),
                    });
                    return Ok(ProvisionReport {
                        outcome: ProvisionOutcome::AwaitingFunds { plan, address },
                        path,
                    });
                }

                Step::Done { owner, canister_id } => {
                    return Ok(ProvisionReport {
                        outcome: ProvisionOutcome::Ready(ProvisionedWallet { owner, canister_id }),
                        path,
                    });
                }
            };
        }
    }
}
