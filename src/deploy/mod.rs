// src/deploy/mod.rs

//! The deploy pipeline: identity → wallet → deploy.
//!
//! - [`identity`] keeps the deployment identity present and active.
//! - [`ledger`] wraps ledger and wallet balance commands.
//! - [`rate`] fetches the live ICP → XDR conversion rate.
//! - [`funding`] holds the funding formula and `FundingPlan`.
//! - [`wallet`] is the provisioning state machine gating mainnet deploys.
//! - [`executor`] runs `deploy` and publishes the manifest.
//! - [`manifest`] parses and classifies canister-id manifests.
//! - [`project`] reads the project declaration file.
//! - [`parse`] is the only place free-text CLI output is scraped.

pub mod executor;
pub mod funding;
pub mod identity;
pub mod ledger;
pub mod manifest;
pub mod parse;
pub mod project;
pub mod rate;
pub mod wallet;

pub use executor::DeploymentExecutor;
pub use funding::{required_icp, round2, FundingPlan};
pub use identity::IdentityManager;
pub use ledger::Ledger;
pub use manifest::{CanisterKind, CanisterLink, CanisterLinks, CanisterManifest, LinkBuilder};
pub use rate::{ExchangeRate, ExchangeRateOracle};
pub use wallet::{
    ProvisionOutcome, ProvisionReport, ProvisionState, ProvisionedWallet, WalletProvisioner,
};
