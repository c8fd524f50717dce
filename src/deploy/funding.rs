// src/deploy/funding.rs

//! Funding formula and the derived `FundingPlan`.

use serde::Serialize;

use crate::config::FundingSection;
use crate::errors::{DeployError, Result};

/// Smallest ledger unit per ICP.
pub const E8S_PER_ICP: u64 = 100_000_000;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// ICP needed to create a wallet able to pay for `canister_count` canisters.
///
/// `round2((per_canister * count + fee_buffer + creation_buffer) / xdr_per_icp)
/// + safety_margin`, snapped to ledger precision.
pub fn required_icp(params: &FundingSection, canister_count: usize, xdr_per_icp: f64) -> f64 {
    let xdr = params.required_xdr_per_canister * canister_count as f64
        + params.network_fee_buffer
        + params.wallet_creation_buffer;
    from_e8s(to_e8s(round2(xdr / xdr_per_icp) + params.safety_margin))
}

/// Convert an ICP amount to e8s, rounding to the ledger's precision.
pub fn to_e8s(icp: f64) -> u64 {
    (icp * E8S_PER_ICP as f64).round().max(0.0) as u64
}

/// Nearest `f64` to an exact e8s amount.
pub fn from_e8s(e8s: u64) -> f64 {
    e8s as f64 / E8S_PER_ICP as f64
}

/// Render e8s as a decimal ICP amount with 8 fractional digits.
pub fn format_e8s(e8s: u64) -> String {
    format!("{}.{:08}", e8s / E8S_PER_ICP, e8s % E8S_PER_ICP)
}

/// Derived comparison between what is needed and what the owner holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FundingPlan {
    pub required_icp: f64,
    pub current_icp_balance: f64,
    pub sufficient: bool,
}

impl FundingPlan {
    /// Amounts are compared in e8s so float noise in the formula cannot flip
    /// the gate.
    pub fn new(required_icp: f64, current_icp_balance: f64) -> Self {
        Self {
            required_icp,
            current_icp_balance,
            sufficient: to_e8s(current_icp_balance) >= to_e8s(required_icp),
        }
    }

    /// Amount to move into the wallet: the whole balance minus `reserve`.
    ///
    /// Refuses when the plan is not sufficient, so no wallet-creation command
    /// can be built from an underfunded plan.
    pub fn wallet_funding_e8s(&self, reserve: f64) -> Result<u64> {
        if !self.sufficient {
            return Err(DeployError::Precondition(format!(
                "balance {:.8} ICP is below the required {:.2} ICP",
                self.current_icp_balance, self.required_icp
            )));
        }
        let amount = to_e8s(self.current_icp_balance).saturating_sub(to_e8s(reserve));
        if amount == 0 {
            return Err(DeployError::Precondition(
                "nothing left to fund the wallet after the ledger fee reserve".to_string(),
            ));
        }
        Ok(amount)
    }
}
