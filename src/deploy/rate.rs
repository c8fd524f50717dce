// src/deploy/rate.rs

use std::sync::Arc;
use std::time::SystemTime;

use tracing::info;

use crate::deploy::parse::parse_xdr_permyriad;
use crate::errors::Result;
use crate::exec::{run_checked, CommandRunner, DfxCli};
use crate::types::Network;

/// Fixed denominator of the permyriad rate.
pub const PERMYRIAD: u64 = 10_000;

/// A freshly observed ICP → XDR conversion rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
    pub xdr_permyriad_per_icp: u64,
    pub observed_at: SystemTime,
}

impl ExchangeRate {
    pub fn new(xdr_permyriad_per_icp: u64) -> Self {
        Self {
            xdr_permyriad_per_icp,
            observed_at: SystemTime::now(),
        }
    }

    pub fn xdr_per_icp(&self) -> f64 {
        self.xdr_permyriad_per_icp as f64 / PERMYRIAD as f64
    }
}

/// Queries the conversion-rate system canister. Nothing is cached.
#[derive(Clone)]
pub struct ExchangeRateOracle {
    runner: Arc<dyn CommandRunner>,
    dfx: DfxCli,
    rate_canister: String,
}

impl ExchangeRateOracle {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        dfx: DfxCli,
        rate_canister: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            dfx,
            rate_canister: rate_canister.into(),
        }
    }

    pub async fn fetch(&self) -> Result<ExchangeRate> {
        let spec = self.dfx.on_network(
            [
                "canister",
                "call",
                self.rate_canister.as_str(),
                "get_icp_xdr_conversion_rate",
                "--query",
            ],
            Network::Mainnet,
        );
        let result = run_checked(self.runner.as_ref(), spec).await?;
        let rate = ExchangeRate::new(parse_xdr_permyriad(&result.stdout)?);
        info!(
            xdr_permyriad_per_icp = rate.xdr_permyriad_per_icp,
            xdr_per_icp = rate.xdr_per_icp(),
            "fetched conversion rate"
        );
        Ok(rate)
    }
}
