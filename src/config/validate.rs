// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, FundingSection, RawConfigFile};
use crate::errors::{DeployError, Result};
use crate::types::parse_timeout;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DeployError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_cli_section(&raw)?;
        validate_server_section(&raw)?;
        validate_funding(&raw.funding)?;
        let command_timeout = timeout_field("command_timeout", &raw.config.command_timeout)?;
        let deploy_timeout = timeout_field("deploy_timeout", &raw.config.deploy_timeout)?;
        Ok(ConfigFile::new_unchecked(raw, command_timeout, deploy_timeout))
    }
}

fn validate_cli_section(cfg: &RawConfigFile) -> Result<()> {
    let fields = [
        ("dfx", &cfg.config.dfx),
        ("identity", &cfg.config.identity),
        ("mainnet_network", &cfg.config.mainnet_network),
        ("rate_canister", &cfg.config.rate_canister),
    ];
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(DeployError::ConfigError(format!(
                "[config].{name} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_server_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.args.is_empty() {
        return Err(DeployError::ConfigError(
            "[server].args must name at least the start subcommand".to_string(),
        ));
    }
    Ok(())
}

fn validate_funding(funding: &FundingSection) -> Result<()> {
    let per_canister = funding.required_xdr_per_canister;
    if !per_canister.is_finite() || per_canister <= 0.0 {
        return Err(DeployError::ConfigError(format!(
            "[funding].required_xdr_per_canister must be > 0 (got {per_canister})"
        )));
    }

    let non_negative = [
        ("network_fee_buffer", funding.network_fee_buffer),
        ("wallet_creation_buffer", funding.wallet_creation_buffer),
        ("safety_margin", funding.safety_margin),
        ("ledger_fee_reserve", funding.ledger_fee_reserve),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(DeployError::ConfigError(format!(
                "[funding].{name} must be a non-negative number (got {value})"
            )));
        }
    }

    if funding.cycles_per_canister == 0 {
        return Err(DeployError::ConfigError(
            "[funding].cycles_per_canister must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn timeout_field(name: &str, value: &str) -> Result<Option<Duration>> {
    parse_timeout(value)
        .map_err(|e| DeployError::ConfigError(format!("[config].{name}: {e}")))
}
