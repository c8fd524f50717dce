// src/deploy/parse.rs

//! Scraping structured values out of free-text CLI output.
//!
//! Every function here fails loudly with `DeployError::Parse` when the
//! expected token is missing; callers never fall back to a guessed value.
//! The tests in `tests/output_parsing.rs` pin the exact sample lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{DeployError, Result};

/// Field name of the rate in the conversion-rate canister's reply.
pub const RATE_FIELD: &str = "xdr_permyriad_per_icp";

static RATE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"xdr_permyriad_per_icp\s*=\s*([0-9][0-9_]*)").expect("rate regex is valid")
});

/// Extract `xdr_permyriad_per_icp` from a Candid-text reply such as
///
/// ```text
///       xdr_permyriad_per_icp = 1_234_567 : nat64;
/// ```
///
/// Digit-group separators are stripped before parsing.
pub fn parse_xdr_permyriad(output: &str) -> Result<u64> {
    let line = output
        .lines()
        .find(|l| l.contains(RATE_FIELD))
        .ok_or_else(|| {
            DeployError::Parse(format!("no `{RATE_FIELD}` line in conversion-rate reply"))
        })?;

    let digits = RATE_VALUE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().replace('_', ""))
        .ok_or_else(|| DeployError::Parse(format!("malformed rate line: {:?}", line.trim())))?;

    let value: u64 = digits
        .parse()
        .map_err(|e| DeployError::Parse(format!("invalid rate value {digits:?}: {e}")))?;
    if value == 0 {
        return Err(DeployError::Parse("conversion rate is zero".to_string()));
    }
    Ok(value)
}

/// Extract the id of a freshly created canister.
///
/// Takes the last non-empty output line and returns the token between its
/// last two `"` characters:
///
/// ```text
/// Canister created with id: "gastn-uqaaa-aaaae-aaafq-cai"
/// ```
pub fn parse_created_canister_id(output: &str) -> Result<String> {
    let line = output
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| DeployError::Parse("create-canister produced no output".to_string()))?;

    let malformed = || DeployError::Parse(format!("no quoted canister id in {:?}", line.trim()));
    let end = line.rfind('"').ok_or_else(malformed)?;
    let start = line[..end].rfind('"').ok_or_else(malformed)?;

    let id = line[start + 1..end].trim();
    if id.is_empty() {
        return Err(malformed());
    }
    Ok(id.to_string())
}

/// Parse a ledger balance such as `12.34000000 ICP`.
pub fn parse_icp_amount(output: &str) -> Result<f64> {
    let token = output
        .split_whitespace()
        .next()
        .ok_or_else(|| DeployError::Parse("empty balance output".to_string()))?;

    let cleaned: String = token.chars().filter(|c| *c != '_' && *c != ',').collect();
    let amount: f64 = cleaned
        .parse()
        .map_err(|e| DeployError::Parse(format!("invalid ICP amount {token:?}: {e}")))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(DeployError::Parse(format!("invalid ICP amount {token:?}")));
    }
    Ok(amount)
}

/// A single non-empty token answered by a query (principal, account id).
pub fn parse_single_token(what: &str, output: &str) -> Result<String> {
    let token = output.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(DeployError::Parse(format!("expected a {what}, got {token:?}")));
    }
    Ok(token.to_string())
}
