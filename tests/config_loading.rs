mod common;

use std::fs;
use std::time::Duration;

use common::TestResult;
use dfxdeploy::config::{default_config_path, load_and_validate, load_or_default, ConfigFile};
use dfxdeploy::errors::DeployError;
use dfxdeploy::types::parse_timeout;
use dfxdeploy_test_utils::ConfigFileBuilder;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() -> TestResult {
    let dir = tempdir()?;
    let cfg = load_or_default(default_config_path(dir.path()))?;

    assert_eq!(cfg.config.dfx, "dfx");
    assert_eq!(cfg.config.identity, "vscode-ext");
    assert_eq!(cfg.config.mainnet_network, "ic");
    assert_eq!(cfg.config.rate_canister, "rkp4c-7iaaa-aaaaa-aaaca-cai");
    assert_eq!(cfg.server.args, ["start", "--clean"]);
    assert_eq!(cfg.funding.required_xdr_per_canister, 2.0);
    assert_eq!(cfg.funding.cycles_per_canister, 2_000_000_000_000);
    assert_eq!(cfg.paths.local_manifest, ".dfx/local/canister_ids.json");
    assert_eq!(cfg.links.candid_ui_name, "__Candid_UI");
    assert_eq!(cfg.command_timeout(), Some(Duration::from_secs(120)));
    assert_eq!(cfg.deploy_timeout(), Some(Duration::from_secs(30 * 60)));
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let result = load_and_validate(dir.path().join("nope.toml"));
    assert!(matches!(result, Err(DeployError::Io { .. })));
}

#[test]
fn overrides_are_applied() -> TestResult {
    let dir = tempdir()?;
    let path = default_config_path(dir.path());
    fs::write(
        &path,
        r#"
[config]
dfx = "/opt/dfx/bin/dfx"
identity = "deployer"
command_timeout = "none"
deploy_timeout = "45s"

[server]
args = ["start", "--clean", "--background=false"]

[funding]
required_xdr_per_canister = 3.5
cycles_per_canister = 500000000000

[links]
local_gateway = "http://localhost:8080"
"#,
    )?;

    let cfg = load_or_default(&path)?;
    assert_eq!(cfg.config.dfx, "/opt/dfx/bin/dfx");
    assert_eq!(cfg.config.identity, "deployer");
    assert_eq!(cfg.command_timeout(), None);
    assert_eq!(cfg.deploy_timeout(), Some(Duration::from_secs(45)));
    assert_eq!(cfg.server.args.len(), 3);
    assert_eq!(cfg.server.stop_args, ["stop"]);
    assert_eq!(cfg.funding.required_xdr_per_canister, 3.5);
    assert_eq!(cfg.funding.safety_margin, 0.01);
    assert_eq!(cfg.funding.cycles_per_canister, 500_000_000_000);
    assert_eq!(cfg.links.local_gateway, "http://localhost:8080");
    assert_eq!(cfg.links.mainnet_domain, "icp0.io");
    Ok(())
}

#[test]
fn invalid_toml_is_reported() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Dfxdeploy.toml");
    fs::write(&path, "[config\nidentity = ")?;

    assert!(matches!(
        load_and_validate(&path),
        Err(DeployError::TomlError(_))
    ));
    Ok(())
}

fn rejected(raw: dfxdeploy::config::RawConfigFile) -> String {
    match ConfigFile::try_from(raw) {
        Err(DeployError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn validation_rejects_bad_values() {
    let msg = rejected(ConfigFileBuilder::new().identity("  ").raw());
    assert!(msg.contains("identity"), "{msg}");

    let msg = rejected(ConfigFileBuilder::new().required_xdr_per_canister(0.0).raw());
    assert!(msg.contains("required_xdr_per_canister"), "{msg}");

    let msg = rejected(ConfigFileBuilder::new().cycles_per_canister(0).raw());
    assert!(msg.contains("cycles_per_canister"), "{msg}");

    let msg = rejected(ConfigFileBuilder::new().command_timeout("soon").raw());
    assert!(msg.contains("command_timeout"), "{msg}");

    let msg = rejected(ConfigFileBuilder::new().server_args(&[]).raw());
    assert!(msg.contains("args"), "{msg}");

    let mut raw = ConfigFileBuilder::new().raw();
    raw.funding.safety_margin = -0.01;
    let msg = rejected(raw);
    assert!(msg.contains("safety_margin"), "{msg}");
}

#[test]
fn timeout_strings() {
    assert_eq!(parse_timeout("250ms"), Ok(Some(Duration::from_millis(250))));
    assert_eq!(parse_timeout("30s"), Ok(Some(Duration::from_secs(30))));
    assert_eq!(parse_timeout("2m"), Ok(Some(Duration::from_secs(120))));
    assert_eq!(parse_timeout("1h"), Ok(Some(Duration::from_secs(3600))));
    assert_eq!(parse_timeout("0"), Ok(None));
    assert_eq!(parse_timeout("0s"), Ok(None));
    assert_eq!(parse_timeout("None"), Ok(None));
    assert!(parse_timeout("").is_err());
    assert!(parse_timeout("10").is_err());
    assert!(parse_timeout("5d").is_err());
}

#[test]
fn oversized_timeouts_are_rejected() {
    let err = parse_timeout("307445734561825861m").unwrap_err();
    assert!(err.contains("too large"), "{err}");
    assert!(parse_timeout(&format!("{}h", u64::MAX / 60)).is_err());
    assert_eq!(
        parse_timeout(&format!("{}s", u64::MAX)),
        Ok(Some(Duration::from_secs(u64::MAX)))
    );
}
