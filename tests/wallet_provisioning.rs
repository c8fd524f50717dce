mod common;

use std::sync::Arc;

use common::{TestResult, ACCOUNT_ID, EXISTING_WALLET, PRINCIPAL, WALLET_ID};
use dfxdeploy::config::FundingSection;
use dfxdeploy::deploy::{
    ExchangeRateOracle, IdentityManager, Ledger, ProvisionOutcome, ProvisionState,
    WalletProvisioner,
};
use dfxdeploy::errors::DeployError;
use dfxdeploy::exec::{CommandRunner, DfxCli};
use dfxdeploy::notify::Notification;
use dfxdeploy::types::BalanceKind;
use dfxdeploy_test_utils::builders::{workspace_path, WORKSPACE};
use dfxdeploy_test_utils::{Harness, Response};

fn provisioner(h: &Harness) -> WalletProvisioner {
    let runner: Arc<dyn CommandRunner> = Arc::new(h.runner.clone());
    let dfx = DfxCli::new("dfx", WORKSPACE);
    WalletProvisioner::new(
        h.session(),
        IdentityManager::new(runner.clone(), dfx.clone()),
        Ledger::new(runner.clone(), dfx.clone()),
        ExchangeRateOracle::new(runner, dfx, "rkp4c-7iaaa-aaaaa-aaaca-cai"),
        Arc::new(h.fs.clone()),
        workspace_path("dfx.json"),
        FundingSection::default(),
    )
}

#[tokio::test]
async fn existing_wallet_is_returned_unchanged() -> TestResult {
    common::init_tracing();
    let h = Harness::new(&["hello_backend"]);
    h.runner.respond(
        &["identity", "get-wallet"],
        Response::ok(&format!("{EXISTING_WALLET}\n")),
    );

    let report = provisioner(&h).provision().await?;

    assert_eq!(report.path, [ProvisionState::CheckWallet, ProvisionState::Done]);
    match report.outcome {
        ProvisionOutcome::Ready(wallet) => {
            assert_eq!(wallet.canister_id(), EXISTING_WALLET);
            assert_eq!(wallet.owner(), None);
        }
        other => panic!("expected ready wallet, got {other:?}"),
    }
    assert!(!h.runner.was_called(&["identity", "get-principal"]));
    assert!(!h.runner.was_called(&["ledger"]));
    Ok(())
}

#[tokio::test]
async fn low_balance_waits_for_funds() -> TestResult {
    common::init_tracing();
    let h = Harness::new(&["a", "b", "c"]);
    common::script_mainnet(&h.runner, "1.00000000");

    let report = provisioner(&h).provision().await?;

    assert_eq!(
        report.path,
        [
            ProvisionState::CheckWallet,
            ProvisionState::ResolveOwner,
            ProvisionState::FetchRate,
            ProvisionState::ComputeRequired,
            ProvisionState::CheckBalance,
            ProvisionState::AwaitFunds,
        ]
    );
    let ProvisionOutcome::AwaitingFunds { plan, address } = report.outcome else {
        panic!("expected to wait for funds");
    };
    assert!((plan.required_icp - 1.33).abs() < 1e-9);
    assert!(!plan.sufficient);
    assert_eq!(address, ACCOUNT_ID);

    let events = h.sink.events();
    assert!(events.contains(&Notification::AccountIdReady(ACCOUNT_ID.to_string())));
    assert!(events.contains(&Notification::BalanceUpdated {
        kind: BalanceKind::Icp,
        value: "1.00000000".to_string(),
    }));
    let funding_required = events.iter().find_map(|e| match e {
        Notification::FundingRequired { amount, address } => Some((*amount, address.clone())),
        _ => None,
    });
    let (amount, to) = funding_required.expect("fundingRequired emitted");
    assert!((amount - 1.33).abs() < 1e-9);
    assert_eq!(to, ACCOUNT_ID);

    assert!(!h.runner.was_called(&["ledger", "create-canister"]));
    assert!(!h.runner.was_called(&["identity", "deploy-wallet"]));
    Ok(())
}

#[tokio::test]
async fn sufficient_balance_creates_and_registers_the_wallet() -> TestResult {
    common::init_tracing();
    let h = Harness::new(&["a", "b", "c"]);
    common::script_mainnet(&h.runner, "5.00000000");

    let report = provisioner(&h).provision().await?;

    assert_eq!(
        report.path.last(),
        Some(&ProvisionState::Done)
    );
    assert!(report.path.contains(&ProvisionState::CreateWallet));
    match report.outcome {
        ProvisionOutcome::Ready(wallet) => {
            assert_eq!(wallet.canister_id(), WALLET_ID);
            assert_eq!(wallet.owner(), Some(PRINCIPAL));
        }
        other => panic!("expected ready wallet, got {other:?}"),
    }

    let calls = h.runner.calls();
    let create = calls
        .iter()
        .find(|c| c.starts_with(&["ledger", "create-canister"]))
        .expect("create-canister issued");
    assert_eq!(
        create.args,
        [
            "ledger",
            "create-canister",
            PRINCIPAL,
            "--amount",
            "4.99990000",
            "--network",
            "ic"
        ]
    );
    assert!(h.runner.was_called(&["identity", "deploy-wallet", WALLET_ID]));
    Ok(())
}

#[tokio::test]
async fn unparsable_create_output_stops_before_deploy_wallet() {
    let h = Harness::new(&["a"]);
    common::script_mainnet(&h.runner, "5.00000000");
    h.runner.respond(
        &["ledger", "create-canister"],
        Response::ok("Transfer sent at block height 4_242\n"),
    );

    let result = provisioner(&h).provision().await;

    assert!(matches!(result, Err(DeployError::Parse(_))), "{result:?}");
    assert!(h.runner.was_called(&["ledger", "create-canister"]));
    assert!(!h.runner.was_called(&["identity", "deploy-wallet"]));
}

#[tokio::test]
async fn principal_failure_is_a_precondition_error() {
    let h = Harness::new(&["a"]);
    common::script_mainnet(&h.runner, "5.00000000");
    h.runner.respond(
        &["identity", "get-principal"],
        Response::fail(255, "Error: identity is locked\n"),
    );

    let result = provisioner(&h).provision().await;

    assert!(matches!(result, Err(DeployError::Precondition(_))), "{result:?}");
    assert!(!h.runner.was_called(&["canister", "call"]));
}

#[tokio::test]
async fn failed_rate_query_aborts_the_chain() {
    let h = Harness::new(&["a"]);
    common::script_mainnet(&h.runner, "5.00000000");
    h.runner.respond(
        &["canister", "call"],
        Response::fail(1, "Error: replica unreachable\n"),
    );

    let result = provisioner(&h).provision().await;

    assert!(matches!(result, Err(DeployError::Process { .. })), "{result:?}");
    assert!(!h.runner.was_called(&["ledger", "balance"]));
}

#[tokio::test]
async fn retry_restarts_from_wallet_check() -> TestResult {
    let h = Harness::new(&["a", "b", "c"]);
    common::script_mainnet(&h.runner, "5.00000000");
    h.runner
        .respond_once(&["ledger", "balance"], Response::ok("1.00000000 ICP\n"));
    let provisioner = provisioner(&h);

    let first = provisioner.provision().await?;
    assert!(matches!(first.outcome, ProvisionOutcome::AwaitingFunds { .. }));

    let second = provisioner.provision().await?;
    assert_eq!(second.path.first(), Some(&ProvisionState::CheckWallet));
    assert!(matches!(second.outcome, ProvisionOutcome::Ready(_)));

    // The rate is fetched again; nothing is cached between runs.
    assert_eq!(h.runner.count(&["canister", "call"]), 2);
    Ok(())
}
