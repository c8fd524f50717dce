#![allow(dead_code)]

use std::error::Error;

use dfxdeploy_test_utils::builders::{manifest_json, workspace_path};
use dfxdeploy_test_utils::{FakeRunner, Harness, Response};

pub use dfxdeploy_test_utils::init_tracing;

pub type TestResult = Result<(), Box<dyn Error>>;

pub const PRINCIPAL: &str = "2vxsx-fae";
pub const ACCOUNT_ID: &str = "d4685b31b51450508aff0331584df7692a84467b680326f5c5f7d30ae711682f";
pub const WALLET_ID: &str = "gastn-uqaaa-aaaae-aaafq-cai";
pub const EXISTING_WALLET: &str = "rwlgt-iiaaa-aaaaa-aaaaa-cai";

/// Reply of `get_icp_xdr_conversion_rate` with 5 XDR per ICP.
pub const RATE_REPLY: &str = "(
  record {
    certificate = blob \"\\d9\\d9\\f7\";
    data = record {
      xdr_permyriad_per_icp = 50_000 : nat64;
      timestamp_seconds = 1_700_000_000 : nat64;
    };
    hash_tree = blob \"\\d9\";
  },
)
";

pub const CREATE_CANISTER_REPLY: &str = "Transfer sent at block height 4_242
Using transfer at block height 4_242
Canister created with id: \"gastn-uqaaa-aaaae-aaafq-cai\"
";

/// Script every read-only query of the mainnet pipeline.
///
/// The wallet is absent and the ledger holds `balance` ICP.
pub fn script_mainnet(runner: &FakeRunner, balance: &str) {
    runner
        .respond(
            &["identity", "get-wallet"],
            Response::fail(255, "Error: No wallet found for identity 'vscode-ext'."),
        )
        .respond(&["identity", "get-principal"], Response::ok(&format!("{PRINCIPAL}\n")))
        .respond(&["canister", "call"], Response::ok(RATE_REPLY))
        .respond(&["ledger", "balance"], Response::ok(&format!("{balance} ICP\n")))
        .respond(&["ledger", "account-id"], Response::ok(&format!("{ACCOUNT_ID}\n")))
        .respond(&["ledger", "create-canister"], Response::ok(CREATE_CANISTER_REPLY))
        .respond(&["wallet", "balance"], Response::ok("3.000 TC (trillion cycles).\n"));
}

/// Sample local manifest: UI tooling, one backend, one frontend.
pub fn local_manifest() -> String {
    manifest_json(
        "local",
        &[
            ("__Candid_UI", "be2us-64aaa-aaaaa-qaabq-cai"),
            ("hello_backend", "bkyz2-fmaaa-aaaaa-qaaaq-cai"),
            ("hello_frontend", "bd3sg-teaaa-aaaaa-qaaba-cai"),
        ],
    )
}

pub fn mainnet_manifest() -> String {
    manifest_json(
        "ic",
        &[
            ("hello_backend", "uxrrr-q7777-77774-qaaaq-cai"),
            ("hello_frontend", "u6s2n-gx777-77774-qaaba-cai"),
        ],
    )
}

/// Put both manifests where a successful deploy would leave them.
pub fn install_manifests(h: &Harness) {
    h.fs.add_file(workspace_path(".dfx/local/canister_ids.json"), local_manifest());
    h.fs.add_file(workspace_path("canister_ids.json"), mainnet_manifest());
}
