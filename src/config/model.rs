// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from `Dfxdeploy.toml`, before validation.
///
/// ```toml
/// [config]
/// dfx = "dfx"
/// identity = "vscode-ext"
/// command_timeout = "2m"
///
/// [server]
/// args = ["start", "--clean"]
///
/// [funding]
/// required_xdr_per_canister = 2.0
/// safety_margin = 0.01
///
/// [paths]
/// local_manifest = ".dfx/local/canister_ids.json"
///
/// [links]
/// local_gateway = "http://127.0.0.1:4943"
/// ```
///
/// Every section and field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub funding: FundingSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub links: LinksSection,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// `Default`, so timeouts are always parsed and the funding parameters sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub server: ServerSection,
    pub funding: FundingSection,
    pub paths: PathsSection,
    pub links: LinksSection,
    command_timeout: Option<Duration>,
    deploy_timeout: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        raw: RawConfigFile,
        command_timeout: Option<Duration>,
        deploy_timeout: Option<Duration>,
    ) -> Self {
        Self {
            config: raw.config,
            server: raw.server,
            funding: raw.funding,
            paths: raw.paths,
            links: raw.links,
            command_timeout,
            deploy_timeout,
        }
    }

    /// Timeout applied to every awaited command except `deploy`.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    /// Timeout applied to `deploy`, which compiles and installs code.
    pub fn deploy_timeout(&self) -> Option<Duration> {
        self.deploy_timeout
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile::new_unchecked(
            RawConfigFile::default(),
            Some(Duration::from_secs(120)),
            Some(Duration::from_secs(30 * 60)),
        )
    }
}

/// `[config]` section: how to reach the external CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Program name or path of the CLI.
    #[serde(default = "default_dfx")]
    pub dfx: String,

    /// Dedicated deployment identity, created on demand.
    #[serde(default = "default_identity")]
    pub identity: String,

    /// Value passed as `--network` for remote commands.
    #[serde(default = "default_mainnet_network")]
    pub mainnet_network: String,

    /// System canister answering `get_icp_xdr_conversion_rate`.
    #[serde(default = "default_rate_canister")]
    pub rate_canister: String,

    /// Duration string such as `"2m"`; `"none"` disables the timeout.
    #[serde(default = "default_command_timeout")]
    pub command_timeout: String,

    #[serde(default = "default_deploy_timeout")]
    pub deploy_timeout: String,
}

fn default_dfx() -> String {
    "dfx".to_string()
}

fn default_identity() -> String {
    "vscode-ext".to_string()
}

fn default_mainnet_network() -> String {
    "ic".to_string()
}

fn default_rate_canister() -> String {
    "rkp4c-7iaaa-aaaaa-aaaca-cai".to_string()
}

fn default_command_timeout() -> String {
    "2m".to_string()
}

fn default_deploy_timeout() -> String {
    "30m".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            dfx: default_dfx(),
            identity: default_identity(),
            mainnet_network: default_mainnet_network(),
            rate_canister: default_rate_canister(),
            command_timeout: default_command_timeout(),
            deploy_timeout: default_deploy_timeout(),
        }
    }
}

/// `[server]` section: the supervised local network process.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Arguments for the long-running network process. It must stay in the
    /// foreground so its exit can be observed.
    #[serde(default = "default_server_args")]
    pub args: Vec<String>,

    /// Arguments of the CLI's own shutdown command, issued before the tracked
    /// process is terminated.
    #[serde(default = "default_stop_args")]
    pub stop_args: Vec<String>,
}

fn default_server_args() -> Vec<String> {
    vec!["start".to_string(), "--clean".to_string()]
}

fn default_stop_args() -> Vec<String> {
    vec!["stop".to_string()]
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            args: default_server_args(),
            stop_args: default_stop_args(),
        }
    }
}

/// `[funding]` section: parameters of the wallet funding formula.
///
/// `required_icp = round2((required_xdr_per_canister * canisters
///     + network_fee_buffer + wallet_creation_buffer) / xdr_per_icp)
///     + safety_margin`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FundingSection {
    #[serde(default = "default_required_xdr_per_canister")]
    pub required_xdr_per_canister: f64,

    #[serde(default = "default_network_fee_buffer")]
    pub network_fee_buffer: f64,

    #[serde(default = "default_wallet_creation_buffer")]
    pub wallet_creation_buffer: f64,

    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,

    /// Left on the ledger account when funding the wallet.
    #[serde(default = "default_ledger_fee_reserve")]
    pub ledger_fee_reserve: f64,

    /// Passed to `deploy --with-cycles` on mainnet.
    #[serde(default = "default_cycles_per_canister")]
    pub cycles_per_canister: u64,
}

fn default_required_xdr_per_canister() -> f64 {
    2.0
}

fn default_network_fee_buffer() -> f64 {
    0.1
}

fn default_wallet_creation_buffer() -> f64 {
    0.5
}

fn default_safety_margin() -> f64 {
    0.01
}

fn default_ledger_fee_reserve() -> f64 {
    0.0001
}

fn default_cycles_per_canister() -> u64 {
    2_000_000_000_000
}

impl Default for FundingSection {
    fn default() -> Self {
        Self {
            required_xdr_per_canister: default_required_xdr_per_canister(),
            network_fee_buffer: default_network_fee_buffer(),
            wallet_creation_buffer: default_wallet_creation_buffer(),
            safety_margin: default_safety_margin(),
            ledger_fee_reserve: default_ledger_fee_reserve(),
            cycles_per_canister: default_cycles_per_canister(),
        }
    }
}

/// `[paths]` section, relative to the workspace root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_local_manifest")]
    pub local_manifest: String,

    #[serde(default = "default_mainnet_manifest")]
    pub mainnet_manifest: String,

    /// Project declaration file listing the canisters.
    #[serde(default = "default_project_file")]
    pub project_file: String,
}

fn default_local_manifest() -> String {
    ".dfx/local/canister_ids.json".to_string()
}

fn default_mainnet_manifest() -> String {
    "canister_ids.json".to_string()
}

fn default_project_file() -> String {
    "dfx.json".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            local_manifest: default_local_manifest(),
            mainnet_manifest: default_mainnet_manifest(),
            project_file: default_project_file(),
        }
    }
}

/// `[links]` section: how canister links are built for the UI.
#[derive(Debug, Clone, Deserialize)]
pub struct LinksSection {
    #[serde(default = "default_local_gateway")]
    pub local_gateway: String,

    /// Domain under which mainnet canisters are served (`<id>.<domain>`).
    #[serde(default = "default_mainnet_domain")]
    pub mainnet_domain: String,

    /// Name of the UI-tooling canister in the manifest.
    #[serde(default = "default_candid_ui_name")]
    pub candid_ui_name: String,

    /// UI-tooling canister used on mainnet, where the manifest has none.
    #[serde(default = "default_mainnet_candid_ui")]
    pub mainnet_candid_ui: String,
}

fn default_local_gateway() -> String {
    "http://127.0.0.1:4943".to_string()
}

fn default_mainnet_domain() -> String {
    "icp0.io".to_string()
}

fn default_candid_ui_name() -> String {
    "__Candid_UI".to_string()
}

fn default_mainnet_candid_ui() -> String {
    "a4gq6-oaaaa-aaaab-qaa4q-cai".to_string()
}

impl Default for LinksSection {
    fn default() -> Self {
        Self {
            local_gateway: default_local_gateway(),
            mainnet_domain: default_mainnet_domain(),
            candid_ui_name: default_candid_ui_name(),
            mainnet_candid_ui: default_mainnet_candid_ui(),
        }
    }
}
