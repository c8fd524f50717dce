#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dfxdeploy::config::{ConfigFile, RawConfigFile};
use dfxdeploy::engine::{Orchestrator, Session};
use dfxdeploy::fs::mock::MockFileSystem;
use dfxdeploy::notify::{Notification, NotificationSink};

use crate::fake_runner::FakeRunner;

/// Workspace root used by every harness; never touched on disk.
pub const WORKSPACE: &str = "/workspace";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn identity(mut self, name: &str) -> Self {
        self.config.config.identity = name.to_string();
        self
    }

    pub fn command_timeout(mut self, value: &str) -> Self {
        self.config.config.command_timeout = value.to_string();
        self
    }

    pub fn server_args(mut self, args: &[&str]) -> Self {
        self.config.server.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn cycles_per_canister(mut self, cycles: u64) -> Self {
        self.config.funding.cycles_per_canister = cycles;
        self
    }

    pub fn required_xdr_per_canister(mut self, xdr: f64) -> Self {
        self.config.funding.required_xdr_per_canister = xdr;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sink that keeps every notification for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn contains(&self, event: &Notification) -> bool {
        self.events.lock().unwrap().contains(event)
    }

    pub fn count_where(&self, pred: impl Fn(&Notification) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: Notification) {
        self.events.lock().unwrap().push(event);
    }
}

/// `dfx.json` declaring the named canisters.
pub fn project_json(canisters: &[&str]) -> String {
    let entries: Vec<String> = canisters
        .iter()
        .map(|name| {
            format!("\"{name}\": {{ \"type\": \"motoko\", \"main\": \"src/{name}/main.mo\" }}")
        })
        .collect();
    format!("{{ \"canisters\": {{ {} }} }}", entries.join(", "))
}

/// A `canister_ids.json` with one network key.
pub fn manifest_json(network: &str, entries: &[(&str, &str)]) -> String {
    let entries: Vec<String> = entries
        .iter()
        .map(|(name, id)| format!("\"{name}\": {{ \"{network}\": \"{id}\" }}"))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

pub fn workspace_path(relative: &str) -> PathBuf {
    Path::new(WORKSPACE).join(relative)
}

/// Orchestrator wired to a scripted runner, an in-memory filesystem and a
/// recording sink.
pub struct Harness {
    pub runner: FakeRunner,
    pub fs: MockFileSystem,
    pub sink: RecordingSink,
    pub orchestrator: Orchestrator,
}

impl Harness {
    /// Default config, and a `dfx.json` declaring `canisters`.
    pub fn new(canisters: &[&str]) -> Self {
        Self::with_config(ConfigFile::default(), canisters)
    }

    pub fn with_config(config: ConfigFile, canisters: &[&str]) -> Self {
        let runner = FakeRunner::new();
        let fs = MockFileSystem::new();
        let sink = RecordingSink::new();

        fs.add_file(workspace_path("dfx.json"), project_json(canisters));

        let session = Session::new(WORKSPACE, Arc::new(sink.clone()));
        let orchestrator = Orchestrator::new(
            session,
            config,
            Arc::new(runner.clone()),
            Arc::new(fs.clone()),
        );

        Self {
            runner,
            fs,
            sink,
            orchestrator,
        }
    }

    pub fn session(&self) -> Session {
        self.orchestrator.session().clone()
    }
}
