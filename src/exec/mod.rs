// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the external CLI, using
//! `tokio::process::Command`.
//!
//! - [`command`] holds the value types: `CommandSpec`, `CommandResult`,
//!   `ProcessEvent`, `ExitReport`.
//! - [`task`] provides `TaskHandle`, the cancellable, awaitable wrapper both
//!   execution modes share.
//! - [`runner`] provides the `CommandRunner` trait and a concrete
//!   `RealCommandRunner`, which tests replace with a scripted fake.
//! - [`dfx`] builds argument vectors against the workspace root.

pub mod command;
pub mod dfx;
pub mod runner;
pub mod task;

pub use command::{CommandResult, CommandSpec, ExitReport, ProcessEvent};
pub use dfx::DfxCli;
pub use runner::{run_checked, CommandRunner, RealCommandRunner};
pub use task::TaskHandle;
