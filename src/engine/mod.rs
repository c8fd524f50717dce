// src/engine/mod.rs

//! Orchestration layer.
//!
//! - [`session`] is the explicit context (workspace root + notification sink)
//!   handed to every component.
//! - [`orchestrator`] dispatches operator actions to the supervisor and the
//!   deploy pipeline.
//! - [`console`] keeps one orchestrator alive across commands read from a
//!   line-oriented input.

pub mod console;
pub mod orchestrator;
pub mod session;

pub use console::run_console;
pub use orchestrator::{ActionOutcome, Orchestrator};
pub use session::Session;
