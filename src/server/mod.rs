// src/server/mod.rs

//! Supervision of the local network process.

pub mod supervisor;

pub use supervisor::ProcessSupervisor;
