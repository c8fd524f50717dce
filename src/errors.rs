// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    /// An external command exited non-zero (or timed out).
    #[error("command `{command}` failed with exit code {code}: {stderr}")]
    Process {
        command: String,
        code: i32,
        stderr: String,
    },

    /// An expected token was missing or malformed in command output or a file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The flow was asked to do something its preconditions forbid.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("IO error on {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeployError {
    /// Message shown to the user on the notification channel.
    ///
    /// Process failures surface the captured stderr verbatim; everything else
    /// uses the `Display` rendering.
    pub fn user_message(&self) -> String {
        match self {
            DeployError::Process { stderr, .. } if !stderr.trim().is_empty() => stderr.clone(),
            other => other.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        DeployError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DeployError>;
