// src/deploy/project.rs

//! Reader for the project declaration file (`dfx.json`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{DeployError, Result};
use crate::fs::FileSystem;

#[derive(Debug, Deserialize)]
struct ProjectFile {
    canisters: BTreeMap<String, serde_json::Value>,
}

/// Number of canisters declared under `canisters` in the project file.
pub fn count_declared_canisters(fs: &dyn FileSystem, path: &Path) -> Result<usize> {
    let text = fs
        .read_to_string(path)
        .map_err(|e| DeployError::io(path, format!("{e:#}")))?;
    let project: ProjectFile = serde_json::from_str(&text)
        .map_err(|e| DeployError::Parse(format!("invalid project file {path:?}: {e}")))?;
    Ok(project.canisters.len())
}
