// src/deploy/manifest.rs

//! Canister-id manifest and its classification into UI links.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::LinksSection;
use crate::errors::{DeployError, Result};
use crate::fs::FileSystem;
use crate::types::Network;

/// Canister name → network name → canister id, as written by a deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanisterManifest(BTreeMap<String, BTreeMap<String, String>>);

impl CanisterManifest {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DeployError::Parse(format!("invalid canister manifest: {e}")))
    }

    /// Read and parse the manifest at `path`.
    pub fn read(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let text = fs
            .read_to_string(path)
            .map_err(|e| DeployError::io(path, format!("{e:#}")))?;
        Self::from_json(&text)
    }

    pub fn id_of(&self, canister: &str, network: &str) -> Option<&str> {
        self.0
            .get(canister)
            .and_then(|ids| ids.get(network))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Classify the entries deployed on `builder`'s network.
    ///
    /// - the UI-tooling entry provides the prefix for backend links;
    /// - names containing `frontend` are linked directly;
    /// - everything else is a backend, linked through the UI-tooling canister.
    ///
    /// Entries without an id on that network are skipped.
    pub fn classify(&self, builder: &LinkBuilder) -> CanisterLinks {
        let candid_ui = self
            .id_of(&builder.candid_ui_name, &builder.network_key)
            .map(str::to_string)
            .or_else(|| builder.fallback_candid_ui.clone());

        let mut links = CanisterLinks {
            candid_ui: candid_ui.clone(),
            ..CanisterLinks::default()
        };

        for (name, ids) in &self.0 {
            if *name == builder.candid_ui_name {
                continue;
            }
            let Some(id) = ids.get(&builder.network_key) else {
                continue;
            };

            if name.contains("frontend") {
                links.frontends.push(CanisterLink {
                    name: name.clone(),
                    id: id.clone(),
                    kind: CanisterKind::Frontend,
                    url: Some(builder.frontend_url(id)),
                });
            } else {
                links.backends.push(CanisterLink {
                    name: name.clone(),
                    id: id.clone(),
                    kind: CanisterKind::Backend,
                    url: candid_ui.as_deref().map(|ui| builder.backend_url(ui, id)),
                });
            }
        }

        links
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanisterKind {
    Frontend,
    Backend,
}

impl fmt::Display for CanisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanisterKind::Frontend => f.write_str("frontend"),
            CanisterKind::Backend => f.write_str("backend"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanisterLink {
    pub name: String,
    pub id: String,
    pub kind: CanisterKind,
    /// `None` for a backend when no UI-tooling canister is known.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanisterLinks {
    pub candid_ui: Option<String>,
    pub frontends: Vec<CanisterLink>,
    pub backends: Vec<CanisterLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkStyle {
    /// `<base>/?canisterId=<id>`, as served by the local replica.
    Gateway { base: String },
    /// `https://<id>.<domain>/`, as served by mainnet boundary nodes.
    Subdomain { domain: String },
}

/// Builds links for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    network_key: String,
    candid_ui_name: String,
    fallback_candid_ui: Option<String>,
    style: LinkStyle,
}

impl LinkBuilder {
    /// Links for the local replica, keyed `local` in the manifest.
    pub fn local(links: &LinksSection) -> Self {
        Self {
            network_key: "local".to_string(),
            candid_ui_name: links.candid_ui_name.clone(),
            fallback_candid_ui: None,
            style: LinkStyle::Gateway {
                base: links.local_gateway.trim_end_matches('/').to_string(),
            },
        }
    }

    /// Links for mainnet, keyed by the mainnet network name.
    pub fn mainnet(links: &LinksSection, network_name: &str) -> Self {
        Self {
            network_key: network_name.to_string(),
            candid_ui_name: links.candid_ui_name.clone(),
            fallback_candid_ui: Some(links.mainnet_candid_ui.clone()),
            style: LinkStyle::Subdomain {
                domain: links.mainnet_domain.clone(),
            },
        }
    }

    pub fn for_network(links: &LinksSection, network: Network, network_name: &str) -> Self {
        match network {
            Network::Local => Self::local(links),
            Network::Mainnet => Self::mainnet(links, network_name),
        }
    }

    pub fn network_key(&self) -> &str {
        &self.network_key
    }

    fn frontend_url(&self, id: &str) -> String {
        match &self.style {
            LinkStyle::Gateway { base } => format!("{base}/?canisterId={id}"),
            LinkStyle::Subdomain { domain } => format!("https://{id}.{domain}/"),
        }
    }

    fn backend_url(&self, candid_ui: &str, id: &str) -> String {
        match &self.style {
            LinkStyle::Gateway { base } => format!("{base}/?canisterId={candid_ui}&id={id}"),
            LinkStyle::Subdomain { domain } => format!("https://{candid_ui}.raw.{domain}/?id={id}"),
        }
    }
}
