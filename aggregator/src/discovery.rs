//! Static discovery document describing the service and its entrypoints.

use crate::config::AgentConfig;
use crate::entrypoints::Catalog;
use serde::Serialize;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EntrypointInfo {
    pub name: String,
    pub description: String,
    /// `None` when the entrypoint is free
    pub price: Option<String>,
    pub invoke: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DiscoveryDocument {
    pub name: String,
    pub description: String,
    pub version: String,
    pub entrypoints: Vec<EntrypointInfo>,
}

impl DiscoveryDocument {
    pub fn new(agent: &AgentConfig, catalog: &Catalog) -> Self {
        DiscoveryDocument {
            name: agent.name.clone(),
            description: agent.description.clone(),
            version: agent.version.clone(),
            entrypoints: entrypoint_list(catalog),
        }
    }
}

pub fn invoke_path(name: &str) -> String {
    format!("/entrypoints/{name}/invoke")
}

pub fn entrypoint_list(catalog: &Catalog) -> Vec<EntrypointInfo> {
    catalog
        .entries()
        .map(|entry| EntrypointInfo {
            name: entry.entrypoint.name().to_string(),
            description: entry.entrypoint.description().to_string(),
            price: entry.price.clone(),
            invoke: invoke_path(entry.entrypoint.name()),
        })
        .collect()
}
