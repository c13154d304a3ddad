use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::DecisionIdentity;

/// One event appended by the simulation backend to `/logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub agent: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    pub fn identity(&self) -> DecisionIdentity {
        DecisionIdentity::new(&self.timestamp, &self.agent, &self.action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub stock: f64,
    pub threshold: f64,
}

/// `/inventory` body: location name to stock level.
pub type InventoryMap = BTreeMap<String, InventoryLevel>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    #[serde(default)]
    pub truck: Option<String>,
    #[serde(default, rename = "from")]
    pub origin: Option<String>,
    #[serde(default, rename = "to")]
    pub destination: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisruptionRecord {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of `POST /fast-forward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastForwardRequest {
    pub n: u32,
}
