//! Mapping of the node's diagnostics document into dashboard facts.
//!
//! The document types below cover only the fields the dashboard shows. Every
//! field defaults to zero when the node omits it, so older or partially
//! initialised nodes still produce a full set of facts. Counts are signed and
//! passed through as reported.

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::node::NodeApi;

/// Subset of `GET /status/diagnostics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSnapshot {
    pub network: NetworkInfo,
    pub vdr: VdrInfo,
    pub vcr: VcrInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkInfo {
    pub connections: ConnectionsInfo,
    pub state: NetworkStateInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionsInfo {
    pub connected_peers_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkStateInfo {
    pub transaction_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VdrInfo {
    pub did_documents_count: i64,
    pub conflicted_did_documents_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VcrInfo {
    pub credential_count: i64,
}

/// A named quantity shown as one tile on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub unit: String,
    pub value: i64,
}

impl Fact {
    fn new(unit: &str, value: i64) -> Self {
        Self {
            unit: unit.to_string(),
            value,
        }
    }
}

impl DiagnosticsSnapshot {
    /// Facts in display order. The frontend relies on this order.
    pub fn facts(&self) -> Vec<Fact> {
        vec![
            Fact::new("nodes", self.network.connections.connected_peers_count),
            Fact::new("TXs", self.network.state.transaction_count),
            Fact::new("DID documents", self.vdr.did_documents_count),
            Fact::new(
                "DID document conflicts",
                self.vdr.conflicted_did_documents_count,
            ),
            Fact::new("Verifiable Credentials", self.vcr.credential_count),
        ]
    }
}

/// Fetch the diagnostics document and map it into facts.
pub async fn fetch_facts<N: NodeApi>(node: &N) -> Result<Vec<Fact>, DashboardError> {
    let snapshot = node.diagnostics().await?;
    Ok(snapshot.facts())
}
