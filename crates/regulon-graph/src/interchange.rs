//! Graph export/import payload.
//!
//! Self-contained JSON object `{networkId, networkName, nodes, edges}`.
//! A round-trip through export + import reproduces an equivalent
//! topology (node/edge sets equal up to ordering).

use serde::{Deserialize, Serialize};

use crate::model::{Edge, Network, Node};
use regulon_common::{RegulonError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterchange {
    pub network_id: String,
    pub network_name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl NetworkInterchange {
    pub fn from_network(network: &Network) -> Self {
        Self {
            network_id: network.id.clone(),
            network_name: network.name.clone(),
            nodes: network.nodes.clone(),
            edges: network.edges.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Malformed JSON is an import rejection, not a programming error.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| RegulonError::ImportValidation(format!("malformed payload: {e}")))
    }
}
