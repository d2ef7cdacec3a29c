//! Interactive editing session over a network snapshot.
//!
//! Maps gestures to model mutations and tracks transient UI-only state
//! (the current selection) that is never persisted. At most one node OR
//! one edge is selected at a time.

use tracing::debug;

use crate::interchange::NetworkInterchange;
use crate::model::{EdgePatch, EdgeSpec, Network, NodePatch, NodeSpec, RegulationType};
use regulon_common::Result;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(String),
    Edge(String),
}

#[derive(Debug, Clone)]
pub struct GraphEditor {
    network: Network,
    selection: Selection,
}

impl GraphEditor {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            selection: Selection::None,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    /// Selecting a node clears any edge selection. Unknown ids are ignored.
    pub fn select_node(&mut self, id: &str) -> bool {
        if self.network.has_node(id) {
            self.selection = Selection::Node(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn select_edge(&mut self, id: &str) -> bool {
        if self.network.edge(id).is_some() {
            self.selection = Selection::Edge(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    // ── Gestures ──────────────────────────────────────────────────────────────

    /// Connect gesture. Self-loops and unknown endpoints are dropped
    /// without surfacing an error (the model guard is never reached).
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        regulation_type: RegulationType,
    ) -> Option<&Network> {
        if source == target {
            debug!(source, "connect gesture rejected: self-loop");
            return None;
        }
        if !self.network.has_node(source) || !self.network.has_node(target) {
            debug!(source, target, "connect gesture rejected: unknown endpoint");
            return None;
        }
        let next = self
            .network
            .add_edge(EdgeSpec {
                source: source.to_string(),
                target: target.to_string(),
                regulation_type: Some(regulation_type),
                ..Default::default()
            })
            .ok()?;
        self.network = next;
        Some(&self.network)
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<&Network> {
        self.network = self.network.remove_edge(edge_id)?;
        self.reconcile_selection();
        Ok(&self.network)
    }

    pub fn add_node(&mut self, spec: NodeSpec) -> Result<&Network> {
        self.network = self.network.add_node(spec)?;
        Ok(&self.network)
    }

    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> Result<&Network> {
        self.network = self.network.update_node(id, patch)?;
        Ok(&self.network)
    }

    /// Cascading removal may also take out a selected edge; selection is
    /// reconciled afterwards either way.
    pub fn remove_node(&mut self, id: &str) -> Result<&Network> {
        self.network = self.network.remove_node(id)?;
        self.reconcile_selection();
        Ok(&self.network)
    }

    pub fn update_edge(&mut self, id: &str, patch: EdgePatch) -> Result<&Network> {
        self.network = self.network.update_edge(id, patch)?;
        Ok(&self.network)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<&Network> {
        self.disconnect(id)
    }

    /// Deletes whatever is selected. `Ok(None)` when nothing is.
    pub fn delete_selected(&mut self) -> Result<Option<&Network>> {
        match self.selection.clone() {
            Selection::None => Ok(None),
            Selection::Node(id) => {
                self.remove_node(&id)?;
                Ok(Some(&self.network))
            }
            Selection::Edge(id) => {
                self.remove_edge(&id)?;
                Ok(Some(&self.network))
            }
        }
    }

    fn reconcile_selection(&mut self) {
        let still_present = match &self.selection {
            Selection::None => true,
            Selection::Node(id) => self.network.has_node(id),
            Selection::Edge(id) => self.network.edge(id).is_some(),
        };
        if !still_present {
            self.selection = Selection::None;
        }
    }

    // ── Interchange ───────────────────────────────────────────────────────────

    pub fn export(&self) -> NetworkInterchange {
        NetworkInterchange::from_network(&self.network)
    }

    /// Fully replaces the current nodes/edges from a payload. Rejected
    /// wholesale (network untouched) when the payload has duplicate ids
    /// or dangling edges.
    pub fn import(&mut self, payload: NetworkInterchange) -> Result<&Network> {
        self.network = self
            .network
            .replace_topology(payload.nodes, payload.edges)?;
        self.selection = Selection::None;
        Ok(&self.network)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
