//! Data model and mutation primitives for a single network.
//!
//! Nodes and edges reference each other by id (arena + index pattern),
//! never by direct reference. Every mutator takes `&self` and returns a
//! new `Network` snapshot so consumers can diff old/new state; the
//! central invariant is that no edge ever references a missing node,
//! enforced atomically inside each mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use regulon_common::{RegulonError, Result};

// ── Enums ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Grn,
    Pathway,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Grn     => "grn",
            NetworkType::Pathway => "pathway",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    Draft,
    Active,
    Archived,
}

impl NetworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkStatus::Draft    => "draft",
            NetworkStatus::Active   => "active",
            NetworkStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegulationType {
    #[default]
    Activation,
    Inhibition,
}

impl RegulationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegulationType::Activation => "activation",
            RegulationType::Inhibition => "inhibition",
        }
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A biological entity in the network (gene, receptor, …).
/// `kind` is an open vocabulary: transcription_factor, target_gene,
/// signaling, receptor, and whatever future datasets bring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: String,
    pub label: String,
    #[serde(default)]
    pub position: Position,
    /// Signed: positive means up-regulated, negative down-regulated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_level: Option<f64>,
}

/// A regulatory relationship between two nodes, referencing them by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub regulation_type: RegulationType,
    /// Interaction strength, domain-recommended range 0–5.
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    pub status: NetworkStatus,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Drafts & patches ──────────────────────────────────────────────────────────

/// Parameters for inserting a node. Id is generated when absent.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub id: Option<String>,
    pub kind: String,
    pub label: String,
    pub position: Position,
    pub expression_level: Option<f64>,
}

/// Parameters for inserting an edge. Id is generated when absent;
/// regulation type defaults to activation and weight to 1.0.
#[derive(Debug, Clone, Default)]
pub struct EdgeSpec {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub regulation_type: Option<RegulationType>,
    pub weight: Option<f64>,
    pub label: Option<String>,
}

/// Field merge for `update_node`. The id itself is immutable.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub kind: Option<String>,
    pub label: Option<String>,
    pub position: Option<Position>,
    pub expression_level: Option<f64>,
}

/// Field merge for `update_edge`. Endpoint changes are re-validated.
#[derive(Debug, Clone, Default)]
pub struct EdgePatch {
    pub source: Option<String>,
    pub target: Option<String>,
    pub regulation_type: Option<RegulationType>,
    pub weight: Option<f64>,
    pub label: Option<String>,
}

/// Derived counts, recomputed on every call to avoid staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub nodes: usize,
    pub edges: usize,
    pub activations: usize,
    pub inhibitions: usize,
}

// ── Mutation primitives ───────────────────────────────────────────────────────

impl Network {
    /// Empty draft network with a fresh id.
    pub fn new(name: impl Into<String>, network_type: NetworkType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            network_type,
            status: NetworkStatus::Draft,
            nodes: Vec::new(),
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    fn touched(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }

    pub fn add_node(&self, spec: NodeSpec) -> Result<Network> {
        let id = spec.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if self.has_node(&id) {
            return Err(RegulonError::DuplicateId(format!("node {id}")));
        }
        let mut next = self.clone();
        next.nodes.push(Node {
            id,
            kind: spec.kind,
            label: spec.label,
            position: spec.position,
            expression_level: spec.expression_level,
        });
        Ok(next.touched())
    }

    pub fn update_node(&self, id: &str, patch: NodePatch) -> Result<Network> {
        let mut next = self.clone();
        let node = next
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| RegulonError::NotFound(format!("node {id}")))?;
        if let Some(kind) = patch.kind {
            node.kind = kind;
        }
        if let Some(label) = patch.label {
            node.label = label;
        }
        if let Some(position) = patch.position {
            node.position = position;
        }
        if let Some(level) = patch.expression_level {
            node.expression_level = Some(level);
        }
        Ok(next.touched())
    }

    /// Removes the node and, atomically, every edge touching it.
    pub fn remove_node(&self, id: &str) -> Result<Network> {
        if !self.has_node(id) {
            return Err(RegulonError::NotFound(format!("node {id}")));
        }
        let mut next = self.clone();
        next.nodes.retain(|n| n.id != id);
        next.edges.retain(|e| e.source != id && e.target != id);
        Ok(next.touched())
    }

    pub fn add_edge(&self, spec: EdgeSpec) -> Result<Network> {
        for endpoint in [&spec.source, &spec.target] {
            if !self.has_node(endpoint) {
                return Err(RegulonError::DanglingReference(endpoint.clone()));
            }
        }
        let id = spec.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if self.edge(&id).is_some() {
            return Err(RegulonError::DuplicateId(format!("edge {id}")));
        }
        let mut next = self.clone();
        next.edges.push(Edge {
            id,
            source: spec.source,
            target: spec.target,
            regulation_type: spec.regulation_type.unwrap_or_default(),
            weight: spec.weight.unwrap_or(1.0),
            label: spec.label,
        });
        Ok(next.touched())
    }

    pub fn update_edge(&self, id: &str, patch: EdgePatch) -> Result<Network> {
        // Endpoint changes must keep referential integrity.
        for endpoint in [&patch.source, &patch.target].into_iter().flatten() {
            if !self.has_node(endpoint) {
                return Err(RegulonError::DanglingReference(endpoint.clone()));
            }
        }
        let mut next = self.clone();
        let edge = next
            .edges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| RegulonError::NotFound(format!("edge {id}")))?;
        if let Some(source) = patch.source {
            edge.source = source;
        }
        if let Some(target) = patch.target {
            edge.target = target;
        }
        if let Some(regulation_type) = patch.regulation_type {
            edge.regulation_type = regulation_type;
        }
        if let Some(weight) = patch.weight {
            edge.weight = weight;
        }
        if let Some(label) = patch.label {
            edge.label = Some(label);
        }
        Ok(next.touched())
    }

    pub fn remove_edge(&self, id: &str) -> Result<Network> {
        if self.edge(id).is_none() {
            return Err(RegulonError::NotFound(format!("edge {id}")));
        }
        let mut next = self.clone();
        next.edges.retain(|e| e.id != id);
        Ok(next.touched())
    }

    /// Wholesale topology replacement used by import. All-or-nothing:
    /// duplicate ids or a dangling edge reject the whole payload and
    /// leave `self` untouched.
    pub fn replace_topology(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Network> {
        let mut node_ids = std::collections::HashSet::new();
        for node in &nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(RegulonError::ImportValidation(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
        }
        let mut edge_ids = std::collections::HashSet::new();
        for edge in &edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(RegulonError::ImportValidation(format!(
                    "duplicate edge id {}",
                    edge.id
                )));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(RegulonError::ImportValidation(format!(
                        "edge {} references unknown node {}",
                        edge.id, endpoint
                    )));
                }
            }
        }
        let mut next = self.clone();
        next.nodes = nodes;
        next.edges = edges;
        Ok(next.touched())
    }

    pub fn stats(&self) -> NetworkStats {
        let activations = self
            .edges
            .iter()
            .filter(|e| e.regulation_type == RegulationType::Activation)
            .count();
        NetworkStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            activations,
            inhibitions: self.edges.len() - activations,
        }
    }

    /// Every edge endpoint resolves to a current node. Holds after every
    /// mutation; exercised directly by tests.
    pub fn integrity_ok(&self) -> bool {
        self.edges
            .iter()
            .all(|e| self.has_node(&e.source) && self.has_node(&e.target))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn network_with(nodes: &[&str]) -> Network {
        let mut net = Network::new("test", NetworkType::Grn);
        for id in nodes {
            net = net
                .add_node(NodeSpec {
                    id: Some(id.to_string()),
                    kind: "target_gene".to_string(),
                    label: id.to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
        net
    }

    #[test]
    fn test_create_and_connect_scenario() {
        let net = Network::new("demo", NetworkType::Grn);
        let net = net
            .add_node(NodeSpec {
                id: Some("n1".to_string()),
                kind: "target_gene".to_string(),
                label: "TP53".to_string(),
                ..Default::default()
            })
            .unwrap();
        let net = net
            .add_node(NodeSpec {
                id: Some("n2".to_string()),
                kind: "transcription_factor".to_string(),
                label: "MYC".to_string(),
                ..Default::default()
            })
            .unwrap();
        let net = net
            .add_edge(EdgeSpec {
                source: "n2".to_string(),
                target: "n1".to_string(),
                regulation_type: Some(RegulationType::Activation),
                ..Default::default()
            })
            .unwrap();

        let stats = net.stats();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.activations, 1);
        assert_eq!(stats.inhibitions, 0);
    }

    #[test]
    fn test_cascading_delete_scenario() {
        let net = network_with(&["n1", "n2"]);
        let net = net
            .add_edge(EdgeSpec {
                source: "n2".to_string(),
                target: "n1".to_string(),
                ..Default::default()
            })
            .unwrap();
        let net = net.remove_node("n1").unwrap();
        assert_eq!(net.nodes.len(), 1);
        assert_eq!(net.edges.len(), 0);
        assert!(net.integrity_ok());
    }

    #[test]
    fn test_cascade_removes_exactly_incident_edges() {
        let net = network_with(&["a", "b", "c"]);
        let net = net
            .add_edge(EdgeSpec {
                id: Some("ab".to_string()),
                source: "a".to_string(),
                target: "b".to_string(),
                ..Default::default()
            })
            .unwrap()
            .add_edge(EdgeSpec {
                id: Some("bc".to_string()),
                source: "b".to_string(),
                target: "c".to_string(),
                ..Default::default()
            })
            .unwrap()
            .add_edge(EdgeSpec {
                id: Some("ca".to_string()),
                source: "c".to_string(),
                target: "a".to_string(),
                ..Default::default()
            })
            .unwrap();

        let net = net.remove_node("b").unwrap();
        assert_eq!(net.edges.len(), 1);
        assert!(net.edge("ca").is_some());
        assert!(net.integrity_ok());
    }

    #[test]
    fn test_add_edge_with_unknown_endpoint_never_mutates() {
        let net = network_with(&["n1"]);
        let before = net.clone();
        let err = net
            .add_edge(EdgeSpec {
                source: "n1".to_string(),
                target: "ghost".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, RegulonError::DanglingReference(ref id) if id == "ghost"));
        assert_eq!(net, before);
    }

    #[test]
    fn test_duplicate_node_id_rejected() {
        let net = network_with(&["n1"]);
        let err = net
            .add_node(NodeSpec {
                id: Some("n1".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, RegulonError::DuplicateId(_)));
    }

    #[test]
    fn test_add_node_generates_id_when_absent() {
        let net = network_with(&[]);
        let net = net
            .add_node(NodeSpec {
                kind: "receptor".to_string(),
                label: "EGFR".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert!(!net.nodes[0].id.is_empty());
    }

    #[test]
    fn test_edge_defaults() {
        let net = network_with(&["n1", "n2"]);
        let net = net
            .add_edge(EdgeSpec {
                source: "n1".to_string(),
                target: "n2".to_string(),
                ..Default::default()
            })
            .unwrap();
        let edge = &net.edges[0];
        assert_eq!(edge.regulation_type, RegulationType::Activation);
        assert_eq!(edge.weight, 1.0);
    }

    #[test]
    fn test_update_edge_revalidates_endpoints() {
        let net = network_with(&["n1", "n2"]);
        let net = net
            .add_edge(EdgeSpec {
                id: Some("e1".to_string()),
                source: "n1".to_string(),
                target: "n2".to_string(),
                ..Default::default()
            })
            .unwrap();
        let err = net
            .update_edge(
                "e1",
                EdgePatch {
                    target: Some("ghost".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RegulonError::DanglingReference(_)));
        assert!(net.integrity_ok());
    }

    #[test]
    fn test_update_node_merges_and_rejects_unknown() {
        let net = network_with(&["n1"]);
        let net = net
            .update_node(
                "n1",
                NodePatch {
                    label: Some("BRCA1".to_string()),
                    expression_level: Some(-1.5),
                    ..Default::default()
                },
            )
            .unwrap();
        let node = net.node("n1").unwrap();
        assert_eq!(node.label, "BRCA1");
        assert_eq!(node.expression_level, Some(-1.5));
        assert_eq!(node.kind, "target_gene"); // untouched field survives

        assert!(matches!(
            net.update_node("ghost", NodePatch::default()),
            Err(RegulonError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_unknown_is_an_error() {
        let net = network_with(&["n1"]);
        assert!(matches!(
            net.remove_node("ghost"),
            Err(RegulonError::NotFound(_))
        ));
        assert!(matches!(
            net.remove_edge("ghost"),
            Err(RegulonError::NotFound(_))
        ));
    }

    #[test]
    fn test_integrity_holds_across_mutation_sequence() {
        let mut net = network_with(&["a", "b", "c", "d"]);
        let ops: &[(&str, &str)] = &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a"), ("a", "c")];
        for (s, t) in ops {
            net = net
                .add_edge(EdgeSpec {
                    source: s.to_string(),
                    target: t.to_string(),
                    ..Default::default()
                })
                .unwrap();
            assert!(net.integrity_ok());
        }
        for id in ["a", "c"] {
            net = net.remove_node(id).unwrap();
            assert!(net.integrity_ok());
        }
        assert_eq!(net.nodes.len(), 2);
    }

    #[test]
    fn test_mutation_refreshes_updated_at() {
        let net = network_with(&[]);
        let before = net.updated_at;
        let net = net
            .add_node(NodeSpec {
                id: Some("n1".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(net.updated_at >= before);
        assert!(net.updated_at >= net.created_at);
    }

    #[test]
    fn test_stats_counts_by_regulation_type() {
        let net = network_with(&["a", "b", "c"]);
        let net = net
            .add_edge(EdgeSpec {
                source: "a".to_string(),
                target: "b".to_string(),
                regulation_type: Some(RegulationType::Inhibition),
                ..Default::default()
            })
            .unwrap()
            .add_edge(EdgeSpec {
                source: "b".to_string(),
                target: "c".to_string(),
                ..Default::default()
            })
            .unwrap();
        let stats = net.stats();
        assert_eq!(stats.activations, 1);
        assert_eq!(stats.inhibitions, 1);
    }
}
