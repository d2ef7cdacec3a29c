//! Network graph model for Regulon.
//!
//! `model` holds the data types and pure mutation primitives (every
//! mutator returns a fresh snapshot and can never produce a dangling
//! edge). `editor` wraps a snapshot with transient selection state for
//! an interactive session, and `interchange` is the export/import
//! payload shared with other tools.

pub mod editor;
pub mod interchange;
pub mod model;

pub use editor::{GraphEditor, Selection};
pub use interchange::NetworkInterchange;
pub use model::{
    Edge, EdgePatch, EdgeSpec, Network, NetworkStats, NetworkStatus, NetworkType, Node, NodePatch,
    NodeSpec, Position, RegulationType,
};
