//! Network collection and its remote persistence bridge.
//!
//! Saves are optimistic, three-phase: apply locally, await the remote
//! call, commit the remote echo or roll back to the pre-save record.
//! Deletes are pessimistic (local removal only after remote
//! confirmation) because deletion is irreversible. Remote failures
//! never clear local data: the last-known snapshot stays visible with
//! a staleness flag and the error message surfaced alongside.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use regulon_api::NetworkService;
use regulon_common::{RegulonError, Result};
use regulon_graph::{EdgePatch, EdgeSpec, Network, NodePatch, NodeSpec};

#[derive(Debug, Default)]
struct NetworkState {
    networks: HashMap<String, Network>,
    last_error: Option<String>,
    stale: bool,
}

pub struct NetworkRepository {
    service: Arc<dyn NetworkService>,
    state: RwLock<NetworkState>,
}

impl NetworkRepository {
    pub fn new(service: Arc<dyn NetworkService>) -> Self {
        Self {
            service,
            state: RwLock::new(NetworkState::default()),
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Replace the local collection from the remote service. On failure
    /// the last-known snapshot is kept, marked stale, and the error
    /// propagates for the UI to surface.
    pub async fn refresh(&self) -> Result<Vec<Network>> {
        match self.service.list().await {
            Ok(list) => {
                let mut state = self.state.write().await;
                state.networks = list.iter().map(|n| (n.id.clone(), n.clone())).collect();
                state.stale = false;
                state.last_error = None;
                Ok(list)
            }
            Err(e) => Err(self.degrade(e).await),
        }
    }

    /// Read-through fetch of one network; updates the local record on
    /// success, degrades to stale on failure.
    pub async fn fetch(&self, id: &str) -> Result<Network> {
        match self.service.get(id).await {
            Ok(network) => {
                let mut state = self.state.write().await;
                state.networks.insert(network.id.clone(), network.clone());
                Ok(network)
            }
            Err(e) => Err(self.degrade(e).await),
        }
    }

    /// Last-known local snapshot of the collection.
    pub async fn list(&self) -> Vec<Network> {
        self.state.read().await.networks.values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<Network> {
        self.state.read().await.networks.get(id).cloned()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// True after a failed refresh/fetch: displayed data may be behind
    /// the remote service.
    pub async fn is_stale(&self) -> bool {
        self.state.read().await.stale
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Upsert. A draft with an empty id is a create (id assigned,
    /// `created_at` stamped); anything else updates in place. The
    /// record is applied locally before the remote call resolves and
    /// rolled back if the remote rejects it.
    pub async fn save(&self, mut network: Network) -> Result<Network> {
        let is_create = network.id.is_empty() || !self.state.read().await.networks.contains_key(&network.id);
        if network.id.is_empty() {
            network.id = Uuid::new_v4().to_string();
            network.created_at = chrono::Utc::now();
        }
        network.updated_at = chrono::Utc::now();

        // Phase 1: optimistic local apply, remembering the prior record.
        let prior = {
            let mut state = self.state.write().await;
            let prior = state.networks.get(&network.id).cloned();
            state.networks.insert(network.id.clone(), network.clone());
            prior
        };

        // Phase 2: remote call.
        let remote = if is_create {
            self.service.create(&network).await
        } else {
            self.service.update(&network).await
        };

        // Phase 3: commit the remote echo, or roll back.
        match remote {
            Ok(persisted) => {
                let mut state = self.state.write().await;
                state.networks.insert(persisted.id.clone(), persisted.clone());
                state.last_error = None;
                debug!(network_id = %persisted.id, create = is_create, "network saved");
                Ok(persisted)
            }
            Err(e) => {
                {
                    let mut state = self.state.write().await;
                    match prior {
                        Some(prev) => {
                            state.networks.insert(prev.id.clone(), prev);
                        }
                        None => {
                            state.networks.remove(&network.id);
                        }
                    }
                }
                warn!(network_id = %network.id, error = %e, "save rejected, rolled back");
                Err(self.degrade_keep_fresh(e).await)
            }
        }
    }

    /// Pessimistic: the local record goes away only after the remote
    /// confirms the delete.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if let Err(e) = self.service.delete(id).await {
            warn!(network_id = %id, error = %e, "delete rejected, record kept");
            return Err(self.degrade_keep_fresh(e).await);
        }
        self.state.write().await.networks.remove(id);
        Ok(())
    }

    // ── Node/edge convenience operations ─────────────────────────────────────
    //
    // Each runs the graph mutator on the addressed network and persists
    // the resulting snapshot through `save`. Model errors (dangling
    // reference, duplicate id, …) propagate untouched: they are caller
    // bugs, not remote conditions.

    pub async fn add_node(&self, network_id: &str, spec: NodeSpec) -> Result<Network> {
        let next = self.current(network_id).await?.add_node(spec)?;
        self.save(next).await
    }

    pub async fn update_node(&self, network_id: &str, id: &str, patch: NodePatch) -> Result<Network> {
        let next = self.current(network_id).await?.update_node(id, patch)?;
        self.save(next).await
    }

    pub async fn remove_node(&self, network_id: &str, id: &str) -> Result<Network> {
        let next = self.current(network_id).await?.remove_node(id)?;
        self.save(next).await
    }

    pub async fn add_edge(&self, network_id: &str, spec: EdgeSpec) -> Result<Network> {
        let next = self.current(network_id).await?.add_edge(spec)?;
        self.save(next).await
    }

    pub async fn update_edge(&self, network_id: &str, id: &str, patch: EdgePatch) -> Result<Network> {
        let next = self.current(network_id).await?.update_edge(id, patch)?;
        self.save(next).await
    }

    pub async fn remove_edge(&self, network_id: &str, id: &str) -> Result<Network> {
        let next = self.current(network_id).await?.remove_edge(id)?;
        self.save(next).await
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    async fn current(&self, network_id: &str) -> Result<Network> {
        self.get(network_id)
            .await
            .ok_or_else(|| RegulonError::NotFound(format!("network {network_id}")))
    }

    /// Record a remote failure and mark the collection stale.
    async fn degrade(&self, e: RegulonError) -> RegulonError {
        let mut state = self.state.write().await;
        state.stale = true;
        state.last_error = Some(e.to_string());
        e
    }

    /// Record a remote failure without marking reads stale (the local
    /// data was rolled back to a known-good snapshot).
    async fn degrade_keep_fresh(&self, e: RegulonError) -> RegulonError {
        self.state.write().await.last_error = Some(e.to_string());
        e
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
