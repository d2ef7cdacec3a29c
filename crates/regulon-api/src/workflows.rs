//! Workflow execution contract.
//!
//! The result schema is opaque to this core: `results` hands back raw
//! JSON and `results_ref` stays an uninterpreted handle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use regulon_common::Result;
use regulon_workflow::{Workflow, WorkflowStatus};

/// Snapshot reported by `GET /workflows/{id}/status`. Authoritative
/// during reconciliation: a remote-reported terminal state always wins
/// over local optimistic state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteWorkflowStatus {
    pub status: WorkflowStatus,
    #[serde(default)]
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_ref: Option<String>,
}

#[async_trait]
pub trait WorkflowService: Send + Sync {
    async fn list(&self) -> Result<Vec<Workflow>>;
    async fn get(&self, id: &str) -> Result<Workflow>;
    async fn create(&self, workflow: &Workflow) -> Result<Workflow>;
    async fn status(&self, id: &str) -> Result<RemoteWorkflowStatus>;
    async fn results(&self, id: &str) -> Result<serde_json::Value>;
    /// Requests cancellation. A 2xx acknowledges the request only; the
    /// workflow is cancelled once `status` reports it terminal.
    async fn cancel(&self, id: &str) -> Result<()>;
    /// Starts (or restarts after retry) remote execution.
    async fn start(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct RemoteWorkflowService {
    client: ApiClient,
}

impl RemoteWorkflowService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkflowService for RemoteWorkflowService {
    async fn list(&self) -> Result<Vec<Workflow>> {
        self.client.get_json("workflows").await
    }

    async fn get(&self, id: &str) -> Result<Workflow> {
        self.client.get_json(&format!("workflows/{id}")).await
    }

    async fn create(&self, workflow: &Workflow) -> Result<Workflow> {
        self.client.post_json("workflows", workflow).await
    }

    async fn status(&self, id: &str) -> Result<RemoteWorkflowStatus> {
        self.client.get_json(&format!("workflows/{id}/status")).await
    }

    async fn results(&self, id: &str) -> Result<serde_json::Value> {
        self.client.get_json(&format!("workflows/{id}/results")).await
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        self.client.post_empty(&format!("workflows/{id}/cancel")).await
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.client.post_empty(&format!("workflows/{id}/start")).await
    }
}
