//! In-memory service fakes for repository tests.
//!
//! Failures are scripted (`fail_reads`, `fail_next_write`) and reads
//! can be held open (`hold_reads`) to exercise the in-flight poll
//! guard. Only compiled for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::sync::watch;

use regulon_api::{NetworkService, RemoteWorkflowStatus, WorkflowService};
use regulon_common::{RegulonError, Result};
use regulon_graph::Network;
use regulon_workflow::Workflow;

fn remote_down() -> RegulonError {
    RegulonError::RemoteRequest("HTTP 503: service unavailable".to_string())
}

// ── Networks ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct NetworkInner {
    networks: HashMap<String, Network>,
    fail_reads: bool,
    fail_next_write: bool,
}

#[derive(Default)]
pub struct FakeNetworkService {
    inner: StdMutex<NetworkInner>,
}

impl FakeNetworkService {
    pub async fn stored(&self, id: &str) -> Option<Network> {
        self.inner.lock().unwrap().networks.get(id).cloned()
    }

    pub async fn fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    pub async fn fail_next_write(&self) {
        self.inner.lock().unwrap().fail_next_write = true;
    }

    fn take_write_failure(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.fail_next_write)
    }
}

#[async_trait]
impl NetworkService for FakeNetworkService {
    async fn list(&self) -> Result<Vec<Network>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(remote_down());
        }
        Ok(inner.networks.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Network> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(remote_down());
        }
        inner
            .networks
            .get(id)
            .cloned()
            .ok_or_else(|| RegulonError::RemoteRequest(format!("HTTP 404: network {id}")))
    }

    async fn create(&self, network: &Network) -> Result<Network> {
        if self.take_write_failure() {
            return Err(remote_down());
        }
        self.inner
            .lock()
            .unwrap()
            .networks
            .insert(network.id.clone(), network.clone());
        Ok(network.clone())
    }

    async fn update(&self, network: &Network) -> Result<Network> {
        self.create(network).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.take_write_failure() {
            return Err(remote_down());
        }
        self.inner.lock().unwrap().networks.remove(id);
        Ok(())
    }
}

// ── Workflows ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct WorkflowInner {
    workflows: HashMap<String, Workflow>,
    statuses: HashMap<String, RemoteWorkflowStatus>,
    cancel_requests: HashSet<String>,
    start_requests: HashSet<String>,
    fail_reads: bool,
    fail_next_write: bool,
}

pub struct FakeWorkflowService {
    inner: StdMutex<WorkflowInner>,
    gate_tx: watch::Sender<bool>,
    gate_rx: watch::Receiver<bool>,
}

impl Default for FakeWorkflowService {
    fn default() -> Self {
        let (gate_tx, gate_rx) = watch::channel(false);
        Self {
            inner: StdMutex::new(WorkflowInner::default()),
            gate_tx,
            gate_rx,
        }
    }
}

impl FakeWorkflowService {
    pub async fn seed(&self, workflow: Workflow) {
        self.inner
            .lock()
            .unwrap()
            .workflows
            .insert(workflow.id.clone(), workflow);
    }

    pub async fn set_status(
        &self,
        id: &str,
        status: regulon_workflow::WorkflowStatus,
        progress: f32,
        error: Option<String>,
        results_ref: Option<String>,
    ) {
        self.inner.lock().unwrap().statuses.insert(
            id.to_string(),
            RemoteWorkflowStatus {
                status,
                progress,
                error,
                results_ref,
            },
        );
    }

    pub async fn created(&self, id: &str) -> bool {
        self.inner.lock().unwrap().workflows.contains_key(id)
    }

    pub async fn cancel_requested(&self, id: &str) -> bool {
        self.inner.lock().unwrap().cancel_requests.contains(id)
    }

    pub async fn start_requested(&self, id: &str) -> bool {
        self.inner.lock().unwrap().start_requests.contains(id)
    }

    pub async fn fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    pub async fn fail_next_write(&self) {
        self.inner.lock().unwrap().fail_next_write = true;
    }

    pub async fn hold_reads(&self) {
        let _ = self.gate_tx.send(true);
    }

    pub async fn release_reads(&self) {
        let _ = self.gate_tx.send(false);
    }

    async fn wait_until_open(&self) {
        let mut rx = self.gate_rx.clone();
        while *rx.borrow_and_update() {
            let _ = rx.changed().await;
        }
    }

    fn take_write_failure(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.fail_next_write)
    }
}

#[async_trait]
impl WorkflowService for FakeWorkflowService {
    async fn list(&self) -> Result<Vec<Workflow>> {
        self.wait_until_open().await;
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(remote_down());
        }
        Ok(inner.workflows.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Workflow> {
        self.wait_until_open().await;
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(remote_down());
        }
        inner
            .workflows
            .get(id)
            .cloned()
            .ok_or_else(|| RegulonError::RemoteRequest(format!("HTTP 404: workflow {id}")))
    }

    async fn create(&self, workflow: &Workflow) -> Result<Workflow> {
        if self.take_write_failure() {
            return Err(remote_down());
        }
        self.inner
            .lock()
            .unwrap()
            .workflows
            .insert(workflow.id.clone(), workflow.clone());
        Ok(workflow.clone())
    }

    async fn status(&self, id: &str) -> Result<RemoteWorkflowStatus> {
        self.wait_until_open().await;
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(remote_down());
        }
        if let Some(status) = inner.statuses.get(id) {
            return Ok(status.clone());
        }
        // No scripted status: report whatever the stored record says.
        inner
            .workflows
            .get(id)
            .map(|wf| RemoteWorkflowStatus {
                status: wf.status,
                progress: wf.progress,
                error: wf.error.clone(),
                results_ref: wf.results_ref.clone(),
            })
            .ok_or_else(|| RegulonError::RemoteRequest(format!("HTTP 404: workflow {id}")))
    }

    async fn results(&self, id: &str) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "workflowId": id }))
    }

    async fn cancel(&self, id: &str) -> Result<()> {
        if self.take_write_failure() {
            return Err(remote_down());
        }
        self.inner
            .lock()
            .unwrap()
            .cancel_requests
            .insert(id.to_string());
        Ok(())
    }

    async fn start(&self, id: &str) -> Result<()> {
        if self.take_write_failure() {
            return Err(remote_down());
        }
        self.inner
            .lock()
            .unwrap()
            .start_requests
            .insert(id.to_string());
        Ok(())
    }
}
