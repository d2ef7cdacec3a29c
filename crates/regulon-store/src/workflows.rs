//! Workflow collection and remote reconciliation.
//!
//! The remote service is the authority on workflow status. `poll()`
//! fetches the status of every non-terminal workflow and applies it
//! through the lifecycle state machine; a user-initiated cancel or
//! retry raises a per-workflow pending-action flag that suppresses
//! concurrently arriving poll results for that id until the user's
//! request resolves. Poll cycles never stack: a cycle that finds one
//! already in flight is skipped, not queued.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use regulon_api::{RemoteWorkflowStatus, WorkflowService};
use regulon_common::{RegulonError, Result};
use regulon_workflow::{Workflow, WorkflowFilter, WorkflowStatus, WorkflowType};

/// Parameters for creating a workflow.
#[derive(Debug, Clone)]
pub struct WorkflowSpec {
    pub name: String,
    pub workflow_type: WorkflowType,
    /// Reference only: the workflow never owns the network.
    pub network_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    Cancel,
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A previous cycle was still in flight; this one was dropped.
    Skipped,
    Completed { updated: usize },
}

#[derive(Default)]
struct WorkflowState {
    workflows: HashMap<String, Workflow>,
    pending: HashMap<String, PendingAction>,
    last_error: Option<String>,
    stale: bool,
}

pub struct WorkflowRepository {
    service: Arc<dyn WorkflowService>,
    state: RwLock<WorkflowState>,
    poll_in_flight: AtomicBool,
    cancel_timeout: Duration,
    confirm_interval: Duration,
}

impl WorkflowRepository {
    pub fn new(
        service: Arc<dyn WorkflowService>,
        cancel_timeout: Duration,
        confirm_interval: Duration,
    ) -> Self {
        Self {
            service,
            state: RwLock::new(WorkflowState::default()),
            poll_in_flight: AtomicBool::new(false),
            cancel_timeout,
            confirm_interval,
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Replace the local collection from the remote service. Records
    /// with a pending user action keep their local version.
    pub async fn refresh(&self) -> Result<Vec<Workflow>> {
        match self.service.list().await {
            Ok(list) => {
                let mut state = self.state.write().await;
                for wf in list {
                    if !state.pending.contains_key(&wf.id) {
                        state.workflows.insert(wf.id.clone(), wf);
                    }
                }
                state.stale = false;
                state.last_error = None;
                Ok(state.workflows.values().cloned().collect())
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.stale = true;
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn list(&self) -> Vec<Workflow> {
        self.state.read().await.workflows.values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<Workflow> {
        self.state.read().await.workflows.get(id).cloned()
    }

    pub async fn running(&self) -> Vec<Workflow> {
        self.by_status(WorkflowStatus::Running).await
    }

    pub async fn by_status(&self, status: WorkflowStatus) -> Vec<Workflow> {
        self.state
            .read()
            .await
            .workflows
            .values()
            .filter(|wf| wf.status == status)
            .cloned()
            .collect()
    }

    pub async fn filtered(&self, filter: &WorkflowFilter) -> Vec<Workflow> {
        let list = self.list().await;
        filter.apply(&list)
    }

    /// Intermediate "cancelling" condition: still `running`, but a
    /// cancel request is awaiting remote confirmation.
    pub async fn is_cancelling(&self, id: &str) -> bool {
        self.state.read().await.pending.get(id) == Some(&PendingAction::Cancel)
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// True after a failed poll/refresh: displayed statuses may be behind.
    pub async fn is_stale(&self) -> bool {
        self.state.read().await.stale
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    pub async fn create(&self, spec: WorkflowSpec) -> Result<Workflow> {
        if spec.name.trim().is_empty() {
            return Err(RegulonError::Validation("workflow name must not be empty".into()));
        }
        let draft = Workflow::new(spec.name, spec.workflow_type, spec.network_id);
        let persisted = self.service.create(&draft).await?;
        info!(workflow_id = %persisted.id, kind = persisted.workflow_type.as_str(), "workflow created");
        self.state
            .write()
            .await
            .workflows
            .insert(persisted.id.clone(), persisted.clone());
        Ok(persisted)
    }

    /// Explicit start: local `pending → running` plus the remote start
    /// request. A remote rejection rolls the local transition back.
    pub async fn start(&self, id: &str) -> Result<Workflow> {
        let prior = self.require(id).await?;
        let started = prior.start()?;
        self.state
            .write()
            .await
            .workflows
            .insert(id.to_string(), started.clone());

        match self.service.start(id).await {
            Ok(()) => Ok(started),
            Err(e) => {
                self.state
                    .write()
                    .await
                    .workflows
                    .insert(id.to_string(), prior);
                Err(self.record_error(e).await)
            }
        }
    }

    /// One reconciliation cycle over every non-terminal workflow.
    /// Remote status is authoritative; ids with a pending user action
    /// are left alone until that action resolves. Failures degrade to a
    /// staleness flag, leaving prior statuses displayed.
    pub async fn poll(&self) -> Result<PollOutcome> {
        if self.poll_in_flight.swap(true, Ordering::SeqCst) {
            debug!("poll cycle skipped: previous cycle still in flight");
            return Ok(PollOutcome::Skipped);
        }
        let outcome = self.poll_inner().await;
        self.poll_in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn poll_inner(&self) -> Result<PollOutcome> {
        let targets: Vec<String> = {
            let state = self.state.read().await;
            state
                .workflows
                .values()
                .filter(|wf| !wf.is_terminal() && !state.pending.contains_key(&wf.id))
                .map(|wf| wf.id.clone())
                .collect()
        };

        let mut updated = 0;
        let mut poll_failed = false;
        for id in targets {
            match self.service.status(&id).await {
                Ok(remote) => {
                    if self.apply_remote(&id, remote).await {
                        updated += 1;
                    }
                }
                Err(e) => {
                    warn!(workflow_id = %id, error = %e, "status poll failed, keeping prior status");
                    poll_failed = true;
                    let mut state = self.state.write().await;
                    state.stale = true;
                    state.last_error = Some(e.to_string());
                }
            }
        }

        if !poll_failed {
            let mut state = self.state.write().await;
            state.stale = false;
            state.last_error = None;
        }
        Ok(PollOutcome::Completed { updated })
    }

    /// Requests remote cancellation, then awaits terminal confirmation
    /// before finalizing locally. No confirmation within the window is
    /// a failure to cancel: state reverts to `running` and a
    /// `CancellationTimeout` is surfaced.
    pub async fn cancel(&self, id: &str) -> Result<Workflow> {
        {
            let mut state = self.state.write().await;
            let wf = state
                .workflows
                .get(id)
                .ok_or_else(|| RegulonError::NotFound(format!("workflow {id}")))?;
            if !matches!(wf.status, WorkflowStatus::Pending | WorkflowStatus::Running) {
                return Err(RegulonError::InvalidTransition {
                    from: wf.status.as_str().to_string(),
                    to: WorkflowStatus::Cancelled.as_str().to_string(),
                });
            }
            state.pending.insert(id.to_string(), PendingAction::Cancel);
        }

        if let Err(e) = self.service.cancel(id).await {
            self.state.write().await.pending.remove(id);
            return Err(self.record_error(e).await);
        }
        info!(workflow_id = %id, "cancellation requested, awaiting confirmation");

        let deadline = Instant::now() + self.cancel_timeout;
        loop {
            match self.service.status(id).await {
                Ok(remote) if remote.status.is_terminal() => {
                    let mut state = self.state.write().await;
                    state.pending.remove(id);
                    let wf = state
                        .workflows
                        .get(id)
                        .ok_or_else(|| RegulonError::NotFound(format!("workflow {id}")))?;
                    let finalized = reconcile(wf, &remote)?.unwrap_or_else(|| wf.clone());
                    state.workflows.insert(id.to_string(), finalized.clone());
                    info!(workflow_id = %id, status = finalized.status.as_str(), "cancellation confirmed");
                    return Ok(finalized);
                }
                Ok(_) => {}
                // Transient poll failure inside the window: keep waiting.
                Err(e) => debug!(workflow_id = %id, error = %e, "confirmation check failed"),
            }

            if Instant::now() >= deadline {
                self.state.write().await.pending.remove(id);
                let err = RegulonError::CancellationTimeout {
                    workflow_id: id.to_string(),
                    timeout_secs: self.cancel_timeout.as_secs(),
                };
                warn!(workflow_id = %id, "cancellation unconfirmed, reverting to running");
                return Err(self.record_error(err).await);
            }
            tokio::time::sleep(self.confirm_interval).await;
        }
    }

    /// Retry a failed or cancelled workflow: lifecycle retry locally,
    /// then a fresh remote start under the same id. A rejected start
    /// rolls the local record back to its terminal state.
    pub async fn retry(&self, id: &str) -> Result<Workflow> {
        let prior = self.require(id).await?;
        let retried = prior.retry()?;
        {
            let mut state = self.state.write().await;
            state.pending.insert(id.to_string(), PendingAction::Retry);
            state.workflows.insert(id.to_string(), retried.clone());
        }

        match self.service.start(id).await {
            Ok(()) => {
                self.state.write().await.pending.remove(id);
                info!(workflow_id = %id, "retry started");
                Ok(retried)
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.pending.remove(id);
                state.workflows.insert(id.to_string(), prior);
                drop(state);
                Err(self.record_error(e).await)
            }
        }
    }

    /// Drop a workflow record from the local collection. Historical
    /// records are kept until the user explicitly removes them; removal
    /// never touches the referenced network.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .workflows
            .remove(id)
            .ok_or_else(|| RegulonError::NotFound(format!("workflow {id}")))?;
        state.pending.remove(id);
        Ok(())
    }

    /// Fetch and cache the opaque result payload handle's content.
    pub async fn results(&self, id: &str) -> Result<serde_json::Value> {
        self.require(id).await?;
        self.service.results(id).await
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    async fn require(&self, id: &str) -> Result<Workflow> {
        self.get(id)
            .await
            .ok_or_else(|| RegulonError::NotFound(format!("workflow {id}")))
    }

    async fn record_error(&self, e: RegulonError) -> RegulonError {
        self.state.write().await.last_error = Some(e.to_string());
        e
    }

    /// Returns true when the record changed. A pending user action
    /// raised between the status fetch and this apply wins: the poll
    /// result is dropped.
    async fn apply_remote(&self, id: &str, remote: RemoteWorkflowStatus) -> bool {
        let mut state = self.state.write().await;
        if state.pending.contains_key(id) {
            debug!(workflow_id = %id, "poll result suppressed by pending user action");
            return false;
        }
        let Some(wf) = state.workflows.get(id) else {
            return false;
        };
        match reconcile(wf, &remote) {
            Ok(Some(next)) => {
                debug!(workflow_id = %id, status = next.status.as_str(), progress = next.progress, "reconciled");
                state.workflows.insert(id.to_string(), next);
                true
            }
            Ok(None) => false,
            Err(e) => {
                // A reconciliation the state machine refuses means the
                // remote snapshot contradicts the contract; surface it
                // rather than corrupting local state.
                warn!(workflow_id = %id, error = %e, "remote status rejected by state machine");
                state.last_error = Some(e.to_string());
                false
            }
        }
    }
}

/// Pure reconciliation of a local record against a remote snapshot.
/// `Ok(None)` means no change. The remote is authoritative: a terminal
/// remote state always lands, driving through `running` first when the
/// local record is still `pending`.
fn reconcile(local: &Workflow, remote: &RemoteWorkflowStatus) -> Result<Option<Workflow>> {
    use WorkflowStatus::*;

    // A stale snapshot showing an earlier phase than the local record
    // carries no information; ignore it.
    if local.status.is_terminal() || remote.status == Pending {
        return Ok(None);
    }

    let running = match local.status {
        Pending => local.start()?,
        _ => local.clone(),
    };
    let running = running.observe_progress(remote.progress)?;

    let next = match remote.status {
        Running => running,
        Completed => running.complete(remote.results_ref.clone())?,
        Failed => running.fail(
            remote
                .error
                .clone()
                .unwrap_or_else(|| "remote execution failed".to_string()),
        )?,
        Cancelled => running.cancel()?,
        Pending => unreachable!("handled above"),
    };
    Ok(Some(next))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
