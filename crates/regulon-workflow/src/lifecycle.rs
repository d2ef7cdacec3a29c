//! Workflow record and state machine.
//!
//! Transitions are pure: each returns a new `Workflow` snapshot, and an
//! invalid transition is an `InvalidTransition` error, never silently
//! absorbed. `completed`, `failed` and `cancelled` are terminal; the
//! only way out of a terminal state is the explicit retry from
//! `failed` or `cancelled` back to `pending` (same id, fresh attempt).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use regulon_common::{RegulonError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending   => "pending",
            WorkflowStatus::Running   => "running",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed    => "failed",
            WorkflowStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    Qualitative,
    Hybrid,
    Ml,
    Simulation,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::Qualitative => "qualitative",
            WorkflowType::Hybrid      => "hybrid",
            WorkflowType::Ml          => "ml",
            WorkflowType::Simulation  => "simulation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    pub status: WorkflowStatus,
    /// 0–100. Monotonic within a single running episode.
    pub progress: f32,
    /// Reference, not ownership: deleting a workflow never touches the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Derived from `completed_at - started_at`, not authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Opaque handle to the remote result payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_ref: Option<String>,
}

impl Workflow {
    pub fn new(
        name: impl Into<String>,
        workflow_type: WorkflowType,
        network_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            workflow_type,
            status: WorkflowStatus::Pending,
            progress: 0.0,
            network_id,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            duration_seconds: None,
            error: None,
            results_ref: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn invalid(&self, to: WorkflowStatus) -> RegulonError {
        RegulonError::InvalidTransition {
            from: self.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    fn finish(&self, status: WorkflowStatus) -> Workflow {
        let completed_at = Utc::now();
        let mut next = self.clone();
        next.status = status;
        next.completed_at = Some(completed_at);
        next.duration_seconds = self
            .started_at
            .map(|started| (completed_at - started).num_seconds());
        next
    }

    /// `pending → running`. Triggered explicitly or when reconciliation
    /// observes the remote service beginning execution.
    pub fn start(&self) -> Result<Workflow> {
        if self.status != WorkflowStatus::Pending {
            return Err(self.invalid(WorkflowStatus::Running));
        }
        let mut next = self.clone();
        next.status = WorkflowStatus::Running;
        next.started_at = Some(Utc::now());
        next.progress = 0.0;
        Ok(next)
    }

    /// `running → completed`, progress forced to 100.
    pub fn complete(&self, results_ref: Option<String>) -> Result<Workflow> {
        if self.status != WorkflowStatus::Running {
            return Err(self.invalid(WorkflowStatus::Completed));
        }
        let mut next = self.finish(WorkflowStatus::Completed);
        next.progress = 100.0;
        next.results_ref = results_ref;
        Ok(next)
    }

    /// `running → failed`. Progress stays wherever the run stalled.
    pub fn fail(&self, error: impl Into<String>) -> Result<Workflow> {
        if self.status != WorkflowStatus::Running {
            return Err(self.invalid(WorkflowStatus::Failed));
        }
        let mut next = self.finish(WorkflowStatus::Failed);
        next.error = Some(error.into());
        Ok(next)
    }

    /// `running → cancelled`, user-initiated only. No error recorded.
    pub fn cancel(&self) -> Result<Workflow> {
        if self.status != WorkflowStatus::Running {
            return Err(self.invalid(WorkflowStatus::Cancelled));
        }
        Ok(self.finish(WorkflowStatus::Cancelled))
    }

    /// `failed|cancelled → pending`: a fresh attempt under the same id.
    pub fn retry(&self) -> Result<Workflow> {
        if !matches!(
            self.status,
            WorkflowStatus::Failed | WorkflowStatus::Cancelled
        ) {
            return Err(self.invalid(WorkflowStatus::Pending));
        }
        let mut next = self.clone();
        next.status = WorkflowStatus::Pending;
        next.progress = 0.0;
        next.started_at = None;
        next.completed_at = None;
        next.duration_seconds = None;
        next.error = None;
        next.results_ref = None;
        Ok(next)
    }

    /// Apply a progress reading while running. Clamped to [0, 100] and
    /// monotonic: a lower value from an out-of-order poll response is
    /// absorbed by keeping the current maximum.
    pub fn observe_progress(&self, progress: f32) -> Result<Workflow> {
        if self.status != WorkflowStatus::Running {
            return Err(self.invalid(WorkflowStatus::Running));
        }
        let mut next = self.clone();
        next.progress = progress.clamp(0.0, 100.0).max(self.progress);
        Ok(next)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
