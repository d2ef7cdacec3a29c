//! Pure list selectors: search, type/status filters, sorting.

use crate::lifecycle::{Workflow, WorkflowStatus, WorkflowType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Newest first.
    #[default]
    CreatedDesc,
    NameAsc,
    StatusAsc,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    pub workflow_type: Option<WorkflowType>,
    pub status: Option<WorkflowStatus>,
    pub sort_by: SortBy,
}

impl WorkflowFilter {
    pub fn apply(&self, workflows: &[Workflow]) -> Vec<Workflow> {
        let needle = self.search.as_ref().map(|s| s.to_lowercase());
        let mut out: Vec<Workflow> = workflows
            .iter()
            .filter(|wf| {
                needle
                    .as_ref()
                    .is_none_or(|n| wf.name.to_lowercase().contains(n))
            })
            .filter(|wf| self.workflow_type.is_none_or(|t| wf.workflow_type == t))
            .filter(|wf| self.status.is_none_or(|s| wf.status == s))
            .cloned()
            .collect();

        match self.sort_by {
            SortBy::CreatedDesc => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::NameAsc => out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            SortBy::StatusAsc => out.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
        }
        out
    }
}
