//! Analysis workflow lifecycle for Regulon.
//!
//! A workflow is an asynchronous analysis job referencing a network,
//! tracked through `pending → running → {completed, failed, cancelled}`.
//! `lifecycle` holds the record and its pure transition methods;
//! `filter` holds the pure search/sort selectors used by list views.

pub mod filter;
pub mod lifecycle;

pub use filter::{SortBy, WorkflowFilter};
pub use lifecycle::{Workflow, WorkflowStatus, WorkflowType};
