//! Remote service contract for the Regulon backend.
//!
//! `client` wraps reqwest with base-url joining, bearer-credential
//! attachment and status-to-error mapping. `networks` and `workflows`
//! define the async service traits the repositories program against,
//! plus their HTTP-backed implementations.

pub mod client;
pub mod networks;
pub mod workflows;

pub use client::{AnonymousCredentials, ApiClient, CredentialProvider, StaticToken};
pub use networks::{NetworkService, RemoteNetworkService};
pub use workflows::{RemoteWorkflowService, RemoteWorkflowStatus, WorkflowService};
