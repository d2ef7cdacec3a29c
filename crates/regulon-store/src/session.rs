//! Session facade: configuration in, wired repositories out.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use regulon_api::{
    ApiClient, CredentialProvider, RemoteNetworkService, RemoteWorkflowService,
};
use regulon_common::Result;
use regulon_config::Config;

use crate::networks::NetworkRepository;
use crate::scheduler::{PollHandle, Scheduler, TokioScheduler};
use crate::workflows::WorkflowRepository;

/// One user session against a Regulon backend. Owns both repositories
/// and the reconciliation loop; dropping the session stops polling.
pub struct Session {
    networks: Arc<NetworkRepository>,
    workflows: Arc<WorkflowRepository>,
    poll_handle: PollHandle,
}

impl Session {
    /// The credential provider comes from the auth collaborator; this
    /// core only forwards the bearer token it hands out.
    pub fn connect(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = ApiClient::new(&config.api.base_url, config.request_timeout(), credentials)?;
        let networks = Arc::new(NetworkRepository::new(Arc::new(RemoteNetworkService::new(
            client.clone(),
        ))));
        let workflows = Arc::new(WorkflowRepository::new(
            Arc::new(RemoteWorkflowService::new(client)),
            config.cancel_timeout(),
            config.confirm_interval(),
        ));
        let poll_handle =
            Self::start_polling(&TokioScheduler, workflows.clone(), config.poll_interval());
        Ok(Self {
            networks,
            workflows,
            poll_handle,
        })
    }

    /// Wire the reconciliation loop onto any scheduler. Poll failures
    /// are already degraded to staleness inside the repository; they
    /// only warrant a log line here.
    pub fn start_polling(
        scheduler: &dyn Scheduler,
        workflows: Arc<WorkflowRepository>,
        interval: Duration,
    ) -> PollHandle {
        scheduler.on_tick(
            interval,
            Box::new(move || {
                let repo = workflows.clone();
                Box::pin(async move {
                    if let Err(e) = repo.poll().await {
                        warn!(error = %e, "workflow poll cycle failed");
                    }
                })
            }),
        )
    }

    pub fn networks(&self) -> &Arc<NetworkRepository> {
        &self.networks
    }

    pub fn workflows(&self) -> &Arc<WorkflowRepository> {
        &self.workflows
    }

    pub fn stop_polling(&self) {
        self.poll_handle.stop();
    }
}
