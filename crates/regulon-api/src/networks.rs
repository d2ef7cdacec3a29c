//! Network persistence contract.

use async_trait::async_trait;

use crate::client::ApiClient;
use regulon_common::Result;
use regulon_graph::Network;

/// Remote persistence boundary for networks. The repository programs
/// against this trait; tests substitute an in-memory fake.
#[async_trait]
pub trait NetworkService: Send + Sync {
    async fn list(&self) -> Result<Vec<Network>>;
    async fn get(&self, id: &str) -> Result<Network>;
    async fn create(&self, network: &Network) -> Result<Network>;
    async fn update(&self, network: &Network) -> Result<Network>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// HTTP-backed implementation over the Regulon backend.
#[derive(Clone)]
pub struct RemoteNetworkService {
    client: ApiClient,
}

impl RemoteNetworkService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NetworkService for RemoteNetworkService {
    async fn list(&self) -> Result<Vec<Network>> {
        self.client.get_json("networks").await
    }

    async fn get(&self, id: &str) -> Result<Network> {
        self.client.get_json(&format!("networks/{id}")).await
    }

    async fn create(&self, network: &Network) -> Result<Network> {
        self.client.post_json("networks", network).await
    }

    async fn update(&self, network: &Network) -> Result<Network> {
        self.client
            .put_json(&format!("networks/{}", network.id), network)
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("networks/{id}")).await
    }
}
