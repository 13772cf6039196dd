use std::sync::Arc;

use tracing::info;

use crate::cache::{Cache, ServerState};
use crate::config::ClientConfig;
use crate::error::RemoteOperationError;
use crate::model::Integration;
use crate::rest::{IntegrationApi, RestClient};

/// Shared handle to the remote API and the client cache. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    api: Arc<dyn IntegrationApi>,
    cache: Arc<Cache>,
}

impl Client {
    pub fn new(api: Arc<dyn IntegrationApi>) -> Self {
        Self::with_cache(api, Arc::new(Cache::new()))
    }

    pub fn with_cache(api: Arc<dyn IntegrationApi>, cache: Arc<Cache>) -> Self {
        Self { api, cache }
    }

    /// Build a client talking HTTP to the configured API.
    pub fn from_config(config: &ClientConfig) -> Result<Self, RemoteOperationError> {
        Ok(Self::new(Arc::new(RestClient::new(config)?)))
    }

    pub fn api(&self) -> &dyn IntegrationApi {
        self.api.as_ref()
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    /// Fetch every integration of `server` and build live entities from them.
    pub async fn fetch_integrations(
        &self,
        server: &ServerState,
    ) -> Result<Vec<Integration>, RemoteOperationError> {
        let payloads = self.api.list_integrations(&server.id).await?;
        info!(server_id = %server.id, count = payloads.len(), "fetched integrations");
        Ok(payloads
            .into_iter()
            .map(|p| Integration::new(self, p, server))
            .collect())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
