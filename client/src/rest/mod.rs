//! Remote API seam.
//!
//! Entities talk to the platform only through [`IntegrationApi`], so the
//! HTTP transport can be swapped for an in-memory fake in tests.

pub mod client;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RemoteOperationError;
use crate::model::IntegrationPayload;

pub use client::RestClient;

/// The remote calls an integration needs, each scoped by `(server_id, integration_id)`.
#[async_trait]
pub trait IntegrationApi: Send + Sync {
    /// List every integration attached to a server.
    async fn list_integrations(
        &self,
        server_id: &str,
    ) -> Result<Vec<IntegrationPayload>, RemoteOperationError>;

    /// Trigger a synchronization. No request body.
    async fn sync_integration(
        &self,
        server_id: &str,
        integration_id: &str,
    ) -> Result<(), RemoteOperationError>;

    /// Apply a partial update. `body` uses wire field names.
    async fn edit_integration(
        &self,
        server_id: &str,
        integration_id: &str,
        body: &Map<String, Value>,
        reason: Option<&str>,
    ) -> Result<(), RemoteOperationError>;

    async fn delete_integration(
        &self,
        server_id: &str,
        integration_id: &str,
        reason: Option<&str>,
    ) -> Result<(), RemoteOperationError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    /// A recorded call against [`FakeApi`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        List(String),
        Sync(String, String),
        Edit(String, String, Map<String, Value>, Option<String>),
        Delete(String, String, Option<String>),
    }

    /// In-memory [`IntegrationApi`] that records calls and can be told to fail.
    #[derive(Default)]
    pub struct FakeApi {
        pub calls: Mutex<Vec<Call>>,
        pub listing: Mutex<Vec<IntegrationPayload>>,
        pub fail_with: Mutex<Option<u16>>,
        /// When set, the next sync call waits on this before answering.
        pub sync_gate: Mutex<Option<tokio::sync::oneshot::Receiver<()>>>,
    }

    impl FakeApi {
        pub fn failing(status: u16) -> Self {
            let api = Self::default();
            *api.fail_with.lock().unwrap() = Some(status);
            api
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> Result<(), RemoteOperationError> {
            self.calls.lock().unwrap().push(call);
            match *self.fail_with.lock().unwrap() {
                Some(code) => Err(RemoteOperationError::Status {
                    status: reqwest::StatusCode::from_u16(code).unwrap(),
                    body: "fake failure".into(),
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl IntegrationApi for FakeApi {
        async fn list_integrations(
            &self,
            server_id: &str,
        ) -> Result<Vec<IntegrationPayload>, RemoteOperationError> {
            self.record(Call::List(server_id.into()))?;
            Ok(self.listing.lock().unwrap().clone())
        }

        async fn sync_integration(
            &self,
            server_id: &str,
            integration_id: &str,
        ) -> Result<(), RemoteOperationError> {
            self.record(Call::Sync(server_id.into(), integration_id.into()))?;
            let gate = self.sync_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(())
        }

        async fn edit_integration(
            &self,
            server_id: &str,
            integration_id: &str,
            body: &Map<String, Value>,
            reason: Option<&str>,
        ) -> Result<(), RemoteOperationError> {
            self.record(Call::Edit(
                server_id.into(),
                integration_id.into(),
                body.clone(),
                reason.map(str::to_string),
            ))
        }

        async fn delete_integration(
            &self,
            server_id: &str,
            integration_id: &str,
            reason: Option<&str>,
        ) -> Result<(), RemoteOperationError> {
            self.record(Call::Delete(
                server_id.into(),
                integration_id.into(),
                reason.map(str::to_string),
            ))
        }
    }
}
