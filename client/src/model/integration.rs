use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::application::{ApplicationPayload, ApplicationSnapshot, IntegrationApplication};
use super::edit::{EditIntegration, local_name};
use super::present;
use super::role::Role;
use super::user::{User, UserPayload};
use crate::cache::ServerState;
use crate::client::Client;
use crate::error::RemoteOperationError;

/// What happens to subscribers whose connection to the external service lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum IntegrationExpireBehavior {
    RemoveRole,
    Kick,
    Unknown(u8),
}

impl From<u8> for IntegrationExpireBehavior {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::RemoveRole,
            1 => Self::Kick,
            other => Self::Unknown(other),
        }
    }
}

impl From<IntegrationExpireBehavior> for u8 {
    fn from(b: IntegrationExpireBehavior) -> Self {
        match b {
            IntegrationExpireBehavior::RemoveRole => 0,
            IntegrationExpireBehavior::Kick => 1,
            IntegrationExpireBehavior::Unknown(v) => v,
        }
    }
}

/// The external account linked by an integration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntegrationAccount {
    pub id: String,
    pub name: String,
}

/// The fields the patch-merge routine understands, with key presence preserved.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IntegrationPatch {
    #[serde(default, deserialize_with = "present")]
    pub expire_behavior: Option<Option<IntegrationExpireBehavior>>,
    #[serde(default, deserialize_with = "present")]
    pub expire_grace_period: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present")]
    pub application: Option<Option<ApplicationPayload>>,
}

impl IntegrationPatch {
    /// Read a patch out of a wire-named map. Keys the routine doesn't handle are ignored.
    ///
    /// Each field is decoded on its own: a key whose value has the wrong shape is
    /// logged and skipped, and the remaining keys still make it into the patch.
    pub fn from_wire(body: &Map<String, Value>) -> Self {
        Self {
            expire_behavior: wire_field(body, "expire_behavior"),
            expire_grace_period: wire_field(body, "expire_grace_period"),
            application: wire_field(body, "application"),
        }
    }
}

fn wire_field<T: DeserializeOwned>(body: &Map<String, Value>, key: &str) -> Option<Option<T>> {
    let value = body.get(key)?;
    match serde_json::from_value::<Option<T>>(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(field = key, error = %e, "skipping patch field with unexpected value");
            None
        }
    }
}

/// A full integration object as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationPayload {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub syncing: bool,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub user: Option<UserPayload>,
    #[serde(default)]
    pub account: IntegrationAccount,
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub patch: IntegrationPatch,
}

/// A server integration: a link between a server and a third-party service account.
///
/// `id`, `kind`, `name`, `enabled` and `account` are fixed at construction.
/// `role` is resolved once; [`Integration::roles`] is recomputed on every call.
pub struct Integration {
    client: Client,
    server_id: String,
    id: String,
    name: String,
    kind: String,
    enabled: bool,
    syncing: bool,
    role: Option<Arc<Role>>,
    user: Option<Arc<User>>,
    account: IntegrationAccount,
    synced_at: Option<DateTime<Utc>>,
    expire_behavior: Option<IntegrationExpireBehavior>,
    expire_grace_period: Option<u32>,
    application: Option<IntegrationApplication>,
}

impl Integration {
    pub fn new(client: &Client, payload: IntegrationPayload, server: &ServerState) -> Self {
        let role = payload.role_id.as_deref().and_then(|id| server.role(id));
        let user = payload.user.map(|u| client.cache().upsert_user(u));

        let mut integration = Self {
            client: client.clone(),
            server_id: server.id.clone(),
            id: payload.id,
            name: payload.name,
            kind: payload.kind,
            enabled: payload.enabled,
            syncing: payload.syncing,
            role,
            user,
            account: payload.account,
            synced_at: payload.synced_at,
            expire_behavior: None,
            expire_grace_period: None,
            application: None,
        };
        integration.patch(payload.patch);
        integration
    }

    /// Merge a partial update into this integration.
    ///
    /// Only keys present in `patch` are applied. An existing application is only
    /// ever merged in place; it is never replaced or removed by a patch.
    pub fn patch(&mut self, patch: IntegrationPatch) {
        if let Some(behavior) = patch.expire_behavior {
            self.expire_behavior = behavior;
        }
        if let Some(days) = patch.expire_grace_period {
            self.expire_grace_period = days;
        }
        if let Some(application) = patch.application {
            let cache = self.client.cache();
            match application {
                Some(payload) => {
                    if let Some(existing) = self.application.as_mut() {
                        existing.patch(payload, cache);
                    } else {
                        self.application = Some(IntegrationApplication::new(payload, cache));
                    }
                }
                // Nothing to merge into an existing application.
                None => {}
            }
        }
        debug!(integration_id = %self.id, "patched integration");
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Service kind, e.g. `twitch` or `youtube`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn syncing(&self) -> bool {
        self.syncing
    }

    /// The subscriber role, as it was when this integration was constructed.
    pub fn role(&self) -> Option<&Arc<Role>> {
        self.role.as_ref()
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    pub fn account(&self) -> &IntegrationAccount {
        &self.account
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    pub fn expire_behavior(&self) -> Option<IntegrationExpireBehavior> {
        self.expire_behavior
    }

    /// Grace period in days.
    pub fn expire_grace_period(&self) -> Option<u32> {
        self.expire_grace_period
    }

    pub fn application(&self) -> Option<&IntegrationApplication> {
        self.application.as_ref()
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// The owning server, looked up in the client cache.
    pub fn server(&self) -> Option<Arc<ServerState>> {
        self.client.cache().server(&self.server_id)
    }

    /// Every role currently tagged as managed by this integration.
    pub fn roles(&self) -> Vec<Arc<Role>> {
        self.server()
            .map(|server| server.roles_where(|r| r.is_managed_by(&self.id)))
            .unwrap_or_default()
    }

    /// Trigger a synchronization.
    ///
    /// `syncing` is set before the call is issued. If the call fails it stays
    /// `true` and the integration should be fetched again.
    pub async fn sync(&mut self) -> Result<&mut Self, RemoteOperationError> {
        self.syncing = true;
        self.client
            .api()
            .sync_integration(&self.server_id, &self.id)
            .await
            .inspect_err(|e| {
                warn!(server_id = %self.server_id, integration_id = %self.id, error = %e, "integration sync failed")
            })?;

        self.syncing = false;
        self.synced_at = Some(Utc::now());
        info!(server_id = %self.server_id, integration_id = %self.id, "integration synced");
        Ok(self)
    }

    /// Edit this integration. Local state changes only after the remote accepts the edit.
    pub async fn edit(
        &mut self,
        edit: &EditIntegration,
        reason: Option<&str>,
    ) -> Result<&mut Self, RemoteOperationError> {
        let body = edit.to_wire();
        self.client
            .api()
            .edit_integration(&self.server_id, &self.id, &body, reason)
            .await
            .inspect_err(|e| {
                warn!(server_id = %self.server_id, integration_id = %self.id, error = %e, "integration edit failed")
            })?;

        let fields: Vec<String> = body
            .keys()
            .map(|k| local_name(k).unwrap_or(k.as_str()).to_string())
            .collect();
        self.patch(IntegrationPatch::from_wire(&body));
        info!(server_id = %self.server_id, integration_id = %self.id, ?fields, "integration edited");
        Ok(self)
    }

    /// Delete this integration. The handle stays usable but no longer names a remote resource.
    pub async fn delete(&self, reason: Option<&str>) -> Result<&Self, RemoteOperationError> {
        self.client
            .api()
            .delete_integration(&self.server_id, &self.id, reason)
            .await
            .inspect_err(|e| {
                warn!(server_id = %self.server_id, integration_id = %self.id, error = %e, "integration delete failed")
            })?;

        info!(server_id = %self.server_id, integration_id = %self.id, "integration deleted");
        Ok(self)
    }

    /// Structural snapshot with `role`, `server` and `user` reduced to their IDs.
    pub fn to_snapshot(&self) -> IntegrationSnapshot {
        IntegrationSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            enabled: self.enabled,
            syncing: self.syncing,
            role: self.role.as_ref().map(|r| r.id.clone()),
            user: self.user.as_ref().map(|u| u.id.clone()),
            server: self.server_id.clone(),
            account: self.account.clone(),
            synced_at: self.synced_at,
            expire_behavior: self.expire_behavior,
            expire_grace_period: self.expire_grace_period,
            application: self.application.as_ref().map(|a| a.to_snapshot()),
        }
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("id", &self.id)
            .field("server_id", &self.server_id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("syncing", &self.syncing)
            .finish_non_exhaustive()
    }
}

impl Serialize for Integration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_snapshot().serialize(serializer)
    }
}

/// Plain view of an [`Integration`] for logging or storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSnapshot {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    pub syncing: bool,
    pub role: Option<String>,
    pub user: Option<String>,
    pub server: String,
    pub account: IntegrationAccount,
    pub synced_at: Option<DateTime<Utc>>,
    pub expire_behavior: Option<IntegrationExpireBehavior>,
    pub expire_grace_period: Option<u32>,
    pub application: Option<ApplicationSnapshot>,
}
