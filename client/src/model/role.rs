use serde::{Deserialize, Serialize};
use tracing::warn;

/// A role object as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RolePayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub position: i32,
    /// Permission bitfield, sent as a decimal string.
    #[serde(default)]
    pub permissions: String,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub tags: Option<RoleTags>,
}

/// Metadata describing what manages a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleTags {
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub integration_id: Option<String>,
    /// Present (as `null`) on the server booster role.
    #[serde(default, deserialize_with = "tag_flag")]
    pub premium_subscriber: bool,
}

/// Boolean role tags are sent as `"key": null` when set and omitted otherwise.
fn tag_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let _ = Option::<serde::de::IgnoredAny>::deserialize(deserializer)?;
    Ok(true)
}

/// A role within a server.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub color: u32,
    pub position: i32,
    pub permissions: u64,
    pub managed: bool,
    pub tags: RoleTags,
}

impl From<RolePayload> for Role {
    fn from(p: RolePayload) -> Self {
        let permissions = p.permissions.parse::<u64>().unwrap_or_else(|_| {
            warn!(role_id = %p.id, permissions = %p.permissions, "malformed role permissions, treating as none");
            0
        });
        Self {
            id: p.id,
            name: p.name,
            color: p.color,
            position: p.position,
            permissions,
            managed: p.managed,
            tags: p.tags.unwrap_or_default(),
        }
    }
}

impl Role {
    /// Whether this role is tagged as managed by the given integration.
    pub fn is_managed_by(&self, integration_id: &str) -> bool {
        self.tags.integration_id.as_deref() == Some(integration_id)
    }
}
