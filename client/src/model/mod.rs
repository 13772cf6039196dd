//! Wire payloads and the live entities built from them.

pub mod application;
pub mod edit;
pub mod integration;
pub mod role;
pub mod user;

use serde::{Deserialize, Deserializer};

pub use application::{ApplicationPayload, IntegrationApplication};
pub use edit::EditIntegration;
pub use integration::{
    Integration, IntegrationAccount, IntegrationExpireBehavior, IntegrationPatch,
    IntegrationPayload, IntegrationSnapshot,
};
pub use role::{Role, RolePayload, RoleTags};
pub use user::{User, UserPayload};

/// Deserialize a key that may be absent, explicitly null, or carry a value.
///
/// Used together with `#[serde(default)]`: an absent key stays `None`, a
/// `null` becomes `Some(None)` and anything else becomes `Some(Some(v))`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
