use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::present;
use super::user::{User, UserPayload};
use crate::cache::Cache;

/// The application object nested in an integration payload.
///
/// Every field is optional so the same type serves both full and partial payloads.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ApplicationPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub bot: Option<Option<UserPayload>>,
}

/// The third-party application backing an integration.
///
/// Owned by its [`super::Integration`]; the only way to change it is [`Self::patch`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationApplication {
    id: String,
    name: String,
    icon: Option<String>,
    description: Option<String>,
    bot: Option<Arc<User>>,
}

impl IntegrationApplication {
    pub(crate) fn new(payload: ApplicationPayload, cache: &Cache) -> Self {
        let mut app = Self {
            id: payload.id.clone().unwrap_or_default(),
            name: String::new(),
            icon: None,
            description: None,
            bot: None,
        };
        app.patch(payload, cache);
        app
    }

    /// Merge a partial payload. Keys absent from the payload keep their current value.
    /// The application ID is fixed at creation.
    pub(crate) fn patch(&mut self, payload: ApplicationPayload, cache: &Cache) {
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(icon) = payload.icon {
            self.icon = icon;
        }
        if let Some(description) = payload.description {
            self.description = description;
        }
        if let Some(bot) = payload.bot {
            self.bot = bot.map(|b| cache.upsert_user(b));
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The bot user acting for this application, if the payload named one.
    pub fn bot(&self) -> Option<&Arc<User>> {
        self.bot.as_ref()
    }

    pub fn to_snapshot(&self) -> ApplicationSnapshot {
        ApplicationSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            description: self.description.clone(),
            bot: self.bot.as_ref().map(|b| b.id.clone()),
        }
    }
}

/// Plain structural view of an application; `bot` is reduced to its user ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationSnapshot {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub bot: Option<String>,
}
