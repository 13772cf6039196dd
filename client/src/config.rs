use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

/// Default config file looked up by the CLI.
pub const DEFAULT_CONFIG_PATH: &str = "concord-client.toml";

/// Top-level client configuration, loaded from concord-client.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiSection,
    pub auth: AuthSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the REST API, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "https://discord.com/api/v10".into(),
            user_agent: concat!("concord-client/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AuthSection {
    /// Bot token sent as `Authorization: Bot <token>`.
    pub token: String,
}

impl ClientConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// Environment variables override TOML values.
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path}"))?;
            Self::from_toml(&contents)
                .with_context(|| format!("failed to parse config file {path}"))?
        } else {
            info!("No config file found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CONCORD_API_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = std::env::var("CONCORD_USER_AGENT") {
            self.api.user_agent = v;
        }
        if let Ok(v) = std::env::var("CONCORD_TIMEOUT_SECS")
            && let Ok(secs) = v.parse()
        {
            self.api.timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("CONCORD_TOKEN") {
            self.auth.token = v;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}
